use gdal::Dataset;
use gdal::Metadata;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::processing::visualize::VisParams;
use crate::engine::{MonthlyDeltaRecord, ReferenceInfo};
use crate::error::Result;

/// Provenance and statistics of one exported delta month, keyed GDAL-style.
pub fn delta_metadata_fields(
    record: &MonthlyDeltaRecord,
    reference: &ReferenceInfo,
    vis: &VisParams,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let mut put = |k: &str, v: String| {
        metadata.insert(k.to_string(), v);
    };

    put("YEAR", record.year().to_string());
    put("MONTH", record.month.month().to_string());
    put("IMAGE_COUNT", record.image_count.to_string());
    put("BAND", "delta_VV".to_string());

    if let Some(p) = &record.percentiles {
        put("P5", p.p5.to_string());
        put("P25", p.p25.to_string());
        put("P50", p.p50.to_string());
        put("P75", p.p75.to_string());
        put("P95", p.p95.to_string());
    }
    if let Some(s) = &record.summary {
        put("MEAN", s.mean.to_string());
        put("STD_DEV", s.std_dev.to_string());
        put("MIN", s.min.to_string());
        put("MAX", s.max.to_string());
        put("PIXEL_COUNT", s.pixel_count.to_string());
    }

    put("REFERENCE_START", reference.interval.start.to_string());
    put("REFERENCE_END", reference.interval.end.to_string());
    put("REFERENCE_IMAGE_COUNT", reference.image_count.to_string());
    put("FILTER", reference.filter.clone());
    put("VIS_MIN", vis.min.to_string());
    put("VIS_MAX", vis.max.to_string());

    put("CONVERSION_TOOL", env!("CARGO_PKG_NAME").to_string());
    put("CONVERSION_VERSION", env!("CARGO_PKG_VERSION").to_string());
    put("CONVERSION_TIMESTAMP", chrono::Utc::now().to_rfc3339());

    metadata
}

/// Lower-case keys, numbers where the value parses as one.
pub fn convert_metadata_to_json(
    metadata: &BTreeMap<String, String>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut json_metadata = serde_json::Map::new();
    for (key, value) in metadata {
        let json_value = value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.clone()));
        json_metadata.insert(key.to_lowercase(), json_value);
    }
    json_metadata
}

pub fn embed_tiff_metadata(ds: &mut Dataset, metadata: &BTreeMap<String, String>) -> Result<()> {
    for (key, value) in metadata {
        ds.set_metadata_item(key, value, "")?;
    }
    Ok(())
}

/// `<output>.json` next to a quicklook, with the georeferencing inlined.
pub fn write_json_sidecar(
    output_path: &Path,
    metadata: &BTreeMap<String, String>,
    geotransform: [f64; 6],
    crs: &str,
) -> Result<PathBuf> {
    let mut json_metadata = convert_metadata_to_json(metadata);
    json_metadata.insert(
        "geotransform".to_string(),
        serde_json::Value::Array(
            geotransform
                .iter()
                .filter_map(|&v| serde_json::Number::from_f64(v))
                .map(serde_json::Value::Number)
                .collect(),
        ),
    );
    json_metadata.insert("crs".to_string(), serde_json::Value::String(crs.to_string()));

    let sidecar_path = output_path.with_extension("json");
    let json_string = serde_json::to_string_pretty(&json_metadata)?;
    std::fs::write(&sidecar_path, json_string)?;
    info!("Created metadata sidecar: {:?}", sidecar_path);
    Ok(sidecar_path)
}
