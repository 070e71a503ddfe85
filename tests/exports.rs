mod common;

use ndarray::Array2;

use deltavv::api::{ExportOptions, export_results, open_catalog, run_analysis};
use deltavv::core::processing::raster::Raster;
use deltavv::engine::NoopObserver;
use deltavv::io::GeoTiffReader;
use deltavv::io::writers::tiff::write_delta_tiff;
use deltavv::{AnalysisParams, ImageryPlatform, analyze};

use common::*;

#[test]
fn export_writes_rasters_sidecars_and_tables() {
    let mut platform = platform(&[("2024-05", 10.0), ("2024-07", -20.0)], 2);
    let session = platform.authenticate(&credentials()).unwrap();
    let request = request("2024-05", "2024-07");
    let result = analyze(&mut platform, &session, &request, &mut NoopObserver).unwrap();
    assert_eq!(result.records.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let opts = ExportOptions::new(dir.path().join("out"));
    let report = export_results(&platform, &session, &result, &request, &opts).unwrap();

    assert_eq!(report.geotiffs.len(), 2);
    assert_eq!(report.quicklooks.len(), 2);
    // world file, .prj and JSON per quicklook
    assert_eq!(report.sidecars.len(), 6);
    assert_eq!(report.file_count(), 12);

    let out = dir.path().join("out");
    for stem in ["delta_vv_2024_05", "delta_vv_2024_07"] {
        for ext in ["tif", "jpg", "jgw", "prj", "json"] {
            assert!(out.join(format!("{stem}.{ext}")).exists(), "{stem}.{ext}");
        }
    }
    assert!(!out.join("delta_vv_2024_06.tif").exists());

    let tiff = GeoTiffReader::open(out.join("delta_vv_2024_07.tif")).unwrap();
    let delta = tiff.read_band(1).unwrap();
    let v = delta.data.iter().find(|v| v.is_finite()).copied().unwrap();
    assert!((v + 0.002).abs() < 1e-6);

    let csv = std::fs::read_to_string(report.csv.unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("2024-05-01,2024,5,May,"));
    assert!(lines[2].starts_with("2024-07-01,2024,7,Jul,"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report.presentation.unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["layers"].as_array().unwrap().len(), 2);
    assert_eq!(json["layers"][1]["label"], "ΔVV Jul 2024");
    assert_eq!(json["summary"]["months_analyzed"], 2);
    assert_eq!(json["legend"].as_array().unwrap().len(), 9);
    assert_eq!(json["notice"], "1 of 3 months had no data");
}

#[test]
fn export_respects_month_selection_and_skips_unknown_months() {
    let mut platform = platform(&[("2024-05", 10.0), ("2024-06", 20.0)], 1);
    let session = platform.authenticate(&credentials()).unwrap();
    let request = request("2024-05", "2024-06");
    let result = analyze(&mut platform, &session, &request, &mut NoopObserver).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut opts = ExportOptions::new(dir.path());
    opts.months = Some(vec![ym("2024-06"), ym("2023-01")]);
    opts.geotiff = false;
    opts.quicklook_size = None;
    let report = export_results(&platform, &session, &result, &request, &opts).unwrap();

    assert!(report.geotiffs.is_empty());
    assert_eq!(report.quicklooks.len(), 1);
    assert!(report.quicklooks[0].ends_with("delta_vv_2024_06.jpg"));
    // The table always covers every recorded month
    let csv = std::fs::read_to_string(report.csv.unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn catalog_backed_run_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let scenes = dir.path().join("scenes");
    std::fs::create_dir_all(&scenes).unwrap();
    for (name, raw) in [("ref.tif", REFERENCE_RAW), ("may.tif", REFERENCE_RAW + 10.0)] {
        let raster = Raster::new(Array2::from_elem((40, 40), raw), GRID);
        drop(write_delta_tiff(&scenes.join(name), &raster).unwrap());
    }

    let bounds = r#"{"lat_min": 33.56, "lat_max": 33.6, "lon_min": -7.6, "lon_max": -7.56}"#;
    let catalog = format!(
        r#"{{"scenes": [
            {{"id": "S1A_20240410", "acquired": "2024-04-10T18:21:00Z", "instrument_mode": "IW",
              "polarizations": ["VV"], "orbit_pass": "DESCENDING", "bounds": {bounds},
              "file": "scenes/ref.tif"}},
            {{"id": "S1A_20240516", "acquired": "2024-05-16T18:21:00Z", "instrument_mode": "IW",
              "polarizations": ["VV"], "orbit_pass": "DESCENDING", "bounds": {bounds},
              "file": "scenes/may.tif"}},
            {{"id": "S1A_20240522_ASC", "acquired": "2024-05-22T06:10:00Z", "instrument_mode": "IW",
              "polarizations": ["VV"], "orbit_pass": "ASCENDING", "bounds": {bounds},
              "file": "scenes/missing.tif"}}
        ]}}"#
    );
    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&catalog_path, catalog).unwrap();

    let config_path = dir.path().join("params.json");
    std::fs::write(
        &config_path,
        r#"{"start": "2024-05", "end": "2024-05", "filter_mode": "standard"}"#,
    )
    .unwrap();
    let params = AnalysisParams::from_json_file(&config_path).unwrap();
    assert_eq!(params.reference_start, ymd(2024, 4, 1));

    let mut platform = open_catalog(&catalog_path).unwrap();
    assert_eq!(platform.scenes().len(), 3);

    let run = run_analysis(&mut platform, &credentials(), &params, &mut NoopObserver).unwrap();
    assert_eq!(run.result.records.len(), 1);
    let record = &run.result.records[0];
    // The ascending pass never matches the descending-only filter
    assert_eq!(record.image_count, 1);
    assert!((record.summary.unwrap().mean - 0.001).abs() < 1e-6);
}
