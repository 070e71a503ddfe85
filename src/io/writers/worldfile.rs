use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

fn world_file_path(image: &Path) -> PathBuf {
    let ext = image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let world_ext = match ext.as_str() {
        "jpg" | "jpeg" => "jgw".to_string(),
        "png" => "pgw".to_string(),
        "tif" | "tiff" => "tfw".to_string(),
        // First letter + last letter + "w", e.g. gif -> gfw
        other if other.len() >= 2 => {
            let first = other.chars().next().unwrap_or('w');
            let last = other.chars().last().unwrap_or('w');
            format!("{first}{last}w")
        }
        _ => "wld".to_string(),
    };
    image.with_extension(world_ext)
}

/// Write a world file next to `image`. World files use the pixel-centre convention.
pub fn write_world_file(image: &Path, geotransform: [f64; 6]) -> Result<PathBuf> {
    let path = world_file_path(image);

    // A, D, B, E, then C, F at the centre of the upper-left pixel
    let a = geotransform[1];
    let d = geotransform[4];
    let b = geotransform[2];
    let e = geotransform[5];
    let c = geotransform[0] + 0.5 * a + 0.5 * b;
    let f = geotransform[3] + 0.5 * d + 0.5 * e;

    let mut file = File::create(&path)?;
    for v in [a, d, b, e, c, f] {
        writeln!(file, "{:.12}", v)?;
    }
    Ok(path)
}

/// Write a .prj file next to `image` with the given WKT.
pub fn write_prj_file(image: &Path, projection: &str) -> Result<PathBuf> {
    let path = image.with_extension("prj");
    std::fs::write(&path, projection.as_bytes())?;
    Ok(path)
}
