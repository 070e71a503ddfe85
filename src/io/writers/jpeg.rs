use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};

pub fn write_rgb_jpeg(output: &Path, cols: usize, rows: usize, rgb_data: &[u8]) -> Result<()> {
    let too_large = |v: usize| Error::InvalidArgument {
        arg: "quicklook_size",
        value: v.to_string(),
    };
    let width = u16::try_from(cols).map_err(|_| too_large(cols))?;
    let height = u16::try_from(rows).map_err(|_| too_large(rows))?;

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, 90);
    encoder
        .encode(rgb_data, width, height, ColorType::Rgb)
        .map_err(Error::external)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_jfif_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.jpg");
        write_rgb_jpeg(&path, 4, 2, &[200u8; 4 * 2 * 3]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert!(write_rgb_jpeg(&path, 70_000, 1, &[]).is_err());
    }
}
