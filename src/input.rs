/// Opening tracefiles for line iteration.
///
/// Strategy for detecting compression:
///   1. A `.gz` extension is a strong hint
///   2. Otherwise peek at the first two bytes for the gzip magic number
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;

use crate::error::{CovtreeError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "plain",
            Compression::Gzip => "gzip",
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect compression from the file name and the first bytes of content.
pub fn detect_compression(path: &Path, head: &[u8]) -> Compression {
    if detect_by_extension(path) || head.starts_with(&GZIP_MAGIC) {
        Compression::Gzip
    } else {
        Compression::None
    }
}

fn detect_by_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open a tracefile, transparently decompressing gzip input.
///
/// Any failure here is a hard error for the run.
pub fn open_tracefile(path: &Path) -> Result<(Box<dyn BufRead>, Compression)> {
    let wrap = |source: std::io::Error| CovtreeError::TraceFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(wrap)?;
    let mut reader = BufReader::new(file);
    let head = reader.fill_buf().map_err(wrap)?;
    let compression = detect_compression(path, head);

    let reader: Box<dyn BufRead> = match compression {
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(reader))),
        Compression::None => Box::new(reader),
    };
    Ok((reader, compression))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use flate2::write::GzEncoder;

    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_compression(Path::new("app.info.gz"), b""), Compression::Gzip);
        assert_eq!(detect_compression(Path::new("app.info.GZ"), b""), Compression::Gzip);
        assert_eq!(detect_compression(Path::new("app.info"), b"TN:"), Compression::None);
    }

    #[test]
    fn test_detect_by_magic() {
        assert_eq!(
            detect_compression(Path::new("app.info"), &[0x1f, 0x8b, 0x08]),
            Compression::Gzip
        );
    }

    #[test]
    fn test_open_gzip_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.info");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::default());
        encoder.write_all(b"SF:/x.c\nDA:1,1\nend_of_record\n").unwrap();
        encoder.finish().unwrap();

        let (mut reader, compression) = open_tracefile(&path).unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(compression, Compression::Gzip);
        assert_eq!(text, "SF:/x.c\nDA:1,1\nend_of_record\n");
    }

    #[test]
    fn test_open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_tracefile(&dir.path().join("nope.info")).err().unwrap();
        assert!(matches!(err, CovtreeError::TraceFile { .. }));
    }
}
