===== src/io.rs =====
//! File-backed convenience loaders (spec §9 "File layer (outside the
//! core)"): the parser core only ever consumes a pointer+length pair,
//! so this module's only job is turning a path into one via `memmap2`,
//! matching the reference implementation's `mmap_for_read`/
//! `mmap_for_write` (`original_source/include/flatjson/io.hpp`).
//!
//! Gated behind the `mmap` feature so the core stays dependency-light
//! for callers who only ever parse in-memory buffers.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use memmap2::{Mmap, MmapMut};

use crate::config::Config;
use crate::document::Document;
use crate::error::ParseError;

/// Either a parse failure or the underlying file I/O failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Memory-maps `path` read-only and parses its full contents.
pub fn parse_file(path: impl AsRef<Path>, cfg: &Config) -> Result<Document, LoadError> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Document::parse(&mmap, cfg)?)
}

/// Writes `bytes` to `path` through a writable memory map, matching
/// the reference implementation's `mmap_for_write` sizing discipline
/// (truncate-then-map rather than streaming writes).
pub fn write_file(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), io::Error> {
    let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
    file.set_len(bytes.len() as u64)?;
    let mut mmap = unsafe { MmapMut::map_mut(&file)? };
    mmap[..bytes.len()].copy_from_slice(bytes);
    mmap.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_file_reads_and_parses_mapped_contents() {
        let mut tmp = tempfile_for_test(br#"{"a":1,"b":[1,2,3]}"#);
        tmp.flush().unwrap();
        let path = tmp.path().to_path_buf();
        let doc = parse_file(&path, &Config::default()).expect("should parse");
        assert_eq!(doc.members(), 2);
    }

    #[test]
    fn write_file_then_parse_file_round_trips() {
        let dir = std::env::temp_dir();
        let path = dir.join("flatjson_io_roundtrip_test.json");
        write_file(&path, br#"{"x":42}"#).unwrap();
        let doc = parse_file(&path, &Config::default()).unwrap();
        assert_eq!(doc.to_vec(), br#"{"x":42}"#.to_vec());
        let _ = std::fs::remove_file(&path);
    }

    struct NamedTemp {
        path: std::path::PathBuf,
        file: File,
    }

    impl NamedTemp {
        fn path(&self) -> &std::path::Path {
            &self.path
        }
    }

    impl Write for NamedTemp {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.file.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl Drop for NamedTemp {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn tempfile_for_test(contents: &[u8]) -> NamedTemp {
        let path = std::env::temp_dir().join(format!(
            "flatjson_io_test_{}.json",
            std::process::id()
        ));
        let mut file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(&path).unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        NamedTemp { path, file }
    }
}


