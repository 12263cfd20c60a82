//! Filesystem collaborators consumed by the operation handlers.
//!
//! The handlers never touch the filesystem directly; they go through the
//! three functions here, which resolve names strictly under the served
//! root directory.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

/// Failures raised by the filesystem collaborators.
#[derive(Debug, Error)]
pub enum FsError {
    /// No regular file with this name exists under the served root.
    #[error("file {name:?} not found under the served root")]
    NotFound {
        /// Name the peer asked for.
        name: String,
    },
    /// The requested range extends past the end of the file.
    #[error("short read on {name:?}: wanted {expected} bytes, got {actual}")]
    ShortRead {
        /// Name the peer asked for.
        name: String,
        /// Bytes the request covered.
        expected: u64,
        /// Bytes actually available at the requested offset.
        actual: u64,
    },
    /// Any other I/O failure while touching the served tree.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Enumerates the regular files directly under `root`.
///
/// Order is whatever the directory iterator yields; callers do not resort.
/// Names that are not valid UTF-8 are carried lossily.
pub fn list_regular_files(root: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Returns the size in bytes of the regular file `name` under `root`.
pub fn stat_size(root: &Path, name: &str) -> Result<u64, FsError> {
    let path = root.join(name);
    match fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
        Ok(_) => Err(FsError::NotFound {
            name: name.to_owned(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => Err(FsError::NotFound {
            name: name.to_owned(),
        }),
        Err(source) => Err(FsError::Io(source)),
    }
}

/// Reads exactly `len` bytes of `name` starting at byte `offset`.
///
/// A file that ends before the range does yields [`FsError::ShortRead`],
/// never a truncated buffer.
pub fn read_range(root: &Path, name: &str, offset: u64, len: u64) -> Result<Vec<u8>, FsError> {
    let path = root.join(name);
    let mut file = match File::open(&path) {
        Ok(file) => file,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Err(FsError::NotFound {
                name: name.to_owned(),
            });
        }
        Err(source) => return Err(FsError::Io(source)),
    };

    file.seek(SeekFrom::Start(offset))?;
    let mut data = Vec::new();
    file.take(len).read_to_end(&mut data)?;
    if (data.len() as u64) < len {
        return Err(FsError::ShortRead {
            name: name.to_owned(),
            expected: len,
            actual: data.len() as u64,
        });
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(files: &[(&str, &[u8])]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let mut file = File::create(dir.path().join(name)).unwrap();
            file.write_all(contents).unwrap();
        }
        dir
    }

    #[test]
    fn listing_reports_regular_files_only() {
        let dir = fixture(&[("a.txt", b"a"), ("b.bin", b"b")]);
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let mut names = list_regular_files(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, ["a.txt", "b.bin"]);
    }

    #[test]
    fn listing_an_empty_directory_yields_nothing() {
        let dir = fixture(&[]);
        assert!(list_regular_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn stat_size_reports_the_byte_length() {
        let dir = fixture(&[("file.dat", &[0u8; 4096])]);
        assert_eq!(stat_size(dir.path(), "file.dat").unwrap(), 4096);
    }

    #[test]
    fn stat_size_misses_are_not_found() {
        let dir = fixture(&[]);
        assert!(matches!(
            stat_size(dir.path(), "ghost.txt"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn stat_size_rejects_directories() {
        let dir = fixture(&[]);
        fs::create_dir(dir.path().join("nested")).unwrap();
        assert!(matches!(
            stat_size(dir.path(), "nested"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn read_range_returns_the_exact_window() {
        let dir = fixture(&[("seq.bin", &(0..=99u8).collect::<Vec<_>>())]);
        let data = read_range(dir.path(), "seq.bin", 10, 5).unwrap();
        assert_eq!(data, [10, 11, 12, 13, 14]);
    }

    #[test]
    fn read_range_past_the_end_is_a_short_read() {
        let dir = fixture(&[("short.bin", &[7u8; 40])]);
        let err = read_range(dir.path(), "short.bin", 10, 50).unwrap_err();
        assert!(matches!(
            err,
            FsError::ShortRead {
                expected: 50,
                actual: 30,
                ..
            }
        ));
    }

    #[test]
    fn read_range_of_a_missing_file_is_not_found() {
        let dir = fixture(&[]);
        assert!(matches!(
            read_range(dir.path(), "ghost.bin", 0, 1),
            Err(FsError::NotFound { .. })
        ));
    }
}
