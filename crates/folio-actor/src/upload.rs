use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use folio_stage::{StageError, StageResult};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Source {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// An incoming file: a byte source plus what the client declared about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    source: Source,
    original_filename: Option<String>,
    content_type: Option<String>,
}

impl Upload {
    /// An upload read from a local path, e.g. a web server's temp file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
            original_filename: None,
            content_type: None,
        }
    }

    /// An upload held in memory under a declared filename.
    pub fn from_bytes(original_filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: Source::Bytes(bytes.into()),
            original_filename: Some(original_filename.into()),
            content_type: None,
        }
    }

    pub fn with_original_filename(mut self, name: impl Into<String>) -> Self {
        self.original_filename = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Bytes(_) => None,
        }
    }

    /// The declared filename, falling back to the base name of the path.
    pub fn file_name(&self) -> Option<&str> {
        if let Some(name) = self.original_filename.as_deref().filter(|n| !n.is_empty()) {
            return Some(name);
        }
        self.path()?.file_name()?.to_str()
    }

    /// Open the byte stream.
    pub fn open(&self) -> StageResult<Box<dyn Read + '_>> {
        match &self.source {
            Source::File(path) => {
                let file = File::open(path).map_err(|source| StageError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(file))
            }
            Source::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_filename_wins() {
        let upload = Upload::from_path("/tmp/RackMultipart123").with_original_filename("report.pdf");
        assert_eq!(upload.file_name(), Some("report.pdf"));
    }

    #[test]
    fn falls_back_to_path_base_name() {
        let upload = Upload::from_path("/tmp/uploads/scan.tif");
        assert_eq!(upload.file_name(), Some("scan.tif"));
        assert_eq!(Upload::from_path("/").file_name(), None);
    }

    #[test]
    fn empty_declared_filename_is_ignored() {
        let upload = Upload::from_path("/tmp/a.txt").with_original_filename("");
        assert_eq!(upload.file_name(), Some("a.txt"));
    }

    #[test]
    fn opens_file_and_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, b"on disk").unwrap();

        let mut body = String::new();
        Upload::from_path(&path).open().unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "on disk");

        let mut body = Vec::new();
        Upload::from_bytes("b.txt", b"in memory".to_vec())
            .open()
            .unwrap()
            .read_to_end(&mut body)
            .unwrap();
        assert_eq!(body, b"in memory");
    }

    #[test]
    fn missing_file_fails_to_open() {
        let err = Upload::from_path("/definitely/not/here.txt").open().err().unwrap();
        assert!(matches!(err, StageError::Io { .. }));
    }
}
