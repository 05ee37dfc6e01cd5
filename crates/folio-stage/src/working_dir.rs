use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use folio_types::EntityId;
use tracing::debug;

use crate::error::{StageError, StageResult};

/// Copies byte streams into a local staging area.
///
/// Object-safe and `Send + Sync` so the orchestrator can hold an
/// `Arc<dyn Stager>` and tests can substitute a recording double.
pub trait Stager: Send + Sync {
    /// Copy all of `stream` to the staging path for `(id, name)` and return
    /// that path. An existing file at the path is overwritten.
    fn stage(&self, id: &EntityId, name: &str, stream: &mut dyn Read) -> StageResult<PathBuf>;
}

/// Filesystem stager rooted at a configured working directory.
#[derive(Clone, Debug)]
pub struct WorkingDirectory {
    root: PathBuf,
}

impl WorkingDirectory {
    /// A relative `root` is resolved against the current directory so that
    /// staged paths handed to jobs are absolute.
    pub fn new(root: impl AsRef<Path>) -> StageResult<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| StageError::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The deterministic staging path for `(id, name)`.
    pub fn path_for(&self, id: &EntityId, name: &str) -> StageResult<PathBuf> {
        validate_file_name(name)?;
        let mut path = self.root.clone();
        for shard in id.path_shards() {
            path.push(shard);
        }
        path.push(name);
        Ok(path)
    }
}

impl Stager for WorkingDirectory {
    fn stage(&self, id: &EntityId, name: &str, stream: &mut dyn Read) -> StageResult<PathBuf> {
        let path = self.path_for(id, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StageError::io(parent, e))?;
        }

        let file = File::create(&path).map_err(|e| StageError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        let bytes = io::copy(stream, &mut writer).map_err(|e| StageError::io(&path, e))?;
        writer.flush().map_err(|e| StageError::io(&path, e))?;

        debug!(id = %id, path = %path.display(), bytes, "staged working file");
        Ok(path)
    }
}

/// A staged filename must be exactly one normal path segment.
fn validate_file_name(name: &str) -> StageResult<()> {
    let invalid = |reason: &str| StageError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("file name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("file name must not be a relative directory"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("file name must not contain path separators"));
    }
    if name.contains('\0') {
        return Err(invalid("file name must not contain NUL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    #[test]
    fn stages_to_sharded_path() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = WorkingDirectory::new(tmp.path()).unwrap();

        let path = wd
            .stage(&id("abcd1234"), "photo.jpg", &mut Cursor::new(b"jpeg-bytes".to_vec()))
            .unwrap();

        assert_eq!(path, tmp.path().join("ab/cd/12/34/photo.jpg"));
        assert_eq!(fs::read(&path).unwrap(), b"jpeg-bytes");
    }

    #[test]
    fn restaging_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = WorkingDirectory::new(tmp.path()).unwrap();

        let first = wd
            .stage(&id("abcd1234"), "photo.jpg", &mut Cursor::new(b"a much longer first body".to_vec()))
            .unwrap();
        let second = wd
            .stage(&id("abcd1234"), "photo.jpg", &mut Cursor::new(b"second".to_vec()))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second");
        let siblings = fs::read_dir(second.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }

    #[test]
    fn long_ids_use_only_four_shards() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = WorkingDirectory::new(tmp.path()).unwrap();
        let path = wd.path_for(&id("x633f104mabc"), "a.txt").unwrap();
        assert_eq!(path, tmp.path().join("x6/33/f1/04/a.txt"));
    }

    #[test]
    fn rejects_names_that_escape() {
        let tmp = tempfile::tempdir().unwrap();
        let wd = WorkingDirectory::new(tmp.path()).unwrap();
        for name in ["", ".", "..", "../x", "a/b", "a\\b"] {
            assert!(
                matches!(wd.path_for(&id("ab"), name), Err(StageError::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn staged_paths_are_absolute() {
        let wd = WorkingDirectory::new("relative/root").unwrap();
        assert!(wd.root().is_absolute());
        assert!(wd.path_for(&id("ab"), "a.txt").unwrap().is_absolute());
    }

    #[test]
    fn read_failure_surfaces_as_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        let tmp = tempfile::tempdir().unwrap();
        let wd = WorkingDirectory::new(tmp.path()).unwrap();
        let err = wd.stage(&id("ab"), "a.txt", &mut Broken).unwrap_err();
        assert!(matches!(err, StageError::Io { .. }));
    }

    proptest! {
        #[test]
        fn path_stays_under_root(raw in "[a-zA-Z0-9_-]{1,24}", name in "[a-zA-Z0-9_. -]{1,16}") {
            prop_assume!(name != "." && name != "..");
            let wd = WorkingDirectory::new("/srv/working").unwrap();
            let path = wd.path_for(&id(&raw), &name).unwrap();
            prop_assert!(path.starts_with("/srv/working"));
            prop_assert_eq!(path.file_name().unwrap().to_str().unwrap(), name.as_str());
            let depth = path.strip_prefix("/srv/working").unwrap().components().count();
            prop_assert_eq!(depth, id(&raw).path_shards().len() + 1);
        }
    }
}
