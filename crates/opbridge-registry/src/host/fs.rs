//! File operations.
//!
//! Paths come straight from script code.  Without a root directory they are
//! used as given; with one, relative paths resolve against it and anything
//! that normalizes to a location outside it is refused.

use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{OpError, OpResult};
use crate::marshal;

/// Host implementation of `read_file`, `write_file` and `remove_file`.
#[derive(Debug, Clone, Default)]
pub struct FileOps {
    root_dir: Option<PathBuf>,
}

impl FileOps {
    pub fn new(root_dir: Option<PathBuf>) -> Self {
        Self { root_dir }
    }

    /// Resolve a script-supplied path, enforcing root confinement when a
    /// root directory is configured.
    pub fn resolve(&self, raw_path: &str) -> OpResult<PathBuf> {
        let Some(root) = &self.root_dir else {
            return Ok(PathBuf::from(raw_path));
        };

        let canon_root = root.canonicalize().unwrap_or_else(|_| normalize_path(root));
        let candidate = if Path::new(raw_path).is_absolute() {
            PathBuf::from(raw_path)
        } else {
            canon_root.join(raw_path)
        };

        // The target may not exist yet, so normalize lexically instead of
        // calling canonicalize() on it.
        let normalized = normalize_path(&candidate);

        if !normalized.starts_with(&canon_root) {
            return Err(outside_root(raw_path, &normalized, &canon_root));
        }

        // Lexical checks do not see symlinks: the deepest entry that exists
        // on disk must also land inside the root once links are followed.
        if let Some(existing) = deepest_existing(&normalized).filter(|p| p.starts_with(&canon_root)) {
            let real = existing.canonicalize().map_err(|e| {
                OpError::invalid_argument(format!(
                    "path `{raw_path}` cannot be resolved inside the root directory: {e}"
                ))
            })?;
            if !real.starts_with(&canon_root) {
                return Err(outside_root(raw_path, &real, &canon_root));
            }
        }
        Ok(normalized)
    }

    pub async fn read_file(&self, args: Vec<Value>) -> OpResult<Value> {
        let raw: String = marshal::arg(&args, 0, "path")?;
        let path = self.resolve(&raw)?;
        debug!(path = %path.display(), "reading file");

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| with_path(e, &raw))?;
        Ok(marshal::bytes_value(bytes))
    }

    pub async fn write_file(&self, args: Vec<Value>) -> OpResult<Value> {
        let raw: String = marshal::arg(&args, 0, "path")?;
        let contents = args
            .get(1)
            .ok_or_else(|| OpError::invalid_argument("missing argument `contents`"))?;
        let bytes = marshal::contents_bytes(contents, "contents")?;
        let path = self.resolve(&raw)?;
        debug!(path = %path.display(), bytes = bytes.len(), "writing file");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| with_path(e, &raw))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| with_path(e, &raw))?;
        Ok(Value::Null)
    }

    /// Synchronous: removal is a single metadata update.
    pub fn remove_file(&self, args: &[Value]) -> OpResult<Value> {
        let raw: String = marshal::arg(args, 0, "path")?;
        let path = self.resolve(&raw)?;
        debug!(path = %path.display(), "removing file");

        std::fs::remove_file(&path).map_err(|e| with_path(e, &raw))?;
        Ok(Value::Null)
    }
}

/// Keep the io category but name the script-supplied path in the message.
fn with_path(err: std::io::Error, raw_path: &str) -> OpError {
    let mut op_err = OpError::from(err);
    op_err.message = format!("{raw_path}: {}", op_err.message);
    op_err
}

fn outside_root(raw_path: &str, resolved: &Path, root: &Path) -> OpError {
    OpError::invalid_argument(format!(
        "path `{raw_path}` resolves to `{}` which is outside the root directory `{}`",
        resolved.display(),
        root.display(),
    ))
}

/// The longest prefix of `path` with an entry on disk.  Dangling symlinks
/// count as existing.
fn deepest_existing(path: &Path) -> Option<&Path> {
    path.ancestors()
        .find(|p| std::fs::symlink_metadata(p).is_ok())
}

/// Lexically normalize a path by resolving `.` and `..` components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            Component::CurDir => {}
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn normalize_path_resolves_parent_components() {
        let p = Path::new("/tmp/sandbox/sub/../other");
        assert_eq!(normalize_path(p), PathBuf::from("/tmp/sandbox/other"));
    }

    #[test]
    fn normalize_path_resolves_current_dir_components() {
        let p = Path::new("/tmp/./sandbox/./file.txt");
        assert_eq!(normalize_path(p), PathBuf::from("/tmp/sandbox/file.txt"));
    }

    #[test]
    fn unconfined_paths_pass_through() {
        let files = FileOps::default();
        assert_eq!(
            files.resolve("../anywhere.txt").unwrap(),
            PathBuf::from("../anywhere.txt")
        );
    }

    #[test]
    fn path_traversal_is_blocked() {
        let files = FileOps::new(Some(PathBuf::from("/tmp/opbridge-root")));
        let err = files.resolve("../../etc/passwd").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("outside the root directory"));
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let files = FileOps::new(Some(root.clone()));

        files
            .write_file(vec![json!("nested/log.txt"), json!("I can write to a file.")])
            .await
            .unwrap();
        let read = files.read_file(vec![json!("nested/log.txt")]).await.unwrap();
        assert_eq!(read, json!("I can write to a file."));
        assert!(root.join("nested/log.txt").exists());
    }

    #[tokio::test]
    async fn binary_contents_come_back_as_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileOps::new(Some(dir.path().to_path_buf()));

        files
            .write_file(vec![json!("blob.bin"), json!([0, 159, 146, 150])])
            .await
            .unwrap();
        let read = files.read_file(vec![json!("blob.bin")]).await.unwrap();
        assert_eq!(read, json!([0, 159, 146, 150]));
    }

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileOps::new(Some(dir.path().to_path_buf()));
        let err = files.read_file(vec![json!("absent.txt")]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err.message.starts_with("absent.txt: "));
    }

    #[test]
    fn remove_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileOps::new(Some(dir.path().to_path_buf()));
        let err = files.remove_file(&[json!("absent.txt")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn read_directory_is_io() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let files = FileOps::new(Some(dir.path().to_path_buf()));
        let err = files.read_file(vec![json!("sub")]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[tokio::test]
    async fn write_through_a_regular_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileOps::new(Some(dir.path().to_path_buf()));
        files
            .write_file(vec![json!("f.txt"), json!("plain")])
            .await
            .unwrap();
        let err = files
            .write_file(vec![json!("f.txt/child"), json!("x")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_root_is_blocked() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "outside data").unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();
        let files = FileOps::new(Some(root.path().to_path_buf()));

        let err = files
            .read_file(vec![json!("link/secret.txt")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let err = files
            .write_file(vec![json!("link/planted.txt"), json!("x")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(!outside.path().join("planted.txt").exists());

        let err = files
            .write_file(vec![json!("link/deeper/planted.txt"), json!("x")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let err = files.remove_file(&[json!("link/secret.txt")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(outside.path().join("secret.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dangling_symlink_is_blocked() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("not-yet.txt");
        std::os::unix::fs::symlink(&target, root.path().join("dangling")).unwrap();
        let files = FileOps::new(Some(root.path().to_path_buf()));

        let err = files
            .write_file(vec![json!("dangling"), json!("x")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_inside_root_is_allowed() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("real")).unwrap();
        std::fs::write(root.path().join("real/data.txt"), "inside").unwrap();
        std::os::unix::fs::symlink(root.path().join("real"), root.path().join("alias")).unwrap();
        let files = FileOps::new(Some(root.path().to_path_buf()));

        let read = files.read_file(vec![json!("alias/data.txt")]).await.unwrap();
        assert_eq!(read, json!("inside"));
    }

    #[test]
    fn remove_directory_is_io() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let files = FileOps::new(Some(dir.path().to_path_buf()));
        let err = files.remove_file(&[json!("sub")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
