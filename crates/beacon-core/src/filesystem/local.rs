use std::path::{Component, Path, PathBuf};

use log::{debug, trace};

use super::{AbstractFile, Content, FileType, Filesystem, FilesystemError};

/// A filesystem rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct LocalFS {
    root: PathBuf,
}

impl LocalFS {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, FilesystemError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| FilesystemError::MetadataError {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;

        if !root.is_dir() {
            return Err(FilesystemError::GenericError(format!(
                "Document root `{}` is not a directory",
                root.display()
            )));
        }

        debug!("Serving files from {}", root.display());
        Ok(Self { root })
    }

    /// The canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to a canonical path inside the root.
    ///
    /// Parent components and absolute paths are rejected outright, symlinks pointing outside of
    /// the root are rejected after canonicalization.
    fn resolve(&self, path: &Path) -> Result<PathBuf, FilesystemError> {
        let mut target = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => target.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    trace!("Rejecting path outside of the root: {}", path.display());
                    return Err(FilesystemError::NotFound(path.to_path_buf()));
                }
            }
        }

        let canonical = target
            .canonicalize()
            .map_err(|_| FilesystemError::NotFound(path.to_path_buf()))?;

        if !canonical.starts_with(&self.root) {
            debug!(
                "Path {} escapes the document root via {}",
                path.display(),
                canonical.display()
            );
            return Err(FilesystemError::NotFound(path.to_path_buf()));
        }

        Ok(canonical)
    }
}

impl Filesystem for LocalFS {
    fn read_file(&self, path: PathBuf) -> Result<Content, FilesystemError> {
        let resolved = self.resolve(&path)?;
        let content = std::fs::read(&resolved).map_err(|e| FilesystemError::ReadFileError {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Content::new(content))
    }

    fn stat(&self, path: PathBuf) -> Result<AbstractFile, FilesystemError> {
        let resolved = self.resolve(&path)?;
        let metadata = std::fs::metadata(&resolved).map_err(|e| FilesystemError::MetadataError {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let file_type = if metadata.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };

        Ok(AbstractFile::new(path, file_type, metadata.len()))
    }

    fn exists(&self, path: PathBuf) -> Result<bool, FilesystemError> {
        match self.resolve(&path) {
            Ok(_) => Ok(true),
            Err(FilesystemError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_files(&self, path: PathBuf) -> Result<Vec<PathBuf>, FilesystemError> {
        let dir = self.resolve(&path)?;
        let entries = std::fs::read_dir(&dir).map_err(|e| FilesystemError::ListFilesError {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| path.join(entry.file_name()))
            .collect();
        files.sort();

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_fs_requires_existing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalFS::new(temp_dir.path().join("missing")).is_err());
        assert!(LocalFS::new(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_local_fs_rejects_parent_components() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("public")).unwrap();
        std::fs::write(temp_dir.path().join("secret.txt"), "nope").unwrap();

        let fs = LocalFS::new(temp_dir.path().join("public")).unwrap();
        let result = fs.read_file(PathBuf::from("../secret.txt"));
        assert!(matches!(result, Err(FilesystemError::NotFound(_))));
        assert!(!fs.exists(PathBuf::from("../secret.txt")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_local_fs_rejects_symlink_escape() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("public")).unwrap();
        std::fs::write(temp_dir.path().join("secret.txt"), "nope").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("secret.txt"),
            temp_dir.path().join("public/link.txt"),
        )
        .unwrap();

        let fs = LocalFS::new(temp_dir.path().join("public")).unwrap();
        assert!(matches!(
            fs.stat(PathBuf::from("link.txt")),
            Err(FilesystemError::NotFound(_))
        ));
    }
}
