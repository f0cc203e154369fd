use std::{
    collections::BTreeMap,
    path::{Component, PathBuf},
};

use super::{AbstractFile, Content, FileType, Filesystem, FilesystemError};

/// An in-memory filesystem for tests.
///
/// Directories exist implicitly whenever a file lives beneath them.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(normalize(path.into()), content.into());
        self
    }

    fn is_directory(&self, path: &PathBuf) -> bool {
        path.as_os_str().is_empty()
            || self
                .files
                .keys()
                .any(|file| file.starts_with(path) && file != path)
    }
}

fn normalize(path: PathBuf) -> PathBuf {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

fn escapes_root(path: &PathBuf) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

impl Filesystem for MockFilesystem {
    fn read_file(&self, path: PathBuf) -> Result<Content, FilesystemError> {
        if escapes_root(&path) {
            return Err(FilesystemError::NotFound(path));
        }

        match self.files.get(&normalize(path.clone())) {
            Some(content) => Ok(Content::new(content.clone())),
            None => Err(FilesystemError::ReadFileError {
                path,
                message: "File not found in mock filesystem".to_string(),
            }),
        }
    }

    fn stat(&self, path: PathBuf) -> Result<AbstractFile, FilesystemError> {
        if escapes_root(&path) {
            return Err(FilesystemError::NotFound(path));
        }

        let key = normalize(path.clone());
        if let Some(content) = self.files.get(&key) {
            return Ok(AbstractFile::new(path, FileType::File, content.len() as u64));
        }
        if self.is_directory(&key) {
            return Ok(AbstractFile::new(path, FileType::Directory, 0));
        }

        Err(FilesystemError::NotFound(path))
    }

    fn exists(&self, path: PathBuf) -> Result<bool, FilesystemError> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(FilesystemError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_files(&self, path: PathBuf) -> Result<Vec<PathBuf>, FilesystemError> {
        let dir = normalize(path.clone());
        if !self.is_directory(&dir) {
            return Err(FilesystemError::ListFilesError {
                path,
                message: "Not a directory in mock filesystem".to_string(),
            });
        }

        let mut entries: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(&dir).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| dir.join(first))
            .collect();
        entries.dedup();

        Ok(entries)
    }
}
