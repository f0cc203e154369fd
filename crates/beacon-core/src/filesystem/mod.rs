use std::path::PathBuf;

use thiserror::Error;

pub mod local;
pub mod mock;

#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("No such file: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read file `{path}`: {message}")]
    ReadFileError { path: PathBuf, message: String },

    #[error("Failed to read metadata of `{path}`: {message}")]
    MetadataError { path: PathBuf, message: String },

    #[error("Failed to list files in `{path}`: {message}")]
    ListFilesError { path: PathBuf, message: String },

    #[error("{0}")]
    GenericError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
}

/// A file or directory as seen through a [`Filesystem`]
#[derive(Debug, Clone)]
pub struct AbstractFile {
    pub path: PathBuf,
    pub file_type: FileType,
    pub size: u64,
}

impl AbstractFile {
    pub fn new(path: PathBuf, file_type: FileType, size: u64) -> Self {
        Self {
            path,
            file_type,
            size,
        }
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// The raw content of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(Vec<u8>);

impl Content {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only access to the files being served.
///
/// Paths are relative to the root of the implementation; anything that would resolve outside
/// of that root is reported as [`FilesystemError::NotFound`].
pub trait Filesystem: Send + Sync {
    /// Read the full content of a file
    fn read_file(&self, path: PathBuf) -> Result<Content, FilesystemError>;

    /// Get the type and size of a file or directory
    fn stat(&self, path: PathBuf) -> Result<AbstractFile, FilesystemError>;

    /// Check whether a file or directory exists
    fn exists(&self, path: PathBuf) -> Result<bool, FilesystemError>;

    /// List the entries of a directory, relative to the root
    fn list_files(&self, path: PathBuf) -> Result<Vec<PathBuf>, FilesystemError>;
}
