use std::{path::PathBuf, sync::Arc};

use hyper::{
    HeaderMap, Method,
    header::{self, HeaderValue},
};
use log::{debug, trace};

use super::{
    handler::{Handler, Reply, RequestInfo, Status, respond},
    mimetype,
};
use crate::{
    error::ServerError,
    filesystem::{Filesystem, FilesystemError},
};

const INDEX_FILE: &str = "index.html";

/// Serves files from a [`Filesystem`] for `GET` and `HEAD` requests
#[derive(Clone)]
pub struct StaticFiles {
    filesystem: Arc<dyn Filesystem>,
}

impl StaticFiles {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        StaticFiles { filesystem }
    }

    /// Resolve a route to a file, directories resolve to their index file.
    ///
    /// A route requested as a directory (trailing `/`) never matches a regular file.
    fn resolve_file(
        &self,
        route: PathBuf,
        as_directory: bool,
    ) -> Result<Option<PathBuf>, ServerError> {
        let stat = match self.filesystem.stat(route.clone()) {
            Ok(stat) => stat,
            Err(FilesystemError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(ServerError::FilesystemError(e)),
        };

        if stat.is_file() {
            return Ok((!as_directory).then_some(route));
        }

        let index = route.join(INDEX_FILE);
        trace!("Resolving directory to {}", index.display());
        match self.filesystem.stat(index.clone()) {
            Ok(stat) if stat.is_file() => Ok(Some(index)),
            Ok(_) | Err(FilesystemError::NotFound(_)) => Ok(None),
            Err(e) => Err(ServerError::FilesystemError(e)),
        }
    }

    fn respond_with_file(&self, file: PathBuf, head_only: bool) -> Result<Reply, ServerError> {
        let content = match self.filesystem.read_file(file.clone()) {
            Ok(content) => content,
            Err(FilesystemError::NotFound(_)) => return Ok(respond(Status::NotFound)),
            Err(e) => return Err(ServerError::FilesystemError(e)),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(mimetype::from_path(&file)),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content.len()));

        let body = if head_only {
            Vec::new()
        } else {
            content.into_bytes()
        };

        Ok(respond(Status::Ok { body, headers }))
    }
}

/// Turn a request path into a relative route, decoding each segment.
///
/// Returns `None` for segments that do not decode to UTF-8.
pub fn decode_route(path: &str) -> Option<PathBuf> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
        .collect()
}

impl Handler for StaticFiles {
    fn handle(&self, request: &RequestInfo) -> Result<Reply, ServerError> {
        let head_only = match request.method {
            Method::GET => false,
            Method::HEAD => true,
            _ => {
                debug!("Unsupported method {} for {}", request.method, request.path);
                return Ok(respond(Status::NotImplemented));
            }
        };

        let Some(route) = decode_route(&request.path) else {
            debug!("Undecodable request path: {}", request.path);
            return Ok(respond(Status::NotFound));
        };

        match self.resolve_file(route, request.path.ends_with('/'))? {
            Some(file) => self.respond_with_file(file, head_only),
            None => {
                debug!("File not found for route: {}", request.path);
                Ok(respond(Status::NotFound))
            }
        }
    }
}
