use std::path::Path;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Returns the MIME type for a given file path.
pub fn from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(DEFAULT_MIME_TYPE, from_extension)
}

/// Returns the MIME type for a file extension, with or without the leading dot.
pub fn from_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().trim_start_matches('.') {
        "js" | "mjs" | "cjs" => "text/javascript",
        "map" | "json" => "application/json",
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "text/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "gif" => "image/gif",
        "jpeg" | "jpg" => "image/jpeg",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => DEFAULT_MIME_TYPE,
    }
}
