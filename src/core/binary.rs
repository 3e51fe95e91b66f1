use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

pub static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Images
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "tif", "tiff", "webp", "psd", "heic",
        "avif", "xcf",
        // Audio and video
        "mp3", "wav", "flac", "ogg", "oga", "m4a", "aac", "wma", "mp4", "m4v", "mkv", "mov",
        "avi", "wmv", "webm", "flv", "mpg", "mpeg",
        // Archives
        "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst", "lz", "lzma", "jar", "war",
        "apk", "dmg", "iso", "deb", "rpm", "whl", "egg",
        // Executables and objects
        "exe", "dll", "so", "dylib", "o", "obj", "a", "lib", "bin", "class", "pyc", "pyo",
        "wasm", "node",
        // Documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "epub",
        // Fonts
        "ttf", "otf", "woff", "woff2", "eot",
        // Data blobs
        "db", "sqlite", "sqlite3", "dat", "pak", "pck", "npy", "npz", "pkl", "parquet",
    ]
    .into_iter()
    .collect()
});

/// Classifies a path as binary from its extension alone; contents are never read.
pub fn is_binary_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(ext.to_lowercase().as_str()))
}
