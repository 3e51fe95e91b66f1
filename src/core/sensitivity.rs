/// Flags files whose name suggests they hold credentials.
///
/// Only the basename is considered, case-insensitively: it must start with
/// `.env`, end with `.pem` or `.key`, or contain `secret`. File contents are
/// never inspected. Flagged files stay visible in the listing but cannot be
/// selected.
///
/// Paths are `/`-separated, so a backslash is just part of the name.
pub fn is_sensitive(relative_path: &str) -> bool {
    let name = relative_path
        .rsplit('/')
        .next()
        .unwrap_or(relative_path)
        .to_lowercase();

    name.starts_with(".env")
        || name.ends_with(".pem")
        || name.ends_with(".key")
        || name.contains("secret")
}
