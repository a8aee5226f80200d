//! URI <-> filesystem path conversion.
//!
//! `textDocument` URIs arrive as `file://` strings; the workspace scanner
//! and document store key by native path instead. These two functions are
//! the only bridge between the two; every other crate treats a path as
//! opaque text.

#![deny(unsafe_code)]

/// Convert a filesystem path to a `file://` URI.
///
/// Backslashes are turned into forward slashes before the `file:///`
/// prefix is applied. A value that already looks like a `file://` URI is
/// returned unchanged.
pub fn path_to_uri(path: &str) -> String {
    if path.starts_with("file://") {
        return path.to_string();
    }
    format!("file:///{}", path.replace('\\', "/"))
}

/// Convert a `file://` URI back to a native filesystem path.
///
/// Strips a `file:///` or `file://` prefix (in that order), then turns
/// forward slashes into the platform's own separator. On platforms whose
/// separator already is `/` this is a no-op, so POSIX paths round-trip
/// exactly — unlike an unconditional `/` -> `\` substitution, which would
/// corrupt every POSIX path it touched.
pub fn uri_to_path(uri: &str) -> String {
    let rest = uri.strip_prefix("file:///").or_else(|| uri.strip_prefix("file://")).unwrap_or(uri);
    rest.replace('/', std::path::MAIN_SEPARATOR_STR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_posix_path_to_uri() {
        assert_eq!(path_to_uri("/tmp/foo.claw"), "file:////tmp/foo.claw");
    }

    #[test]
    fn converts_windows_style_path_to_uri() {
        assert_eq!(path_to_uri(r"C:\work\foo.claw"), "file:///C:/work/foo.claw");
    }

    #[test]
    fn leaves_existing_file_uri_unchanged() {
        assert_eq!(path_to_uri("file:///already/a/uri.claw"), "file:///already/a/uri.claw");
    }

    #[test]
    fn recovers_posix_path_from_uri() {
        assert_eq!(uri_to_path("file:////tmp/foo.claw"), "/tmp/foo.claw");
    }

    #[test]
    fn strips_two_slash_prefix_too() {
        assert_eq!(uri_to_path("file://tmp/foo.claw"), "tmp/foo.claw".replace('/', std::path::MAIN_SEPARATOR_STR));
    }

    #[test]
    fn roundtrips_posix_path() {
        let uri = path_to_uri("/a/b/c.volt");
        assert_eq!(uri_to_path(&uri), "/a/b/c.volt");
    }
}
