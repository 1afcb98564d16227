//! Path rewrite from the gateway mount to the upstream API.
//!
//! `{mount_prefix}/a/b/c?x=1` → `{base_url}/a/b/c?x=1`
//!
//! Segments are taken from the raw (still percent-encoded) path, so encoded
//! characters reach the upstream exactly as the client sent them. Empty
//! segments (`a//b`) are dropped. Dot segments, encoded or not, are rejected
//! so a target can never climb above the base URL's path. The query string is
//! appended verbatim.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("path `{path}` is not under mount prefix `{prefix}`")]
    OutsidePrefix { path: String, prefix: String },

    #[error("path `{path}` contains a dot segment")]
    DotSegment { path: String },
}

/// Return the wildcard suffix segments of `path` below `mount_prefix`.
pub fn path_segments<'a>(path: &'a str, mount_prefix: &str) -> Result<Vec<&'a str>, RewriteError> {
    let rest = path
        .strip_prefix(mount_prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or_else(|| RewriteError::OutsidePrefix {
            path: path.to_string(),
            prefix: mount_prefix.to_string(),
        })?;

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| is_dot_segment(s)) {
        return Err(RewriteError::DotSegment {
            path: path.to_string(),
        });
    }
    Ok(segments)
}

/// `.` or `..`, including the `%2e` spellings URL parsers also resolve.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Build the upstream target URL for an inbound path and query.
pub fn rewrite_target(
    base_url: &str,
    mount_prefix: &str,
    path: &str,
    query: Option<&str>,
) -> Result<String, RewriteError> {
    let segments = path_segments(path, mount_prefix)?;

    let mut target = format!("{}/{}", base_url, segments.join("/"));
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(q);
    }
    Ok(target)
}
