//! Dot-delimited virtual paths.
//!
//! Folders and resources are addressed by strings such as
//! `sprites.ui.icon`, where every segment is one folder name and the last
//! segment may be a resource name. All functions here are pure and match
//! on whole segments only, so `abc.def` is never treated as living under
//! `ab`.

use crate::error::AppError;
use crate::result::AppResult;

/// Segment delimiter.
pub const DELIMITER: char = '.';

/// Join a parent path and a leaf name. An empty parent yields the name alone.
pub fn join(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() {
        name.to_string()
    } else {
        format!("{parent_path}{DELIMITER}{name}")
    }
}

/// Return the parent of `path`, or `None` for a top-level path.
pub fn parent_of(path: &str) -> Option<&str> {
    path.rfind(DELIMITER).map(|idx| &path[..idx])
}

/// Return the last segment of `path`.
pub fn leaf_name(path: &str) -> &str {
    match path.rfind(DELIMITER) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Iterate over the segments of `path`. The empty path has no segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(DELIMITER).filter(|s| !s.is_empty())
}

/// Number of segments in `path`.
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

/// True when `path` equals `ancestor` or lies beneath it.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    path == ancestor
        || (path.len() > ancestor.len()
            && path.starts_with(ancestor)
            && path[ancestor.len()..].starts_with(DELIMITER))
}

/// True when `path` lies strictly beneath `ancestor`.
pub fn is_strict_descendant(path: &str, ancestor: &str) -> bool {
    path != ancestor && is_descendant(path, ancestor)
}

/// Replace the leading `old_prefix` of `path` with `new_prefix`.
///
/// Returns `None` when `path` is not `old_prefix` itself or one of its
/// descendants.
pub fn rewrite_prefix(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if !is_descendant(path, old_prefix) {
        return None;
    }
    let rest = &path[old_prefix.len()..];
    if new_prefix.is_empty() {
        Some(rest.trim_start_matches(DELIMITER).to_string())
    } else if old_prefix.is_empty() && !rest.is_empty() {
        Some(join(new_prefix, rest))
    } else {
        Some(format!("{new_prefix}{rest}"))
    }
}

/// Segments of `path` below `ancestor`, e.g. `("a.b.c", "a")` gives `["b", "c"]`.
pub fn relative_segments<'a>(path: &'a str, ancestor: &str) -> Option<Vec<&'a str>> {
    if !is_descendant(path, ancestor) {
        return None;
    }
    let rest = &path[ancestor.len()..];
    Some(segments(rest).collect())
}

/// Validate a single folder or resource name.
pub fn validate_segment(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name != name.trim() {
        return Err(AppError::validation(
            "Name cannot start or end with whitespace",
        ));
    }
    if name.contains(DELIMITER) {
        return Err(AppError::validation(format!(
            "Name '{name}' cannot contain '{DELIMITER}'"
        )));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AppError::validation(format!(
            "Name '{name}' cannot contain path separators"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation("Name cannot contain control characters"));
    }
    Ok(())
}

/// Validate a full dotted path, segment by segment. The empty path is valid.
pub fn validate_path(path: &str) -> AppResult<()> {
    if path.is_empty() {
        return Ok(());
    }
    for segment in path.split(DELIMITER) {
        validate_segment(segment)?;
    }
    Ok(())
}
