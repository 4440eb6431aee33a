//! Photo reference normalization
//!
//! Stored photo references accumulated in several inconsistent shapes over
//! the life of the service: plain relative paths, Windows absolute paths
//! with drive letters and backslashes, full CDN URLs, and multi-value
//! fields left behind by a pre-migration bug. `normalize_photo` collapses
//! all of them into one canonical form used both in API responses and in
//! outbound change events.

/// Path segment that marks the service's own media storage root.
pub const UPLOAD_FOLDER: &str = "uploads";

/// Normalize a raw stored photo reference into its canonical form.
///
/// Returns:
/// - `None` for empty or whitespace-only input
/// - absolute `http`/`https` URLs unchanged
/// - otherwise a forward-slash path starting exactly at the `uploads`
///   segment, falling back to the first cleaned token when no marker is
///   present anywhere in the value
///
/// The function is total: any input yields a usable reference or `None`,
/// it never fails. Legacy multi-value fields (whitespace, comma or
/// semicolon separated) resolve to the first token containing the marker.
pub fn normalize_photo(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let unified = raw.replace('\\', "/");
    let mut fallback: Option<String> = None;

    for token in unified.split(|c: char| c.is_whitespace() || c == ',' || c == ';') {
        if token.is_empty() {
            continue;
        }

        // External URLs pass through verbatim and short-circuit the scan.
        if token.starts_with("http://") || token.starts_with("https://") {
            return Some(token.to_string());
        }

        let cleaned = strip_drive_prefix(token).trim_start_matches('/');
        if cleaned.is_empty() {
            continue;
        }

        if let Some(offset) = marker_offset(cleaned) {
            return Some(cleaned[offset..].to_string());
        }

        // No marker in this token — remember the first usable one and keep
        // scanning in case a later token does contain the marker.
        if fallback.is_none() {
            fallback = Some(cleaned.to_string());
        }
    }

    fallback
}

/// Strip a single-letter drive prefix such as `C:` from the start of a token.
fn strip_drive_prefix(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &token[2..]
    } else {
        token
    }
}

/// Byte offset of the first path segment equal to [`UPLOAD_FOLDER`], if any.
///
/// Matches whole segments only, so `myuploads/a.jpg` and `uploads_old/a.jpg`
/// do not count as marker hits.
fn marker_offset(path: &str) -> Option<usize> {
    let mut start = 0;
    for segment in path.split('/') {
        if segment == UPLOAD_FOLDER {
            return Some(start);
        }
        start += segment.len() + 1;
    }
    None
}
