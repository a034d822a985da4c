/// Checks whether all bytes in the given slice may appear in a container id.
///
/// Accepts ASCII letters, digits and the separators `_`, `.` and `-`. Anything
/// else, including `/`, whitespace and non-ASCII bytes, is rejected.
///
/// # Arguments
///
/// * `src` - A byte slice to check.
pub(super) fn is_valid_id(src: &[u8]) -> bool {
    src.iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}
