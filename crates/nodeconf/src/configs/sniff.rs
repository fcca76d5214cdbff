//! Type-tag sniffing.
//!
//! Reads the declared `"Type"` of a config file from its first few hundred
//! bytes, so files that are not configs of a known type are never fully read
//! or parsed.

/// Literal field marker, matched case-sensitively
pub const TYPE_MARKER: &[u8] = b"\"Type\":";

/// The marker must lie entirely inside this leading window
pub const MARKER_WINDOW: usize = 32;

/// The value's opening quote must appear this soon after the marker
pub const QUOTE_WINDOW: usize = 32;

/// The closing quote must appear within this many bytes of the opening quote
pub const VALUE_WINDOW: usize = 256;

/// Bytes a caller needs to read before sniffing
pub const SNIFF_LEN: usize = MARKER_WINDOW + QUOTE_WINDOW + VALUE_WINDOW;

/// Extract the declared type name, or `None` when the file does not declare
/// one inside the bounded windows.
pub fn sniff_type(head: &[u8]) -> Option<&str> {
    if head.len() < TYPE_MARKER.len() {
        return None;
    }

    let window = &head[..head.len().min(MARKER_WINDOW)];
    let marker_at = find(window, TYPE_MARKER)?;
    let after_marker = marker_at + TYPE_MARKER.len();

    let quote_limit = (after_marker + QUOTE_WINDOW).min(head.len());
    let gap = &head[after_marker..quote_limit];
    let open_offset = gap.iter().position(|&b| b == b'"')?;
    if !gap[..open_offset].iter().all(u8::is_ascii_whitespace) {
        // `"Type": 5` or similar; the next quote belongs to another field
        return None;
    }

    let open = after_marker + open_offset;
    let value_start = open + 1;
    let value_limit = (open + VALUE_WINDOW).min(head.len());
    let close = value_start + head[value_start..value_limit].iter().position(|&b| b == b'"')?;

    let name = std::str::from_utf8(&head[value_start..close]).ok()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
