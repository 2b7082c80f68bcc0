//! Extraction of the JSON payload embedded in a LiveAPI socket response.
//!
//! The accumulated response buffer is not standalone JSON; it has the shape
//!
//! ```text
//! <prolog><cpanelresult>[<error>...</error>]{...payload...}</cpanelresult>
//! ```
//!
//! where the prolog may be arbitrary banner output and a warning wrapped in
//! `<error>` tags may precede the payload.

/// Opening tag surrounding a LiveAPI result.
pub const RESULT_OPEN: &str = "<cpanelresult>";
/// Closing tag surrounding a LiveAPI result; also the end-of-response marker
/// the socket transport accumulates toward.
pub const RESULT_CLOSE: &str = "</cpanelresult>";
/// Closing tag of an embedded warning preceding the payload.
const ERROR_CLOSE: &str = "</error>";

/// Extract the `{...}` JSON payload from an accumulated response buffer.
///
/// The start of the payload is located by trying, in order:
/// 1. the opening tag immediately followed by `{`;
/// 2. an `</error>` tag immediately followed by `{` (a warning preceded the
///    payload);
/// 3. the first `>{` sequence anywhere in the buffer.
///
/// The end is the *last* occurrence of the closing tag. A buffer that already
/// begins with `{` is returned whole, which makes extraction idempotent on
/// its own output. Returns `None` when no start marker or no closing tag is
/// found; the caller decides how to report the raw buffer.
#[must_use]
pub fn extract_payload(buf: &str) -> Option<&str> {
    if buf.starts_with('{') {
        return Some(buf);
    }

    let start = find_payload_start(buf)?;
    let end = buf.rfind(RESULT_CLOSE)?;
    if end < start {
        return None;
    }
    Some(&buf[start..end])
}

fn find_payload_start(buf: &str) -> Option<usize> {
    let open_brace = format!("{RESULT_OPEN}{{");
    if let Some(n) = buf.find(&open_brace) {
        return Some(n + RESULT_OPEN.len());
    }
    let error_brace = format!("{ERROR_CLOSE}{{");
    if let Some(n) = buf.find(&error_brace) {
        return Some(n + ERROR_CLOSE.len());
    }
    buf.find(">{").map(|n| n + 1)
}
