use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Bytes escaped in links: all but unreserved characters and the separator
const PATH_SEGMENTS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// find the last position of the header
///
/// if found, return the position of the end of the header
/// if not found, return None
pub fn find_headers_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4) // use windows to find the last position of the header
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Resolve `%XX` escapes. Malformed escapes are kept literally and
/// invalid UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Percent-encode everything except unreserved characters and `/`
pub fn percent_encode_path(input: &str) -> String {
    utf8_percent_encode(input, PATH_SEGMENTS).to_string()
}

/// Escape text for an HTML body or attribute
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
