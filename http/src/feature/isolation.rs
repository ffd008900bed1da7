use crate::response::HttpResponse;

/// Headers a browser needs before it enables `SharedArrayBuffer` and
/// friends, in the order they are written.
pub const CROSS_ORIGIN_ISOLATION_HEADERS: [(&str, &str); 2] = [
    ("Cross-Origin-Opener-Policy", "same-origin"),
    ("Cross-Origin-Embedder-Policy", "require-corp"),
];

/// Response layer appending the cross-origin isolation headers.
///
/// Register it last so both headers end up right before the blank line.
/// Any value set earlier under the same names is replaced.
pub fn cross_origin_isolation(response: &mut HttpResponse) {
    for (name, value) in CROSS_ORIGIN_ISOLATION_HEADERS {
        response.headers_mut().push_last(name, value);
    }
}
