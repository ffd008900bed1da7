use std::path::Path;

/// Guess the `Content-Type` of a file from its extension
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
