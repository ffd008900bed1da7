use crate::utils::percent_decode;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HttpUri {
    /// Request target exactly as sent
    pub raw: String,
    /// Path part, still percent-encoded
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
}

impl HttpUri {
    /// Path with `%XX` escapes resolved
    pub fn decoded_path(&self) -> String {
        percent_decode(&self.path)
    }
}

impl From<&str> for HttpUri {
    fn from(value: &str) -> Self {
        // fragments are never meant for the server
        let without_fragment = value.split('#').next().unwrap_or_default();
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (without_fragment, None),
        };

        // `//host/...` would turn into a scheme-relative URL when echoed back
        let path = match path.starts_with("//") {
            true => format!("/{}", path.trim_start_matches('/')),
            false => path.to_string(),
        };

        HttpUri {
            raw: value.to_string(),
            path,
            query,
        }
    }
}

impl From<String> for HttpUri {
    fn from(value: String) -> Self {
        HttpUri::from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_query_and_fragment() {
        let uri = HttpUri::from("/a%20b/c.html?x=1&y=2#top");
        assert_eq!(uri.path, "/a%20b/c.html");
        assert_eq!(uri.query.as_deref(), Some("x=1&y=2"));
        assert_eq!(uri.decoded_path(), "/a b/c.html");
        assert_eq!(uri.raw, "/a%20b/c.html?x=1&y=2#top");
    }

    #[test]
    fn test_leading_slashes_collapsed() {
        let uri = HttpUri::from("//evil.example/x?y=1");
        assert_eq!(uri.path, "/evil.example/x");
        assert_eq!(uri.raw, "//evil.example/x?y=1");

        assert_eq!(HttpUri::from("///a//b").path, "/a//b");
    }

    #[test]
    fn test_plain_path() {
        let uri = HttpUri::from("/");
        assert_eq!(uri.path, "/");
        assert_eq!(uri.query, None);
    }
}
