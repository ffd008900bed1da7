#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
/// HTTP version
pub enum HttpVersion {
    V1_0,
    #[default]
    V1_1,
    NoSupport,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::V1_0 => "HTTP/1.0",
            HttpVersion::V1_1 => "HTTP/1.1",
            HttpVersion::NoSupport => "NoSupport",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, HttpVersion::NoSupport)
    }

    /// Whether a connection stays open when the client says nothing
    pub fn keeps_alive_by_default(&self) -> bool {
        matches!(self, HttpVersion::V1_1)
    }
}

impl From<&str> for HttpVersion {
    fn from(value: &str) -> Self {
        match value {
            "HTTP/1.0" => HttpVersion::V1_0,
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => HttpVersion::NoSupport,
        }
    }
}
