//! Declared content types and their wire values.

use std::fmt;
use std::str::FromStr;

/// A caller-declared body format.
///
/// Selects the codec on both sides of the pipeline. It is never sniffed from
/// response headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `application/xml`
    Xml,
    /// `text/plain`
    Text,
    /// `text/html`
    Html,
    /// Any other tag. Every codec operation rejects it.
    Other(String),
}

impl ContentType {
    /// The `Content-Type` header value for this type.
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml",
            ContentType::Text => "text/plain",
            ContentType::Html => "text/html",
            ContentType::Other(tag) => tag,
        }
    }

    /// True for the text-like types whose destination must be a `String`.
    pub fn is_textual(&self) -> bool {
        matches!(self, ContentType::Text | ContentType::Html)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = std::convert::Infallible;

    /// Parse a header value. Parameters such as `charset` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        let parsed = match essence.to_ascii_lowercase().as_str() {
            "application/json" => ContentType::Json,
            "application/xml" => ContentType::Xml,
            "text/plain" => ContentType::Text,
            "text/html" => ContentType::Html,
            _ => ContentType::Other(essence.to_string()),
        };
        Ok(parsed)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(ct) => ct,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_ignoring_parameters() {
        assert_eq!(ContentType::from("application/json; charset=utf-8"), ContentType::Json);
        assert_eq!(ContentType::from("TEXT/HTML"), ContentType::Html);
        assert_eq!(ContentType::from(" text/plain "), ContentType::Text);
        assert_eq!(ContentType::from("application/xml"), ContentType::Xml);
    }

    #[test]
    fn unknown_tag_is_kept() {
        let ct = ContentType::from("application/yaml");
        assert_eq!(ct, ContentType::Other("application/yaml".to_string()));
        assert_eq!(ct.to_string(), "application/yaml");
        assert!(!ct.is_textual());
    }

    #[test]
    fn wire_values() {
        assert_eq!(ContentType::Json.as_str(), "application/json");
        assert_eq!(ContentType::Xml.as_str(), "application/xml");
        assert_eq!(ContentType::Text.as_str(), "text/plain");
        assert_eq!(ContentType::Html.as_str(), "text/html");
    }
}
