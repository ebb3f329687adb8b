//! Cookie settings.

use serde::{Deserialize, Serialize};

/// Attributes applied to a cookie the service sets.
///
/// Loaded from the `[cookie]` config section. The value itself is supplied
/// per response through [`Cookie::set_cookie`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Cookie {
    pub name: String,

    /// `Max-Age` in seconds; zero leaves the attribute out.
    pub age: i64,

    pub path: String,

    /// `Domain` attribute.
    pub host: String,

    pub secure: bool,

    pub http_only: bool,
}

impl Cookie {
    /// Render a `Set-Cookie` header value carrying `value`.
    pub fn set_cookie(&self, value: &str) -> String {
        let mut header = format!("{}={}", self.name, value);
        if self.age != 0 {
            header.push_str(&format!("; Max-Age={}", self.age));
        }
        if !self.path.is_empty() {
            header.push_str(&format!("; Path={}", self.path));
        }
        if !self.host.is_empty() {
            header.push_str(&format!("; Domain={}", self.host));
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}
