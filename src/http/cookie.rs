/// Name of the cookie that carries the session id.
pub const SESSION_COOKIE_NAME: &str = "jsessionid";

/// A single cookie sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_session_cookie(&self) -> bool {
        self.name.eq_ignore_ascii_case(SESSION_COOKIE_NAME)
    }
}

/// Parses a `Cookie` header value such as `a=1; b="two"`.
///
/// Segments that are not `name=value` are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|segment| {
            let (name, value) = segment.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie::new(name, unquote(value.trim())))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
