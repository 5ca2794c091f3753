use std::collections::HashMap;

use crate::http::cookie::Cookie;

/// Where the requested session id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionIdSource {
    /// No session id was sent
    #[default]
    None,
    /// `;jsessionid=` path parameter
    Url,
    /// `jsessionid` cookie
    Cookie,
}

/// Represents a parsed HTTP request from a client.
///
/// Filled in by the request parser, then handed to a handler by shared
/// reference. The body is left unread on the socket.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method, as sent
    pub method: String,
    /// The request target exactly as it appeared on the request line
    pub request_uri: String,
    /// Normalized path without query string or session parameter
    pub path: String,
    /// Everything after the first `?`
    pub query_string: Option<String>,
    /// Protocol version (e.g. "HTTP/1.1"); empty for HTTP/0.9 style requests
    pub protocol: String,
    /// Request headers keyed by lower-cased name; the last duplicate wins
    pub headers: HashMap<String, String>,
    /// Value of Content-Length, or -1 when absent
    pub content_length: i64,
    pub content_type: Option<String>,
    pub requested_session_id: Option<String>,
    pub session_id_source: SessionIdSource,
    /// Cookies in the order they were sent
    pub cookies: Vec<Cookie>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: String::new(),
            request_uri: String::new(),
            path: String::new(),
            query_string: None,
            protocol: String::new(),
            headers: HashMap::new(),
            content_length: -1,
            content_type: None,
            requested_session_id: None,
            session_id_source: SessionIdSource::None,
            cookies: Vec::new(),
        }
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            request: Request::default(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = method.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.request.request_uri = path.clone();
        self.request.path = path;
        self
    }

    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.request.query_string = Some(query.into());
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.request.protocol = protocol.into();
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key: String = key.into();
        self.request.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.add_cookie(Cookie::new(name, value));
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn is_session_id_from_cookie(&self) -> bool {
        self.session_id_source == SessionIdSource::Cookie
    }

    pub fn is_session_id_from_url(&self) -> bool {
        self.session_id_source == SessionIdSource::Url
    }

    pub(crate) fn set_session_id_from_url(&mut self, id: String) {
        self.requested_session_id = Some(id);
        self.session_id_source = SessionIdSource::Url;
    }

    /// Records a cookie. The first session cookie wins and replaces any id
    /// taken from the URL.
    pub(crate) fn add_cookie(&mut self, cookie: Cookie) {
        if cookie.is_session_cookie() && !self.is_session_id_from_cookie() {
            self.requested_session_id = Some(cookie.value.clone());
            self.session_id_source = SessionIdSource::Cookie;
        }
        self.cookies.push(cookie);
    }
}
