//! Request-target resolution: query split, absolute-form stripping, session
//! path parameter extraction and path normalization.

use url::Url;

use crate::http::error::ParseError;

/// Path parameter carrying a session id for clients without cookies.
pub const SESSION_PATH_PARAMETER: &str = ";jsessionid=";

const SCHEME_SEPARATOR: &str = "://";

/// The pieces of a request target after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUri {
    pub path: String,
    pub query_string: Option<String>,
    /// Session id found as a path parameter, if any.
    pub session_id: Option<String>,
}

/// Resolves a raw request target.
///
/// # Example
///
/// ```
/// # use pyrmont::http::uri::resolve_uri;
/// let resolved = resolve_uri("/shop/./cart;jsessionid=A1?item=3").unwrap();
/// assert_eq!(resolved.path, "/shop/cart");
/// assert_eq!(resolved.query_string.as_deref(), Some("item=3"));
/// assert_eq!(resolved.session_id.as_deref(), Some("A1"));
/// ```
pub fn resolve_uri(raw: &str) -> Result<ResolvedUri, ParseError> {
    let (path, query_string) = match raw.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (raw, None),
    };

    let path = if path.starts_with('/') {
        path
    } else {
        strip_scheme_and_host(path)?
    };

    let (path, session_id) = extract_session_id(path);
    let path = normalize(&path)?;

    Ok(ResolvedUri {
        path,
        query_string,
        session_id,
    })
}

/// Keeps the path that follows `scheme://host[:port]` in an absolute-form
/// target. `http://host` alone resolves to `/`.
fn strip_scheme_and_host(uri: &str) -> Result<&str, ParseError> {
    let separator = uri.find(SCHEME_SEPARATOR).ok_or_else(|| ParseError::uri(uri))?;
    let authority_start = separator + SCHEME_SEPARATOR.len();
    let path_start = uri[authority_start..]
        .find('/')
        .map_or(uri.len(), |p| authority_start + p);

    let origin = Url::parse(&uri[..path_start]).map_err(|_| ParseError::uri(uri))?;
    if !origin.has_host() {
        return Err(ParseError::uri(uri));
    }

    match &uri[path_start..] {
        "" => Ok("/"),
        path => Ok(path),
    }
}

/// Pulls `;jsessionid=<id>` out of the path, keeping any later `;param`.
fn extract_session_id(path: &str) -> (String, Option<String>) {
    let Some(marker) = path.find(SESSION_PATH_PARAMETER) else {
        return (path.to_string(), None);
    };
    let rest = &path[marker + SESSION_PATH_PARAMETER.len()..];
    let (id, tail) = match rest.find(';') {
        Some(end) => rest.split_at(end),
        None => (rest, ""),
    };

    let mut stripped = String::with_capacity(marker + tail.len());
    stripped.push_str(&path[..marker]);
    stripped.push_str(tail);

    let id = (!id.is_empty()).then(|| id.to_string());
    (stripped, id)
}

/// Canonicalizes a path: drops `.` segments and empty segments, resolves
/// `..`, and keeps a trailing slash. Fails if `..` would climb above the
/// root, or on backslashes and NUL bytes.
///
/// ```
/// # use pyrmont::http::uri::normalize;
/// assert_eq!(normalize("//a/./b/../c/").unwrap(), "/a/c/");
/// assert!(normalize("/a/../../etc/passwd").is_err());
/// ```
pub fn normalize(path: &str) -> Result<String, ParseError> {
    if path.contains('\\') || path.contains('\0') {
        return Err(ParseError::uri(path));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ParseError::uri(path));
                }
            }
            segment => segments.push(segment),
        }
    }

    let trailing_slash = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() || trailing_slash {
        normalized.push('/');
    }
    Ok(normalized)
}
