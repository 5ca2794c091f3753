use pyrmont::http::ParseError;
use pyrmont::http::uri::{normalize, resolve_uri};

#[test]
fn test_canonical_path_is_unchanged() {
    let resolved = resolve_uri("/a/b/c").unwrap();

    assert_eq!(resolved.path, "/a/b/c");
    assert_eq!(resolved.query_string, None);
    assert_eq!(resolved.session_id, None);
}

#[test]
fn test_query_string_split_on_first_question_mark() {
    let resolved = resolve_uri("/search?q=a?b&x=").unwrap();

    assert_eq!(resolved.path, "/search");
    assert_eq!(resolved.query_string.as_deref(), Some("q=a?b&x="));
}

#[test]
fn test_empty_query_string_is_present() {
    let resolved = resolve_uri("/search?").unwrap();
    assert_eq!(resolved.query_string.as_deref(), Some(""));
}

#[test]
fn test_session_parameter_with_trailing_parameter() {
    let resolved = resolve_uri("/a/b;jsessionid=XYZ123;more").unwrap();

    assert_eq!(resolved.session_id.as_deref(), Some("XYZ123"));
    assert_eq!(resolved.path, "/a/b;more");
}

#[test]
fn test_session_parameter_before_query() {
    let resolved = resolve_uri("/cart;jsessionid=S9?page=2").unwrap();

    assert_eq!(resolved.session_id.as_deref(), Some("S9"));
    assert_eq!(resolved.path, "/cart");
    assert_eq!(resolved.query_string.as_deref(), Some("page=2"));
}

#[test]
fn test_absolute_uri_keeps_path_after_authority() {
    let resolved = resolve_uri("http://example.com/a/b?x=1").unwrap();

    assert_eq!(resolved.path, "/a/b");
    assert_eq!(resolved.query_string.as_deref(), Some("x=1"));
}

#[test]
fn test_absolute_uri_without_path_is_root() {
    assert_eq!(resolve_uri("http://example.com").unwrap().path, "/");
    assert_eq!(resolve_uri("http://example.com:8080?x").unwrap().path, "/");
}

#[test]
fn test_absolute_uri_with_session_and_dots() {
    let resolved = resolve_uri("https://example.com/a/./b/../c;jsessionid=Q").unwrap();

    assert_eq!(resolved.path, "/a/c");
    assert_eq!(resolved.session_id.as_deref(), Some("Q"));
}

#[test]
fn test_relative_uri_without_scheme_is_invalid() {
    assert!(matches!(resolve_uri("example.com/a/b"), Err(ParseError::InvalidUri(_))));
    assert!(matches!(resolve_uri("*"), Err(ParseError::InvalidUri(_))));
}

#[test]
fn test_absolute_uri_without_host_is_invalid() {
    assert!(matches!(resolve_uri("http:///a"), Err(ParseError::InvalidUri(_))));
}

#[test]
fn test_absolute_uri_cannot_escape_root() {
    assert!(matches!(
        resolve_uri("http://example.com/../secret"),
        Err(ParseError::InvalidUri(_))
    ));
}

#[test]
fn test_normalize_collapses_and_resolves() {
    assert_eq!(normalize("/a//b").unwrap(), "/a/b");
    assert_eq!(normalize("/a/./b/.").unwrap(), "/a/b/");
    assert_eq!(normalize("/a/b/../c").unwrap(), "/a/c");
    assert_eq!(normalize("/a/b/c/").unwrap(), "/a/b/c/");
    assert_eq!(normalize("/a/.../b").unwrap(), "/a/.../b");
}

#[test]
fn test_normalize_rejects_escape() {
    assert!(matches!(normalize("/../x"), Err(ParseError::InvalidUri(_))));
    assert!(matches!(normalize("/a/../../x"), Err(ParseError::InvalidUri(_))));
}
