use docserve::http::request::{Method, RequestBuilder};

#[test]
fn test_method_from_token() {
    assert_eq!(Method::from_token("GET"), Some(Method::GET));
    assert_eq!(Method::from_token("POST"), None);
    assert_eq!(Method::from_token("Get"), None);
    assert_eq!(Method::from_token(""), None);
}

#[test]
fn test_request_builder() {
    let request = RequestBuilder::new()
        .target("/index.html")
        .header("Host", "localhost")
        .header("Accept", "*/*")
        .build()
        .unwrap();

    assert_eq!(request.method, Method::GET);
    assert_eq!(request.target, "/index.html");
    assert_eq!(request.version, "HTTP/1.1");
    assert_eq!(request.headers.len(), 2);
}

#[test]
fn test_request_builder_requires_target() {
    assert!(RequestBuilder::new().header("Host", "x").build().is_err());
}

#[test]
fn test_header_lookup_ignores_case_and_returns_first() {
    let request = RequestBuilder::new()
        .target("/")
        .header("X-Tag", "one")
        .header("x-tag", "two")
        .build()
        .unwrap();

    assert_eq!(request.header("X-TAG"), Some("one"));
    assert_eq!(request.header("Missing"), None);
}

#[test]
fn test_host() {
    let with = RequestBuilder::new().target("/").header("Host", "a").build().unwrap();
    let without = RequestBuilder::new().target("/").build().unwrap();

    assert_eq!(with.host(), Some("a"));
    assert_eq!(without.host(), None);
}

#[test]
fn test_wants_close() {
    let close = RequestBuilder::new()
        .target("/")
        .header("connection", "close")
        .build()
        .unwrap();
    let other = RequestBuilder::new()
        .target("/")
        .header("Connection", "CLOSE")
        .build()
        .unwrap();
    let none = RequestBuilder::new().target("/").build().unwrap();

    assert!(close.wants_close());
    assert!(!other.wants_close());
    assert!(!none.wants_close());
}
