/// HTTP request methods.
///
/// Only retrieval is served. Any other token on the request line is a
/// malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
}

/// The only protocol version accepted on the request line.
pub const HTTP_11: &str = "HTTP/1.1";

/// A validated HTTP request head.
///
/// Produced by [`parse_request`](crate::http::parser::parse_request) from a
/// single frame and dropped once the response has been built.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target exactly as sent (e.g. "/index.html?v=2")
    pub target: String,
    /// Always "HTTP/1.1" for a parsed request
    pub version: String,
    /// Headers in the order they were received
    pub headers: Vec<(String, String)>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Method,
    target: Option<String>,
    headers: Vec<(String, String)>,
}

impl Method {
    /// Parses a method token. Matching is case-sensitive.
    ///
    /// ```
    /// # use docserve::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_token("get"), None);
    /// assert_eq!(Method::from_token("POST"), None);
    /// ```
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            target: None,
            headers: Vec::new(),
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method,
            target: self.target.ok_or("target missing")?,
            version: HTTP_11.to_string(),
            headers: self.headers,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Returns the first header with the given name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    /// Whether the client asked for the connection to close after this
    /// response. Only the exact value `close` counts.
    pub fn wants_close(&self) -> bool {
        self.headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("Connection") && v == "close")
    }
}
