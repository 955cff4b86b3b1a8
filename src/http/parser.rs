use thiserror::Error;

use crate::http::request::{HTTP_11, Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The frame does not end with the header terminator.
    #[error("incomplete request head")]
    Incomplete,
    /// Not UTF-8, or the request line is not three space separated tokens.
    #[error("invalid request line")]
    InvalidRequest,
    #[error("unsupported method")]
    InvalidMethod,
    #[error("unsupported protocol version")]
    InvalidVersion,
    /// A header line without exactly one `": "` separator.
    #[error("invalid header line")]
    InvalidHeader,
    #[error("missing Host header")]
    MissingHost,
}

/// Parses one frame, terminator included, into a validated request.
pub fn parse_request(frame: &[u8]) -> Result<Request, ParseError> {
    let head = frame
        .strip_suffix(b"\r\n\r\n")
        .ok_or(ParseError::Incomplete)?;

    let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = head.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let (method, target, version) = split_request_line(request_line)?;

    let method = Method::from_token(method).ok_or(ParseError::InvalidMethod)?;
    if version != HTTP_11 {
        return Err(ParseError::InvalidVersion);
    }

    // Headers
    let mut headers = Vec::new();

    for line in lines {
        headers.push(split_header(line)?);
    }

    let request = Request {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
    };

    if request.host().is_none() {
        return Err(ParseError::MissingHost);
    }

    Ok(request)
}

/// Splits `METHOD SP TARGET SP VERSION`. Each token must be non-empty and
/// separated by exactly one space.
fn split_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut parts = line.split(' ');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) if !m.is_empty() && !t.is_empty() && !v.is_empty() => {
            Ok((m, t, v))
        }
        _ => Err(ParseError::InvalidRequest),
    }
}

fn split_header(line: &str) -> Result<(String, String), ParseError> {
    if line.matches(": ").count() != 1 {
        return Err(ParseError::InvalidHeader);
    }
    let (key, value) = line.split_once(": ").ok_or(ParseError::InvalidHeader)?;
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(ParseError::InvalidHeader);
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_request(req).unwrap();

        assert_eq!(parsed.target, "/");
        assert_eq!(parsed.host(), Some("example.com"));
    }

    #[test]
    fn request_line_with_double_space_is_rejected() {
        let req = b"GET  / HTTP/1.1\r\nHost: x\r\n\r\n";
        assert_eq!(parse_request(req).unwrap_err(), ParseError::InvalidRequest);
    }
}
