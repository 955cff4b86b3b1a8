use chrono::{DateTime, Utc};
use std::time::SystemTime;
use tokio::fs::File;

use crate::http::mime::MimeTable;
use crate::http::request::Request;
use crate::http::resolve::{ResolveError, ResolvedFile};

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!("docserve/", env!("CARGO_PKG_VERSION"));

/// Day.month.year hour:minute:second, in UTC.
const LAST_MODIFIED_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// HTTP status codes the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Malformed Request
    BadRequest,
    /// 404 Requested file not found.
    NotFound,
    /// 408 Request Timeout
    RequestTimeout,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use docserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::RequestTimeout => 408,
        }
    }

    /// Returns the reason phrase written on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Malformed Request",
            StatusCode::NotFound => "Requested file not found.",
            StatusCode::RequestTimeout => "Request Timeout",
        }
    }
}

/// Where the response body comes from.
#[derive(Debug)]
pub enum Body {
    Empty,
    /// Stream `len` bytes from `file` after the head.
    File { file: File, len: u64 },
}

impl Body {
    pub fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A response ready to be handed to the writer.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    /// Header fields in the order they are written
    pub headers: Vec<(String, String)>,
    pub body: Body,
    /// Whether the connection stays open after this response
    pub keep_alive: bool,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::NotFound)
///     .close()
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Body,
    keep_alive: bool,
}

impl ResponseBuilder {
    /// Starts a response with the `Server` header already set.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: vec![("Server".to_string(), SERVER_NAME.to_string())],
            body: Body::Empty,
            keep_alive: true,
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    pub fn file(mut self, file: File, len: u64) -> Self {
        self.body = Body::File { file, len };
        self
    }

    /// Marks the connection for closing and says so in the headers.
    pub fn close(mut self) -> Self {
        self.keep_alive = false;
        self.header("Connection", "close")
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` from the body if not already present.
    pub fn build(self) -> Response {
        let has_length = self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"));
        let builder = if has_length {
            self
        } else {
            let len = self.body.len();
            self.header("Content-Length", len.to_string())
        };

        Response {
            status: builder.status,
            headers: builder.headers,
            body: builder.body,
            keep_alive: builder.keep_alive,
        }
    }
}

impl Response {
    /// 400 for anything that could not be framed or parsed. Always closes.
    pub fn malformed() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest).close().build()
    }

    /// 404, keeping the connection open unless the client asked otherwise.
    pub fn not_found(close: bool) -> Self {
        let builder = ResponseBuilder::new(StatusCode::NotFound);
        if close {
            builder.close().build()
        } else {
            builder.build()
        }
    }

    /// Best-effort notice for a request left half sent at idle timeout.
    pub fn timeout() -> Self {
        ResponseBuilder::new(StatusCode::RequestTimeout)
            .close()
            .build()
    }

    /// 200 streaming `file`.
    pub fn file(resolved: ResolvedFile, content_type: &str, close: bool) -> Self {
        let builder = ResponseBuilder::new(StatusCode::Ok)
            .header("Last-Modified", format_last_modified(resolved.modified))
            .header("Content-Length", resolved.len.to_string())
            .header("Content-Type", content_type)
            .file(resolved.file, resolved.len);
        if close {
            builder.close().build()
        } else {
            builder.build()
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "HTTP/1.1 {} {}",
            self.status.as_u16(),
            self.status.reason_phrase()
        )
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds the response for a parsed request and its resolution outcome.
///
/// Pure: nothing is written to the connection here.
pub fn build_response(
    request: &Request,
    resolved: Result<ResolvedFile, ResolveError>,
    mime: &MimeTable,
) -> Response {
    let close = request.wants_close();
    match resolved {
        Ok(file) => {
            let content_type = mime.lookup(&file.target).content_type();
            Response::file(file, content_type, close)
        }
        Err(_) => Response::not_found(close),
    }
}

pub fn format_last_modified(modified: SystemTime) -> String {
    DateTime::<Utc>::from(modified)
        .format(LAST_MODIFIED_FORMAT)
        .to_string()
}
