use std::io::Read;

use tracing::debug;

use crate::http::cookie::parse_cookie_header;
use crate::http::error::ParseError;
use crate::http::header::HttpHeader;
use crate::http::request::Request;
use crate::http::request_line::RequestLine;
use crate::http::stream::{DEFAULT_BUFFER_SIZE, SocketInputStream};
use crate::http::uri::resolve_uri;

/// Turns the head of an HTTP/1.x request into a `Request`.
///
/// Holds the request-line buffer so a processor can reuse it across
/// connections.
pub struct RequestParser {
    request_line: RequestLine,
    buffer_size: usize,
}

impl RequestParser {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            request_line: RequestLine::new(buffer_size),
            buffer_size,
        }
    }

    /// Parses the request line and the header block. The body, if any, is
    /// left unread.
    pub fn parse<R: Read>(&mut self, input: &mut SocketInputStream<R>) -> Result<Request, ParseError> {
        let mut request = Request::default();
        self.parse_request_line(input, &mut request)?;
        self.parse_headers(input, &mut request)?;
        Ok(request)
    }

    fn parse_request_line<R: Read>(
        &mut self,
        input: &mut SocketInputStream<R>,
        request: &mut Request,
    ) -> Result<(), ParseError> {
        input.read_request_line(&mut self.request_line)?;
        let line = &self.request_line;

        let uri = std::str::from_utf8(line.uri())
            .map_err(|_| ParseError::uri(&String::from_utf8_lossy(line.uri())))?;
        let resolved = resolve_uri(uri)?;

        request.method = String::from_utf8_lossy(line.method()).into_owned();
        request.protocol = String::from_utf8_lossy(line.protocol()).into_owned();
        request.request_uri = uri.to_string();
        request.path = resolved.path;
        request.query_string = resolved.query_string;
        if let Some(id) = resolved.session_id {
            request.set_session_id_from_url(id);
        }

        debug!(
            method = %request.method,
            uri = %request.request_uri,
            protocol = %request.protocol,
            "Parsed request line"
        );
        Ok(())
    }

    fn parse_headers<R: Read>(
        &self,
        input: &mut SocketInputStream<R>,
        request: &mut Request,
    ) -> Result<(), ParseError> {
        loop {
            let mut header = HttpHeader::new(self.buffer_size);
            if !input.read_header(&mut header)? {
                debug!(headers = request.headers.len(), "Parsed header block");
                return Ok(());
            }

            let name = header.name_str().into_owned();
            let value = header.value_str().into_owned();

            match name.as_str() {
                "cookie" => {
                    for cookie in parse_cookie_header(&value) {
                        request.add_cookie(cookie);
                    }
                }
                "content-length" => {
                    request.content_length = parse_content_length(&value)
                        .ok_or_else(|| ParseError::MalformedHeader(format!("{name}: {value}")))?;
                }
                "content-type" => {
                    request.content_type = Some(value.clone());
                }
                _ => {}
            }

            request.headers.insert(name, value);
        }
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

/// Base-10 digits only; no sign, no whitespace.
fn parse_content_length(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parses a complete request head held in memory.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    let mut input = SocketInputStream::new(buf, DEFAULT_BUFFER_SIZE);
    RequestParser::default().parse(&mut input)
}
