use std::io::Read;
use std::ops::Range;

use crate::http::error::ParseError;
use crate::http::stream::{SocketInputStream, TokenRange};

const SP: u8 = b' ';

/// Method, URI and protocol of one request line, kept as byte ranges into a
/// single reusable line buffer.
///
/// A processor allocates one of these and overwrites it for every request.
#[derive(Debug, Clone)]
pub struct RequestLine {
    raw: TokenRange,
    method: Range<usize>,
    uri: Range<usize>,
    protocol: Range<usize>,
}

impl RequestLine {
    pub fn new(limit: usize) -> Self {
        Self {
            raw: TokenRange::new(limit),
            method: 0..0,
            uri: 0..0,
            protocol: 0..0,
        }
    }

    pub fn method(&self) -> &[u8] {
        &self.raw.as_bytes()[self.method.clone()]
    }

    pub fn uri(&self) -> &[u8] {
        &self.raw.as_bytes()[self.uri.clone()]
    }

    pub fn protocol(&self) -> &[u8] {
        &self.raw.as_bytes()[self.protocol.clone()]
    }

    pub fn raw(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    pub fn recycle(&mut self) {
        self.raw.recycle();
        self.method = 0..0;
        self.uri = 0..0;
        self.protocol = 0..0;
    }

    /// Splits the buffered line: method up to the first run of spaces, then
    /// the rest split on its last run of spaces into URI and protocol.
    fn tokenize(&mut self) -> Result<(), ParseError> {
        let line = self.raw.as_bytes();
        let len = line.len();

        let method_start = skip_spaces(line, 0);
        let method_end = line[method_start..]
            .iter()
            .position(|&b| b == SP)
            .map_or(len, |p| method_start + p);
        let rest_start = skip_spaces(line, method_end);
        let rest_end = line
            .iter()
            .rposition(|&b| b != SP)
            .map_or(rest_start, |p| (p + 1).max(rest_start));
        let rest = &line[rest_start..rest_end];

        let (uri, protocol) = match rest.iter().rposition(|&b| b == SP) {
            Some(last_space) => {
                let uri_end = rest[..last_space]
                    .iter()
                    .rposition(|&b| b != SP)
                    .map_or(0, |p| p + 1);
                (
                    rest_start..rest_start + uri_end,
                    rest_start + last_space + 1..rest_end,
                )
            }
            // A lone version token means the URI was left out.
            None if rest.starts_with(b"HTTP/") => (rest_start..rest_start, rest_start..rest_end),
            None => (rest_start..rest_end, rest_end..rest_end),
        };

        if method_start == method_end {
            return Err(ParseError::request_line(line));
        }
        if uri.is_empty() {
            return Err(ParseError::request_line(line));
        }

        self.method = method_start..method_end;
        self.uri = uri;
        self.protocol = protocol;
        Ok(())
    }
}

fn skip_spaces(line: &[u8], from: usize) -> usize {
    line[from..]
        .iter()
        .position(|&b| b != SP)
        .map_or(line.len(), |p| from + p)
}

impl<R: Read> SocketInputStream<R> {
    /// Reads and tokenizes the request line.
    ///
    /// Empty lines ahead of the request line are skipped.
    pub fn read_request_line(&mut self, request_line: &mut RequestLine) -> Result<(), ParseError> {
        request_line.recycle();
        loop {
            self.read_line(&mut request_line.raw)?;
            if !request_line.raw.is_empty() {
                break;
            }
        }
        request_line.tokenize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(line: &[u8]) -> Result<RequestLine, ParseError> {
        let mut input = SocketInputStream::new(line, 256);
        let mut request_line = RequestLine::new(256);
        input.read_request_line(&mut request_line)?;
        Ok(request_line)
    }

    #[test]
    fn runs_of_spaces_separate_tokens() {
        let line = tokenize(b"  POST   /form   HTTP/1.0  \r\n").unwrap();
        assert_eq!(line.method(), b"POST");
        assert_eq!(line.uri(), b"/form");
        assert_eq!(line.protocol(), b"HTTP/1.0");
    }

    #[test]
    fn uri_may_contain_spaces_before_version() {
        let line = tokenize(b"GET /a b HTTP/1.1\r\n").unwrap();
        assert_eq!(line.uri(), b"/a b");
        assert_eq!(line.protocol(), b"HTTP/1.1");
    }

    #[test]
    fn version_only_line_has_no_uri() {
        assert!(matches!(
            tokenize(b"GET HTTP/1.1\r\n"),
            Err(ParseError::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn reuse_after_recycle() {
        let mut input = SocketInputStream::new(&b"GET /first HTTP/1.1\r\nHEAD /2 HTTP/1.0\r\n"[..], 64);
        let mut line = RequestLine::new(64);

        input.read_request_line(&mut line).unwrap();
        assert_eq!(line.uri(), b"/first");
        input.read_request_line(&mut line).unwrap();
        assert_eq!(line.method(), b"HEAD");
        assert_eq!(line.uri(), b"/2");
        assert_eq!(line.raw(), b"HEAD /2 HTTP/1.0");
    }
}
