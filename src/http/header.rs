use std::borrow::Cow;
use std::io::Read;

use crate::http::error::ParseError;
use crate::http::stream::{SocketInputStream, TokenRange};

/// One `name: value` pair from the header block.
///
/// The name is lower-cased on read; both sides are trimmed.
#[derive(Debug, Clone)]
pub struct HttpHeader {
    pub name: TokenRange,
    pub value: TokenRange,
}

impl HttpHeader {
    pub fn new(limit: usize) -> Self {
        Self {
            name: TokenRange::new(limit),
            value: TokenRange::new(limit),
        }
    }

    pub fn name(&self) -> &[u8] {
        self.name.as_bytes()
    }

    pub fn value(&self) -> &[u8] {
        self.value.as_bytes()
    }

    pub fn name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name())
    }

    pub fn value_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.value())
    }

    /// Case-insensitive comparison against a header name.
    pub fn is(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name.as_bytes())
    }
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn trim(bytes: &[u8], from: usize, to: usize) -> (usize, usize) {
    let start = bytes[from..to]
        .iter()
        .position(|&b| !is_blank(b))
        .map_or(to, |p| from + p);
    let end = bytes[start..to]
        .iter()
        .rposition(|&b| !is_blank(b))
        .map_or(start, |p| start + p + 1);
    (start, end)
}

impl<R: Read> SocketInputStream<R> {
    /// Reads one header line into `header`.
    ///
    /// Returns `Ok(false)` on the blank line closing the header block, with
    /// both tokens empty. Lines starting with a space or tab that follow a
    /// header are folded into its value.
    pub fn read_header(&mut self, header: &mut HttpHeader) -> Result<bool, ParseError> {
        header.name.recycle();
        self.read_line(&mut header.value)?;
        if header.value.is_empty() {
            return Ok(false);
        }

        let line = header.value.as_bytes();
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| ParseError::header(line))?;
        let (name_start, name_end) = trim(line, 0, colon);
        if name_start == name_end {
            return Err(ParseError::header(line));
        }
        header.name.extend(&line[name_start..name_end])?;
        header.name.make_ascii_lowercase();

        let (value_start, value_end) = trim(line, colon + 1, line.len());
        header.value.keep(value_start, value_end);

        while let Some(b) = self.peek()? {
            if !is_blank(b) {
                break;
            }
            let mut folded = TokenRange::new(header.value.limit());
            self.read_line(&mut folded)?;
            let continuation = folded.as_bytes();
            let (start, end) = trim(continuation, 0, continuation.len());
            if start < end {
                if !header.value.is_empty() {
                    header.value.push(b' ')?;
                }
                header.value.extend(&continuation[start..end])?;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(block: &[u8]) -> Result<Vec<(String, String)>, ParseError> {
        let mut input = SocketInputStream::new(block, 128);
        let mut out = Vec::new();
        loop {
            let mut header = HttpHeader::new(128);
            if !input.read_header(&mut header)? {
                assert!(header.name.is_empty() && header.value.is_empty());
                return Ok(out);
            }
            out.push((header.name_str().into_owned(), header.value_str().into_owned()));
        }
    }

    #[test]
    fn name_is_lowercased_and_value_trimmed() {
        let headers = read_all(b"Content-Type:\t text/html ; charset=utf-8  \r\n\r\n").unwrap();
        assert_eq!(
            headers,
            vec![("content-type".to_string(), "text/html ; charset=utf-8".to_string())]
        );
    }

    #[test]
    fn splits_on_first_colon_only() {
        let headers = read_all(b"Host: example.com:8080\r\n\r\n").unwrap();
        assert_eq!(headers[0].1, "example.com:8080");
    }

    #[test]
    fn empty_value_is_allowed() {
        let headers = read_all(b"X-Empty:\r\n\r\n").unwrap();
        assert_eq!(headers, vec![("x-empty".to_string(), String::new())]);
    }

    #[test]
    fn continuation_lines_are_folded() {
        let headers = read_all(b"X-Long: first\r\n  second\r\n\tthird\r\nNext: v\r\n\r\n").unwrap();
        assert_eq!(headers[0].1, "first second third");
        assert_eq!(headers[1], ("next".to_string(), "v".to_string()));
    }

    #[test]
    fn value_without_name_is_rejected() {
        assert!(matches!(
            read_all(b": orphan\r\n\r\n"),
            Err(ParseError::MalformedHeader(raw)) if raw == ": orphan"
        ));
    }

    #[test]
    fn case_insensitive_match() {
        let mut input = SocketInputStream::new(&b"COOKIE: a=b\r\n"[..], 64);
        let mut header = HttpHeader::new(64);
        assert!(input.read_header(&mut header).unwrap());
        assert!(header.is("Cookie"));
        assert!(header.is("cookie"));
    }
}
