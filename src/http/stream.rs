use std::io::{self, Read};

use bytes::{Buf, BytesMut};

use crate::http::error::ParseError;

/// Default read-ahead size, also the longest line a token accepts.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// A reusable byte buffer plus the end offset of the token it currently holds.
///
/// The buffer grows on demand up to `limit` and is then overwritten in place
/// on every parse; `end == 0` means "no token".
#[derive(Debug, Clone)]
pub struct TokenRange {
    buf: Vec<u8>,
    end: usize,
    limit: usize,
}

impl TokenRange {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            end: 0,
            limit,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.end]
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    /// Forgets the current token without releasing the buffer.
    pub fn recycle(&mut self) {
        self.end = 0;
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        let new_end = self.end + bytes.len();
        if new_end > self.limit {
            return Err(ParseError::LineTooLong { limit: self.limit });
        }
        if new_end > self.buf.len() {
            self.buf.resize(new_end, 0);
        }
        self.buf[self.end..new_end].copy_from_slice(bytes);
        self.end = new_end;
        Ok(())
    }

    pub(crate) fn push(&mut self, byte: u8) -> Result<(), ParseError> {
        self.extend(&[byte])
    }

    /// Moves `start..end` of the current token to the front and drops the rest.
    pub(crate) fn keep(&mut self, start: usize, end: usize) {
        self.buf.copy_within(start..end, 0);
        self.end = end - start;
    }

    pub(crate) fn make_ascii_lowercase(&mut self) {
        self.buf[..self.end].make_ascii_lowercase();
    }
}

/// Buffered read-ahead reader over a raw socket byte source.
///
/// Bytes are pulled from `inner` in chunks of `buffer_size` and scanned in
/// place; nothing is copied out until a token boundary is found.
pub struct SocketInputStream<R> {
    inner: R,
    buf: BytesMut,
    buffer_size: usize,
}

impl<R: Read> SocketInputStream<R> {
    pub fn new(inner: R, buffer_size: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(buffer_size),
            buffer_size,
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Bytes read from the source but not consumed yet.
    pub fn available(&self) -> usize {
        self.buf.len()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Refills the (fully consumed) buffer. Returns 0 at end of stream.
    fn fill(&mut self) -> Result<usize, ParseError> {
        self.buf.clear();
        self.buf.resize(self.buffer_size, 0);
        let n = loop {
            match self.inner.read(&mut self.buf[..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.clear();
                    return Err(e.into());
                }
            }
        };
        self.buf.truncate(n);
        Ok(n)
    }

    fn fill_or_eof(&mut self) -> Result<(), ParseError> {
        if self.fill()? == 0 {
            return Err(closed_mid_line());
        }
        Ok(())
    }

    /// Next byte without consuming it, or `None` once the source is exhausted.
    pub fn peek(&mut self) -> Result<Option<u8>, ParseError> {
        if self.buf.is_empty() && self.fill()? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[0]))
    }

    /// Reads one line into `token`, without its terminator.
    ///
    /// Lines end with CRLF; a bare LF is accepted too.
    pub fn read_line(&mut self, token: &mut TokenRange) -> Result<(), ParseError> {
        token.recycle();
        // CR held back from the tail of the previous chunk
        let mut pending_cr = false;
        loop {
            if self.buf.is_empty() {
                self.fill_or_eof()?;
            }
            match self.buf.iter().position(|&b| b == LF) {
                Some(pos) => {
                    let line = &self.buf[..pos];
                    let line = line.strip_suffix(&[CR]).unwrap_or(line);
                    if pending_cr && pos > 0 {
                        token.push(CR)?;
                    }
                    token.extend(line)?;
                    self.buf.advance(pos + 1);
                    return Ok(());
                }
                None => {
                    if pending_cr {
                        token.push(CR)?;
                    }
                    let chunk = &self.buf[..];
                    pending_cr = chunk.last() == Some(&CR);
                    let chunk = chunk.strip_suffix(&[CR]).unwrap_or(chunk);
                    token.extend(chunk)?;
                    self.buf.clear();
                }
            }
        }
    }

    /// Consumes exactly `n` raw bytes.
    pub fn skip(&mut self, mut n: usize) -> Result<(), ParseError> {
        while n > 0 {
            if self.buf.is_empty() {
                self.fill_or_eof()?;
            }
            let step = n.min(self.buf.len());
            self.buf.advance(step);
            n -= step;
        }
        Ok(())
    }
}

fn closed_mid_line() -> ParseError {
    ParseError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "connection closed before end of line",
    ))
}
