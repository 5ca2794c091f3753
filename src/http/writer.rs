use std::io::{self, Write};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response. `Content-Length` is filled in from the body when
/// the handler did not set it, and `Connection: close` is always sent since
/// each socket serves a single request.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    let mut has_length = false;
    for (k, v) in &resp.headers {
        if k.eq_ignore_ascii_case("Connection") {
            continue;
        }
        has_length |= k.eq_ignore_ascii_case("Content-Length");
        write_header(&mut buf, k, v);
    }
    if !has_length {
        write_header(&mut buf, "Content-Length", &resp.body.len().to_string());
    }
    write_header(&mut buf, "Connection", "close");

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&resp.body);

    buf
}

fn write_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Writes the whole response and flushes.
pub fn write_response<W: Write + ?Sized>(resp: &Response, out: &mut W) -> io::Result<()> {
    out.write_all(&serialize_response(resp))?;
    out.flush()
}
