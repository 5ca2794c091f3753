//! HTTP/1.x request parsing straight off the socket byte stream.
//!
//! # Architecture
//!
//! - **`stream`**: buffered read-ahead over the raw socket with line scanning
//! - **`request_line`**: splits the first line into method, URI and protocol
//! - **`header`**: reads `name: value` lines until the blank line
//! - **`uri`**: query split, absolute-form stripping, `;jsessionid=` and normalization
//! - **`cookie`**: `Cookie` header parsing
//! - **`parser`**: drives the tokenizers and assembles a `Request`
//! - **`request`** / **`response`**: the values handed to handlers
//! - **`writer`**: serializes a `Response` onto the socket
//!
//! Tokens live in reusable byte buffers (`TokenRange`); strings are only
//! materialized when the `Request` is filled in.
//!
//! # Example
//!
//! ```
//! use pyrmont::http::parser::parse_http_request;
//!
//! let request = parse_http_request(
//!     b"GET /servlet/hello?x=1 HTTP/1.1\r\nCookie: jsessionid=S1\r\n\r\n",
//! )
//! .unwrap();
//! assert_eq!(request.path, "/servlet/hello");
//! assert_eq!(request.requested_session_id.as_deref(), Some("S1"));
//! ```

pub mod cookie;
pub mod error;
pub mod header;
pub mod parser;
pub mod request;
pub mod request_line;
pub mod response;
pub mod stream;
pub mod uri;
pub mod writer;

pub use error::ParseError;
