//! The two downstream handlers: named servlets and static files.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use crate::http::request::{Request, SessionIdSource};
use crate::http::response::{Response, StatusCode};
use crate::server::dispatch::{Handler, handler_fn};

/// Serves files below a web root.
///
/// The request path is already normalized, so it cannot climb out of `root`.
pub struct StaticResourceHandler {
    root: PathBuf,
}

impl StaticResourceHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a normalized request path to a file under the root. `None` when
    /// a segment only becomes `.` or `..` once its parameters are removed.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut file = self.root.clone();
        // path parameters are not part of the file name
        for segment in path.split('/') {
            match segment.split(';').next().unwrap_or_default() {
                "" => {}
                "." | ".." => return None,
                name => file.push(name),
            }
        }
        if path.ends_with('/') {
            file.push("index.html");
        }
        Some(file)
    }
}

impl Handler for StaticResourceHandler {
    fn handle(&self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        let head_only = match request.method.as_str() {
            "GET" => false,
            "HEAD" => true,
            _ => {
                response.send_text(StatusCode::MethodNotAllowed, b"405 Method Not Allowed".to_vec());
                return Ok(());
            }
        };

        let Some(file) = self.resolve(&request.path).filter(|file| file.is_file()) else {
            debug!(path = %request.path, "Static resource not found");
            response.not_found();
            return Ok(());
        };

        let bytes = fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
        response.set_status(StatusCode::Ok);
        response.set_header("Content-Type", content_type_for(&file));
        if head_only {
            response.set_header("Content-Length", bytes.len().to_string());
        } else {
            response.set_body(bytes);
        }
        Ok(())
    }
}

/// Picks a `Content-Type` from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Dynamic handler: `<prefix><name>` runs the servlet registered as `name`.
pub struct ServletRegistry {
    prefix: String,
    servlets: HashMap<String, Arc<dyn Handler>>,
}

impl ServletRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            servlets: HashMap::new(),
        }
    }

    /// A registry with the built-in `hello` servlet.
    pub fn with_defaults(prefix: impl Into<String>) -> Self {
        let mut registry = Self::new(prefix);
        registry.register("hello", hello_servlet);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, servlet: F)
    where
        F: Fn(&Request, &mut Response) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.servlets.insert(name.into(), handler_fn(servlet));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.servlets.contains_key(name)
    }

    /// The servlet name in `path`: the first segment after the prefix.
    pub fn servlet_name<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        let end = rest.find(['/', ';']).unwrap_or(rest.len());
        Some(&rest[..end]).filter(|name| !name.is_empty())
    }
}

impl Handler for ServletRegistry {
    fn handle(&self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        let servlet = self
            .servlet_name(&request.path)
            .and_then(|name| self.servlets.get(name));
        match servlet {
            Some(servlet) => servlet.handle(request, response),
            None => {
                debug!(path = %request.path, "No servlet registered");
                response.not_found();
                Ok(())
            }
        }
    }
}

fn hello_servlet(request: &Request, response: &mut Response) -> anyhow::Result<()> {
    let mut body = String::from("Hello from Pyrmont\n");
    if let Some(query) = &request.query_string {
        writeln!(body, "query: {query}")?;
    }
    if let Some(id) = &request.requested_session_id {
        let source = match request.session_id_source {
            SessionIdSource::Cookie => "cookie",
            SessionIdSource::Url => "url",
            SessionIdSource::None => "none",
        };
        writeln!(body, "session: {id} ({source})")?;
    }
    response.send_text(StatusCode::Ok, body);
    Ok(())
}
