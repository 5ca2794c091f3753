use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;

/// Default path prefix routed to the dynamic handler.
pub const SERVLET_PREFIX: &str = "/servlet/";

/// Something that turns a parsed request into a response.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, response: &mut Response) -> anyhow::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        self(request, response)
    }
}

/// Boxes a closure as a shareable handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&Request, &mut Response) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Which handler a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dynamic,
    Static,
}

/// Routes requests to the dynamic handler when the normalized path starts
/// with the servlet prefix, and to the static resource handler otherwise.
#[derive(Clone)]
pub struct Dispatcher {
    servlet_prefix: String,
    dynamic: Arc<dyn Handler>,
    static_resources: Arc<dyn Handler>,
}

impl Dispatcher {
    pub fn new(
        servlet_prefix: impl Into<String>,
        dynamic: Arc<dyn Handler>,
        static_resources: Arc<dyn Handler>,
    ) -> Self {
        Self {
            servlet_prefix: servlet_prefix.into(),
            dynamic,
            static_resources,
        }
    }

    pub fn servlet_prefix(&self) -> &str {
        &self.servlet_prefix
    }

    pub fn route(&self, request: &Request) -> Route {
        if request.path.starts_with(&self.servlet_prefix) {
            Route::Dynamic
        } else {
            Route::Static
        }
    }

    pub fn dispatch(&self, request: &Request, response: &mut Response) -> anyhow::Result<Route> {
        let route = self.route(request);
        match route {
            Route::Dynamic => self.dynamic.handle(request, response)?,
            Route::Static => self.static_resources.handle(request, response)?,
        }
        Ok(route)
    }
}
