use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, trace, warn};

use crate::config::ServerConfig;
use crate::http::parser::RequestParser;
use crate::http::response::{Response, StatusCode};
use crate::http::stream::{DEFAULT_BUFFER_SIZE, SocketInputStream};
use crate::http::writer::write_response;
use crate::server::connection::Connection;
use crate::server::dispatch::{Dispatcher, Route};

/// Default value of the `Server` response header.
pub const SERVER_INFO: &str = "Pyrmont Servlet Container";

/// Receives processors that finished a connection and can take another.
pub trait Recycler<C: Connection>: Send + Sync {
    fn recycle(&self, processor: Arc<Processor<C>>);
}

/// Per-processor settings taken from the server configuration.
#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub buffer_size: usize,
    pub server_header: String,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            server_header: SERVER_INFO.to_string(),
        }
    }
}

impl From<&ServerConfig> for ProcessorSettings {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            buffer_size: cfg.buffer_size,
            server_header: cfg.server_header.clone(),
        }
    }
}

/// Handoff slot. `available` means an assignment is waiting to be claimed;
/// an assigned `None` is a wake-up with no work.
struct Slot<C> {
    connection: Option<C>,
    available: bool,
}

/// A reusable worker that serves one connection at a time.
///
/// An acceptor hands it a connection with [`Processor::assign`]; the worker
/// thread, blocked in [`Processor::run`], claims it, parses the request,
/// dispatches it, closes the socket and reports back to its [`Recycler`].
pub struct Processor<C: Connection> {
    id: usize,
    slot: Mutex<Slot<C>>,
    handoff: Condvar,
    stopped: AtomicBool,
    dispatcher: Arc<Dispatcher>,
    settings: ProcessorSettings,
}

impl<C: Connection> Processor<C> {
    pub fn new(id: usize, dispatcher: Arc<Dispatcher>, settings: ProcessorSettings) -> Self {
        Self {
            id,
            slot: Mutex::new(Slot {
                connection: None,
                available: false,
            }),
            handoff: Condvar::new(),
            stopped: AtomicBool::new(false),
            dispatcher,
            settings,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, Slot<C>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands a connection to this processor.
    ///
    /// Blocks while a previous assignment is still unclaimed. `None` wakes
    /// the worker without work so it can notice a stop request.
    pub fn assign(&self, connection: Option<C>) {
        let mut slot = self
            .handoff
            .wait_while(self.lock(), |slot| slot.available)
            .unwrap_or_else(PoisonError::into_inner);
        slot.connection = connection;
        slot.available = true;
        self.handoff.notify_all();
    }

    /// Blocks until an assignment arrives, then claims it.
    fn await_connection(&self) -> Option<C> {
        let mut slot = self
            .handoff
            .wait_while(self.lock(), |slot| !slot.available)
            .unwrap_or_else(PoisonError::into_inner);
        let connection = slot.connection.take();
        slot.available = false;
        self.handoff.notify_all();
        if connection.is_some() {
            trace!(processor = self.id, "The incoming request has been awaited");
        }
        connection
    }

    /// Asks the worker loop to exit once its current connection is done.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.assign(None);
    }

    /// Spawns the worker thread.
    pub fn start(self: Arc<Self>, recycler: Arc<dyn Recycler<C>>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("pyrmont-processor-{}", self.id))
            .spawn(move || self.run(recycler))
    }

    /// The worker loop. Every claimed connection is closed and followed by
    /// exactly one `recycle`, whatever happened while serving it.
    pub fn run(self: Arc<Self>, recycler: Arc<dyn Recycler<C>>) {
        let mut parser = RequestParser::new(self.settings.buffer_size);
        debug!(processor = self.id, "Processor started");

        loop {
            let Some(connection) = self.await_connection() else {
                if self.is_stopped() {
                    break;
                }
                continue;
            };
            self.process(connection, &mut parser);
            recycler.recycle(Arc::clone(&self));
        }

        debug!(processor = self.id, "Processor stopped");
    }

    fn process(&self, mut connection: C, parser: &mut RequestParser) {
        let peer = connection.remote_addr();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.serve(&mut connection, parser)));
        match outcome {
            Ok(Ok(route)) => trace!(processor = self.id, ?peer, ?route, "Connection served"),
            Ok(Err(e)) => warn!(
                processor = self.id,
                ?peer,
                error = %e,
                "Request failed"
            ),
            Err(_) => error!(processor = self.id, ?peer, "Request handler panicked"),
        }

        if let Err(e) = connection.close() {
            debug!(processor = self.id, ?peer, error = %e, "Failed to close connection");
        }
    }

    fn serve(&self, connection: &mut C, parser: &mut RequestParser) -> anyhow::Result<Route> {
        let request = {
            let mut input = SocketInputStream::new(&mut *connection, self.settings.buffer_size);
            parser.parse(&mut input)?
        };

        let mut response = Response::new(StatusCode::Ok);
        response.set_header("Server", self.settings.server_header.as_str());

        let route = self.dispatcher.dispatch(&request, &mut response)?;
        write_response(&response, connection)?;

        info!(
            processor = self.id,
            method = %request.method,
            path = %request.path,
            ?route,
            status = response.status.as_u16(),
            "Request served"
        );
        Ok(route)
    }
}
