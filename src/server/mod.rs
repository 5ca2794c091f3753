//! Connection handling: processors, their pool, dispatch and the acceptor.
//!
//! # Handoff
//!
//! Each processor owns one worker thread and a single-slot mailbox:
//!
//! ```text
//!   acceptor                         processor thread
//!   ────────                         ────────────────
//!   pool.create_processor()          await_connection()  ← Idle, blocked
//!   processor.assign(conn) ───────▶  claims conn, slot free again
//!                                    parse → dispatch → write → close
//!                                    pool.recycle(processor)
//!                                    await_connection()  ← Idle again
//! ```
//!
//! `assign` waits while an earlier assignment is unclaimed, so a connection
//! is never overwritten and never given to two processors.

pub mod connection;
pub mod dispatch;
pub mod handlers;
pub mod listener;
pub mod pool;
pub mod processor;

pub use connection::Connection;
pub use dispatch::{Dispatcher, Handler, Route};
pub use pool::ProcessorPool;
pub use processor::{Processor, ProcessorSettings, Recycler};
