//! Pyrmont - a minimal HTTP/1.x servlet container core
//!
//! Reusable processors parse requests straight off the socket and route
//! them to a servlet registry or a static file handler.

pub mod config;
pub mod http;
pub mod server;
