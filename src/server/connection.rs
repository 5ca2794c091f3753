use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// A live client connection handed to a processor.
pub trait Connection: Read + Write + Send + 'static {
    /// Closes both directions. Called exactly once, after the request is done.
    fn close(&mut self) -> io::Result<()>;

    fn remote_addr(&self) -> Option<SocketAddr> {
        None
    }
}

impl Connection for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.peer_addr().ok()
    }
}
