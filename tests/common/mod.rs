#![allow(dead_code)]

use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use pyrmont::server::connection::Connection;
use pyrmont::server::processor::{Processor, Recycler};

/// In-memory connection: reads canned request bytes, records what is
/// written and whether it was closed.
pub struct MockConnection {
    input: Cursor<Vec<u8>>,
    probe: Probe,
}

#[derive(Clone, Default)]
pub struct Probe {
    output: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

impl Probe {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output.lock().unwrap()).into_owned()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl MockConnection {
    pub fn new(request: &[u8]) -> (Self, Probe) {
        let probe = Probe::default();
        let conn = Self {
            input: Cursor::new(request.to_vec()),
            probe: probe.clone(),
        };
        (conn, probe)
    }
}

impl Read for MockConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MockConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.probe.output.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connection for MockConnection {
    fn close(&mut self) -> io::Result<()> {
        self.probe.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Counts recycle notifications.
#[derive(Default)]
pub struct CountingRecycler {
    count: Mutex<usize>,
    changed: Condvar,
}

impl CountingRecycler {
    pub fn count(&self) -> usize {
        *self.count.lock().unwrap()
    }

    /// Waits until at least `n` recycles happened; false on timeout.
    pub fn wait_for(&self, n: usize) -> bool {
        let guard = self.count.lock().unwrap();
        let (_guard, timeout) = self
            .changed
            .wait_timeout_while(guard, Duration::from_secs(10), |count| *count < n)
            .unwrap();
        !timeout.timed_out()
    }
}

impl Recycler<MockConnection> for CountingRecycler {
    fn recycle(&self, _processor: Arc<Processor<MockConnection>>) {
        *self.count.lock().unwrap() += 1;
        self.changed.notify_all();
    }
}
