//! Pool of processors the acceptor draws from.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tracing::{debug, error, info};

use crate::server::connection::Connection;
use crate::server::dispatch::Dispatcher;
use crate::server::processor::{Processor, ProcessorSettings, Recycler};

struct PoolState<C: Connection> {
    /// Processors waiting for work, most recently recycled last
    idle: Vec<Arc<Processor<C>>>,
    /// Every processor ever started
    all: Vec<Arc<Processor<C>>>,
    handles: Vec<JoinHandle<()>>,
    stopped: bool,
}

/// Bounded set of processors.
///
/// Starts `min_processors` workers up front and grows on demand up to
/// `max_processors`. A processor leaves the idle stack when handed out and
/// comes back through [`Recycler::recycle`] once its connection is closed.
pub struct ProcessorPool<C: Connection> {
    state: Mutex<PoolState<C>>,
    dispatcher: Arc<Dispatcher>,
    settings: ProcessorSettings,
    max_processors: usize,
}

impl<C: Connection> ProcessorPool<C> {
    pub fn start(
        dispatcher: Arc<Dispatcher>,
        settings: ProcessorSettings,
        min_processors: usize,
        max_processors: usize,
    ) -> io::Result<Arc<Self>> {
        let pool = Arc::new(Self {
            state: Mutex::new(PoolState {
                idle: Vec::with_capacity(max_processors),
                all: Vec::with_capacity(max_processors),
                handles: Vec::with_capacity(max_processors),
                stopped: false,
            }),
            dispatcher,
            settings,
            max_processors: max_processors.max(1),
        });

        {
            let mut state = pool.lock();
            for _ in 0..min_processors.min(pool.max_processors) {
                let processor = pool.spawn_processor(&mut state)?;
                state.idle.push(processor);
            }
        }

        info!(
            min = min_processors,
            max = pool.max_processors,
            "Processor pool started"
        );
        Ok(pool)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_processor(self: &Arc<Self>, state: &mut PoolState<C>) -> io::Result<Arc<Processor<C>>> {
        let processor = Arc::new(Processor::new(
            state.all.len(),
            Arc::clone(&self.dispatcher),
            self.settings.clone(),
        ));
        let recycler: Arc<dyn Recycler<C>> = Arc::clone(self) as Arc<dyn Recycler<C>>;
        let handle = Arc::clone(&processor).start(recycler)?;
        state.all.push(Arc::clone(&processor));
        state.handles.push(handle);
        debug!(processor = processor.id(), "Processor created");
        Ok(processor)
    }

    /// Takes an idle processor, starting a new one if the pool may still
    /// grow. `None` means every processor is busy.
    pub fn create_processor(self: &Arc<Self>) -> Option<Arc<Processor<C>>> {
        let mut state = self.lock();
        if state.stopped {
            return None;
        }
        if let Some(processor) = state.idle.pop() {
            return Some(processor);
        }
        if state.all.len() >= self.max_processors {
            return None;
        }
        match self.spawn_processor(&mut state) {
            Ok(processor) => Some(processor),
            Err(e) => {
                error!(error = %e, "Failed to start processor thread");
                None
            }
        }
    }

    pub fn idle_count(&self) -> usize {
        self.lock().idle.len()
    }

    pub fn processor_count(&self) -> usize {
        self.lock().all.len()
    }

    /// Stops every processor. Busy ones finish their connection first.
    pub fn shutdown(&self) {
        let processors = {
            let mut state = self.lock();
            state.stopped = true;
            state.idle.clear();
            state.all.clone()
        };
        for processor in &processors {
            processor.stop();
        }
        info!(processors = processors.len(), "Processor pool stopped");
    }

    /// Waits for all worker threads to exit. Call after [`shutdown`](Self::shutdown).
    pub fn join(&self) {
        let handles = std::mem::take(&mut self.lock().handles);
        for handle in handles {
            if handle.join().is_err() {
                error!("Processor thread panicked");
            }
        }
    }
}

impl<C: Connection> Recycler<C> for ProcessorPool<C> {
    fn recycle(&self, processor: Arc<Processor<C>>) {
        let mut state = self.lock();
        if state.stopped || processor.is_stopped() {
            return;
        }
        state.idle.push(processor);
    }
}
