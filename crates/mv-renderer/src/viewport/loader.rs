//! Asynchronous model loading boundary

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use mv_core::{GeometryTree, LoadError, ModelSource, load_model};
use parking_lot::{Condvar, Mutex};

/// A load tagged with the generation that issued it.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub generation: u64,
    pub source: ModelSource,
}

/// Result of a load, delivered back to the owning thread.
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub result: Result<GeometryTree, LoadError>,
}

/// Channel end a loader delivers its completion to.
pub type LoadReply = Sender<LoadCompletion>;

/// Starts loads without blocking the caller.
///
/// Implementations must eventually send one [`LoadCompletion`] for the
/// newest request. A request superseded by a newer one before it started
/// may be dropped without a completion. A send error means the viewport is
/// gone; the result is dropped.
pub trait ModelLoader {
    fn request(&mut self, request: LoadRequest, reply: LoadReply);
}

/// Callback run after a completion has been queued.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

type Job = (LoadRequest, LoadReply);

/// Single-entry queue that only keeps the newest job.
#[derive(Default)]
struct LatestSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

#[derive(Default)]
struct SlotState {
    next: Option<Job>,
    shutdown: bool,
}

impl LatestSlot {
    /// Stores `job`, returning the queued job it replaced.
    fn put(&self, job: Job) -> Option<Job> {
        let replaced = self.state.lock().next.replace(job);
        self.ready.notify_one();
        replaced
    }

    /// Blocks until a job is queued. `None` once shut down.
    fn take(&self) -> Option<Job> {
        let mut state = self.state.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(job) = state.next.take() {
                return Some(job);
            }
            self.ready.wait(&mut state);
        }
    }

    fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        state.next = None;
        drop(state);
        self.ready.notify_all();
    }
}

/// Parses requests on one worker thread, newest first.
///
/// Requests that arrive while a parse is running replace each other, so a
/// burst of config changes costs at most one parse in flight and one queued.
pub struct ThreadedLoader {
    slot: Arc<LatestSlot>,
    waker: Option<Waker>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedLoader {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(LatestSlot::default()),
            waker: None,
            worker: None,
        }
    }

    /// Calls `waker` after each completion, e.g. to request a repaint.
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            slot: Arc::new(LatestSlot::default()),
            waker: Some(Arc::new(waker)),
            worker: None,
        }
    }

    fn ensure_worker(&mut self) -> std::io::Result<()> {
        if self.worker.as_ref().is_some_and(|w| !w.is_finished()) {
            return Ok(());
        }
        let slot = Arc::clone(&self.slot);
        let waker = self.waker.clone();
        let handle = std::thread::Builder::new()
            .name("mv-loader".into())
            .spawn(move || run_worker(&slot, waker))?;
        self.worker = Some(handle);
        Ok(())
    }
}

impl Default for ThreadedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadedLoader {
    fn drop(&mut self) {
        self.slot.shutdown();
    }
}

fn run_worker(slot: &LatestSlot, waker: Option<Waker>) {
    while let Some((request, reply)) = slot.take() {
        let generation = request.generation;
        tracing::debug!(
            "Loading '{}' for generation {}",
            request.source.name(),
            generation
        );
        let result = load_model(&request.source);
        if reply.send(LoadCompletion { generation, result }).is_err() {
            tracing::debug!("Viewport gone, dropping load for generation {}", generation);
            continue;
        }
        if let Some(waker) = &waker {
            waker();
        }
    }
}

impl ModelLoader for ThreadedLoader {
    fn request(&mut self, request: LoadRequest, reply: LoadReply) {
        let generation = request.generation;

        if let Err(e) = self.ensure_worker() {
            let _ = reply.send(LoadCompletion {
                generation,
                result: Err(LoadError::Io(format!("failed to start loader thread: {}", e))),
            });
            return;
        }

        if let Some((superseded, _)) = self.slot.put((request, reply)) {
            tracing::debug!(
                "Load for generation {} superseded by generation {}",
                superseded.generation,
                generation
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    const TRIANGLE: &[u8] = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn triangle_request(generation: u64) -> LoadRequest {
        LoadRequest {
            generation,
            source: ModelSource::bytes("tri.obj", TRIANGLE.to_vec()),
        }
    }

    #[test]
    fn test_threaded_loader_delivers_and_wakes() {
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        let mut loader = ThreadedLoader::with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (tx, rx) = mpsc::channel();
        loader.request(triangle_request(3), tx);

        let completion = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(completion.generation, 3);
        assert_eq!(completion.result.unwrap().triangle_count(), 1);

        // The waker runs right after the send
        for _ in 0..100 {
            if woken.load(Ordering::SeqCst) == 1 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(woken.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_threaded_loader_reports_errors() {
        let mut loader = ThreadedLoader::new();
        let (tx, rx) = mpsc::channel();
        loader.request(
            LoadRequest {
                generation: 1,
                source: ModelSource::path("missing/model.obj"),
            },
            tx,
        );
        let completion = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(completion.result, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_slot_keeps_only_newest_job() {
        let slot = LatestSlot::default();
        let (tx, _rx) = mpsc::channel();
        assert!(slot.put((triangle_request(1), tx.clone())).is_none());
        let replaced = slot.put((triangle_request(2), tx.clone())).unwrap();
        assert_eq!(replaced.0.generation, 1);
        let replaced = slot.put((triangle_request(3), tx)).unwrap();
        assert_eq!(replaced.0.generation, 2);

        assert_eq!(slot.take().unwrap().0.generation, 3);
        slot.shutdown();
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_burst_of_requests_ends_with_newest() {
        let mut loader = ThreadedLoader::new();
        let (tx, rx) = mpsc::channel();
        for generation in 1..=20 {
            loader.request(triangle_request(generation), tx.clone());
        }
        drop(tx);

        let generations: Vec<u64> = std::iter::from_fn(|| {
            rx.recv_timeout(Duration::from_secs(10))
                .ok()
                .map(|c| c.generation)
        })
        .collect();

        // Superseded requests never run after a newer one
        assert!(generations.windows(2).all(|w| w[0] < w[1]), "{:?}", generations);
        assert_eq!(generations.last(), Some(&20));
    }
}
