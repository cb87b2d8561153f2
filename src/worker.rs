//! Simulated background task that reports progress to the UI thread.
//!
//! The worker never touches the ring. It only sends [`WorkerEvent`]s, which the
//! event loop applies on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    Progress(i32),
    Completed { cancelled: bool },
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub steps: i32,
    pub step_delay: Duration,
    /// Upper bound of a random extra delay added to each step
    pub jitter: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            step_delay: Duration::from_millis(100),
            jitter: Duration::ZERO,
        }
    }
}

/// Handle to a running worker thread. Dropping it cancels and joins the thread.
#[derive(Debug)]
pub struct BackgroundWorker {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWorker {
    pub fn spawn(config: WorkerConfig, sender: Sender<WorkerEvent>) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let handle = thread::spawn(move || run(config, &flag, &sender));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Asks the worker to stop before its next step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(config: WorkerConfig, cancel: &AtomicBool, sender: &Sender<WorkerEvent>) {
    info!(steps = config.steps, "worker started");
    let mut rng = rand::rng();
    let mut cancelled = false;
    for i in 1..=config.steps {
        if cancel.load(Ordering::Acquire) {
            cancelled = true;
            break;
        }
        let jitter = if config.jitter.is_zero() {
            Duration::ZERO
        } else {
            Duration::from_millis(rng.random_range(0..=config.jitter.as_millis() as u64))
        };
        thread::sleep(config.step_delay + jitter);
        if sender.send(WorkerEvent::Progress(i)).is_err() {
            debug!("progress receiver gone, worker exiting");
            return;
        }
    }
    info!(cancelled, "worker finished");
    let _ = sender.send(WorkerEvent::Completed { cancelled });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn reports_every_step_then_completes() {
        let (sender, receiver) = mpsc::channel();
        let config = WorkerConfig {
            steps: 5,
            step_delay: Duration::ZERO,
            jitter: Duration::from_millis(1),
        };
        let _worker = BackgroundWorker::spawn(config, sender);
        let events: Vec<_> = (0..6).map(|_| receiver.recv_timeout(TIMEOUT).unwrap()).collect();
        assert_eq!(
            events,
            vec![
                WorkerEvent::Progress(1),
                WorkerEvent::Progress(2),
                WorkerEvent::Progress(3),
                WorkerEvent::Progress(4),
                WorkerEvent::Progress(5),
                WorkerEvent::Completed { cancelled: false },
            ]
        );
    }

    #[test]
    fn cancel_stops_before_the_end() {
        let (sender, receiver) = mpsc::channel();
        let config = WorkerConfig {
            steps: 10_000,
            step_delay: Duration::from_millis(2),
            jitter: Duration::ZERO,
        };
        let worker = BackgroundWorker::spawn(config, sender);
        assert_eq!(receiver.recv_timeout(TIMEOUT).unwrap(), WorkerEvent::Progress(1));
        worker.cancel();
        assert!(worker.is_cancelled());
        let last = loop {
            match receiver.recv_timeout(TIMEOUT).unwrap() {
                WorkerEvent::Progress(i) => assert!(i < 10_000),
                done => break done,
            }
        };
        assert_eq!(last, WorkerEvent::Completed { cancelled: true });
    }

    #[test]
    fn drop_joins_the_thread() {
        let (sender, receiver) = mpsc::channel();
        let config = WorkerConfig {
            steps: 1_000,
            step_delay: Duration::from_millis(1),
            jitter: Duration::ZERO,
        };
        drop(BackgroundWorker::spawn(config, sender));
        // the thread has exited, so the channel is closed once drained
        while receiver.recv_timeout(TIMEOUT).is_ok() {}
        assert!(receiver.try_recv().is_err());
    }
}
