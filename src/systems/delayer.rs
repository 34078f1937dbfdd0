//! One-shot delayed tasks on a background thread.
//!
//! Used by the canvas to remove animations once their duration has passed.
//! Jobs are sent over a `crossbeam-channel` to a single worker that keeps
//! them in a deadline-ordered heap and sleeps until the earliest is due.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, trace, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fallback delay for deadlines that do not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

struct Pending {
    due: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest deadline first, ties in
    // submission order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Background scheduler running each job once after its delay.
///
/// Dropping the delayer stops the worker; jobs that are not due yet are
/// discarded without running.
pub struct Delayer {
    tx: Option<Sender<Pending>>,
    seq: AtomicU64,
    handle: Option<JoinHandle<()>>,
}

impl Default for Delayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Delayer {
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<Pending>();
        let handle = thread::spawn(move || delayer_thread(rx));
        Self {
            tx: Some(tx),
            seq: AtomicU64::new(0),
            handle: Some(handle),
        }
    }

    /// Run `job` once, `delay` from now.
    pub fn schedule<F>(&self, delay: Duration, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let now = Instant::now();
        let pending = Pending {
            due: now
                .checked_add(delay)
                .unwrap_or_else(|| now + FAR_FUTURE),
            seq: self.seq.fetch_add(1, AtomicOrdering::Relaxed),
            job: Box::new(job),
        };
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(pending).is_err() {
            warn!("Delayer thread is gone, dropping job");
        }
    }

    /// Stop the worker and wait for it. Pending jobs never run.
    pub fn shutdown(&mut self) {
        // Disconnecting the channel is the stop signal.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("Delayer thread panicked");
            }
        }
    }
}

impl Drop for Delayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn delayer_thread(rx: Receiver<Pending>) {
    let mut queue: BinaryHeap<Pending> = BinaryHeap::new();
    loop {
        let received = match queue.peek() {
            Some(next) => rx.recv_deadline(next.due),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(pending) => queue.push(pending),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        while queue.peek().is_some_and(|p| p.due <= now) {
            if let Some(pending) = queue.pop() {
                trace!("Running delayed job #{}", pending.seq);
                (pending.job)();
            }
        }
    }
    debug!("Delayer stopped with {} job(s) pending", queue.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_runs_in_deadline_order() {
        let delayer = Delayer::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (delay, tag) in [(40, "late"), (5, "early"), (20, "middle")] {
            let log = log.clone();
            delayer.schedule(Duration::from_millis(delay), move || {
                log.lock().unwrap().push(tag)
            });
        }
        thread::sleep(Duration::from_millis(200));
        assert_eq!(*log.lock().unwrap(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_equal_deadlines_keep_submission_order() {
        let delayer = Delayer::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let log = log.clone();
            delayer.schedule(Duration::ZERO, move || log.lock().unwrap().push(i));
        }
        thread::sleep(Duration::from_millis(100));
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_drop_discards_pending_jobs() {
        let ran = Arc::new(Mutex::new(false));
        {
            let delayer = Delayer::new();
            let ran = ran.clone();
            delayer.schedule(Duration::from_secs(30), move || *ran.lock().unwrap() = true);
        }
        assert!(!*ran.lock().unwrap());
    }
}
