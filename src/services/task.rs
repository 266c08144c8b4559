use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

/// One-shot handle to a value computed on a detached worker thread.
///
/// Dropping the handle does not stop the worker; its result is discarded.
pub struct Task<T> {
    rx: Receiver<T>,
}

pub fn spawn<T, F>(work: F) -> Task<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::spawn(move || {
        let _ = tx.send(work());
    });
    Task { rx }
}

impl<T> Task<T> {
    /// Blocks until the worker finishes. `None` if it panicked.
    pub fn wait(self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn wait_timeout(self, timeout: Duration) -> Result<Option<T>, Task<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(v) => Ok(Some(v)),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => Err(self),
        }
    }

    pub fn try_take(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(v) => Some(v),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn wait_returns_worker_value() {
        let task = spawn(|| 40 + 2);
        assert_eq!(task.wait(), Some(42));
    }

    #[test]
    fn panicking_worker_yields_none() {
        let task: Task<u8> = spawn(|| panic!("boom"));
        assert_eq!(task.wait(), None);
    }

    #[test]
    fn timeout_hands_the_task_back() {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let task = spawn(move || {
            let _ = gate_rx.recv();
            "late"
        });

        let task = match task.wait_timeout(Duration::from_millis(20)) {
            Err(task) => task,
            Ok(v) => panic!("unexpected completion: {v:?}"),
        };
        assert!(task.try_take().is_none());

        gate_tx.send(()).unwrap();
        assert_eq!(task.wait(), Some("late"));
    }
}
