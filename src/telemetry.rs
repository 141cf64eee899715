//! Background event logging
//!
//! Gameplay events are handed to a worker thread and logged there. The queue
//! is bounded: when it is full, new messages are dropped and counted instead
//! of blocking the tick. On shutdown the worker gets a bounded amount of time
//! to drain what is queued.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::Level;

use crate::sim::GameEvent;

/// Messages the queue holds before `record` starts dropping
pub const QUEUE_CAPACITY: usize = 1024;

enum Message {
    Event(GameEvent),
    Note(String),
}

/// Outcome of [`EventLog::shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    /// Messages the worker wrote; `None` when it did not finish in time
    pub logged: Option<usize>,
    /// Messages rejected because the queue was full
    pub dropped: usize,
}

pub struct EventLog {
    tx: Option<SyncSender<Message>>,
    dropped: AtomicUsize,
    done_rx: Receiver<usize>,
    handle: Option<JoinHandle<()>>,
}

impl EventLog {
    /// Start the worker on the `log` facade. `verbose` logs events at info
    /// level, otherwise debug.
    pub fn start(verbose: bool) -> std::io::Result<Self> {
        Self::with_sink(QUEUE_CAPACITY, verbose, |level, line| {
            log::log!(level, "{line}")
        })
    }

    /// Start the worker with a custom line sink
    pub fn with_sink<F>(capacity: usize, verbose: bool, mut sink: F) -> std::io::Result<Self>
    where
        F: FnMut(Level, &str) + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<Message>(capacity);
        let (done_tx, done_rx) = mpsc::channel();
        let event_level = if verbose { Level::Info } else { Level::Debug };

        let handle = thread::Builder::new()
            .name("event-log".into())
            .spawn(move || {
                let mut processed = 0usize;
                for message in rx {
                    match message {
                        Message::Event(event) => sink(event_level, &event.to_string()),
                        Message::Note(note) => sink(Level::Info, &note),
                    }
                    processed += 1;
                }
                let _ = done_tx.send(processed);
            })?;

        Ok(Self {
            tx: Some(tx),
            dropped: AtomicUsize::new(0),
            done_rx,
            handle: Some(handle),
        })
    }

    /// Queue an event; never blocks
    pub fn record(&self, event: GameEvent) {
        self.send(Message::Event(event));
    }

    /// Queue a free-form line
    pub fn note(&self, note: impl Into<String>) {
        self.send(Message::Note(note.into()));
    }

    fn send(&self, message: Message) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // Worker gone; nothing left to log to
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Messages dropped so far because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Close the queue and wait up to `timeout` for the worker to drain it
    pub fn shutdown(mut self, timeout: Duration) -> LogStats {
        self.tx.take();
        let dropped = self.dropped();
        let logged = match self.done_rx.recv_timeout(timeout) {
            Ok(processed) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                Some(processed)
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Event log did not drain within {timeout:?}");
                None
            }
            Err(RecvTimeoutError::Disconnected) => None,
        };
        LogStats { logged, dropped }
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish on its own
        self.tx.take();
    }
}
