//! # Connectivity Signal
//!
//! A `watch` channel carrying the current online flag. The monitor owns the
//! sending half; every consumer holds a cheap [`ConnectivityHandle`].

use tokio::sync::watch;

/// Sending half: publishes readings.
#[derive(Debug)]
pub struct ConnectivitySignal {
    tx: watch::Sender<bool>,
}

impl ConnectivitySignal {
    /// Create a signal with an initial reading.
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Publish a reading, returning the previous one.
    pub fn replace(&self, online: bool) -> bool {
        self.tx.send_replace(online)
    }

    /// Current reading.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// New receiving handle.
    pub fn handle(&self) -> ConnectivityHandle {
        ConnectivityHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving half: reads the current flag or waits for changes.
#[derive(Clone, Debug)]
pub struct ConnectivityHandle {
    rx: watch::Receiver<bool>,
}

impl ConnectivityHandle {
    /// Current reading.
    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the next change. Returns `None` once the signal is dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
