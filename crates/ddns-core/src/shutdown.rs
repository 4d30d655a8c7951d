//! Shutdown token
//!
//! A cloneable cancellation token passed into the poll loop. It is polled, not
//! preemptive: the loop checks it before each check and races it against each sleep,
//! so an in-flight check always runs to completion.
//!
//! The token counts requests. Callers that need "second signal forces exit" semantics
//! read [`Shutdown::request`]'s return value.

use tokio::sync::watch;

/// Cloneable shutdown token
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<u32>,
    rx: watch::Receiver<u32>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(0);
        Self { tx, rx }
    }

    /// Ask the loop to stop; returns how many requests have been made so far
    pub fn request(&self) -> u32 {
        let mut count = 0;
        self.tx.send_modify(|requests| {
            *requests = requests.saturating_add(1);
            count = *requests;
        });
        count
    }

    /// At least one request has been made
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow() > 0
    }

    /// Resolve once a request has been made
    pub async fn requested(&self) {
        let mut rx = self.rx.clone();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(|requests| *requests > 0).await;
    }
}
