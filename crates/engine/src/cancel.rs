// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external cancellation signal `execute` accepts, and the handle a
//! caller uses to trigger it (a Ctrl-C handler, a watch-mode shutdown).

use tokio::sync::watch;

pub fn cancellation_channel() -> (CancellationHandle, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (CancellationHandle(tx), CancellationSignal(rx))
}

#[derive(Clone)]
pub struct CancellationHandle(watch::Sender<bool>);

impl CancellationHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

#[derive(Clone)]
pub struct CancellationSignal(watch::Receiver<bool>);

impl CancellationSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the signal has been cancelled. Used to bridge into the
    /// process runner's oneshot-based cancellation.
    pub async fn cancelled(&mut self) {
        let _ = self.0.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_handle_wakes_the_signal() {
        let (handle, mut signal) = cancellation_channel();
        assert!(!signal.is_cancelled());
        handle.cancel();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }
}
