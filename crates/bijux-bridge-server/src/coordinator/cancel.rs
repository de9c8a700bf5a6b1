// SPDX-License-Identifier: Apache-2.0

use tokio::sync::watch;

/// Fires when the owning request goes away.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Pends forever if the guard was disarmed.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            let fired = *rx.borrow_and_update();
            if fired {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Cancels its paired signal on drop unless disarmed first.
#[derive(Debug)]
pub struct CancelOnDrop {
    tx: watch::Sender<bool>,
    armed: bool,
}

impl CancelOnDrop {
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.tx.send_replace(true);
        }
    }
}

#[must_use]
pub fn cancel_pair() -> (CancelOnDrop, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelOnDrop { tx, armed: true }, CancelSignal { rx })
}
