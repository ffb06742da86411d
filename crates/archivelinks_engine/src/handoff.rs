//! Rendezvous hand-off channel: a send completes only once the receiver is
//! waiting for a value, so nothing is ever buffered on the producer side.
//!
//! Each `recv` offers one slot and keeps it open only while it is awaited.
//! Producers queue up for the next open slot and fill it; a slot closed by a
//! dropped `recv` hands the value straight back to its producer.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{mpsc, oneshot, Mutex};

type Slot<T> = oneshot::Sender<T>;

/// Creates a connected sender/receiver pair.
pub fn channel<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (slot_tx, slot_rx) = mpsc::unbounded_channel();
    let sender = HandoffSender {
        slots: Arc::new(Mutex::new(slot_rx)),
    };
    let receiver = HandoffReceiver {
        slots: slot_tx,
        accepted: StdMutex::new(VecDeque::new()),
    };
    (sender, receiver)
}

/// Producing half. Cheap to clone; every clone competes for the same slots.
pub struct HandoffSender<T> {
    slots: Arc<Mutex<mpsc::UnboundedReceiver<Slot<T>>>>,
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> HandoffSender<T> {
    /// Waits for the receiver to offer a slot, then fills it.
    ///
    /// Gives the value back if the receiver has been dropped. Dropping the
    /// returned future before it completes never consumes a slot.
    pub async fn send(&self, mut value: T) -> Result<(), T> {
        let mut slots = self.slots.lock().await;
        loop {
            let Some(slot) = slots.recv().await else {
                return Err(value);
            };
            // A closed slot belongs to a recv that stopped waiting.
            match slot.send(value) {
                Ok(()) => return Ok(()),
                Err(returned) => value = returned,
            }
        }
    }
}

/// Consuming half.
pub struct HandoffReceiver<T> {
    slots: mpsc::UnboundedSender<Slot<T>>,
    /// Values filled into a slot in the instant before its `recv` was dropped.
    accepted: StdMutex<VecDeque<T>>,
}

impl<T> HandoffReceiver<T> {
    /// Waits for the next value. Returns `None` once every sender is gone.
    ///
    /// Cancel-safe: a value handed over before the future is dropped is
    /// returned by the next `recv` instead of being lost.
    pub async fn recv(&self) -> Option<T> {
        if let Some(value) = self.take_accepted() {
            return Some(value);
        }
        let (slot, rx) = oneshot::channel();
        self.slots.send(slot).ok()?;
        let mut offer = Offer {
            rx,
            accepted: &self.accepted,
            done: false,
        };
        let value = (&mut offer.rx).await.ok();
        offer.done = true;
        value
    }

    fn take_accepted(&self) -> Option<T> {
        self.accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// An open slot. Dropping it unfinished closes the slot, so a producer
/// arriving afterwards gets its value back.
struct Offer<'a, T> {
    rx: oneshot::Receiver<T>,
    accepted: &'a StdMutex<VecDeque<T>>,
    done: bool,
}

impl<T> Drop for Offer<'_, T> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.rx.close();
        if let Ok(value) = self.rx.try_recv() {
            self.accepted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(value);
        }
    }
}
