/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Fan-out of zero-payload "something changed, re-fetch" signals to subscribed observers.
//!
//! This is the push-notification transport the presentation layer builds on (e.g., to hold open
//! long-polls or server-sent event streams). It is distinct from the [event bus](crate::event_bus):
//! events describe *what* happened and are consumed by registered handlers in-process, while the
//! notifier tells an arbitrary, changing set of observers only *that* the visible state changed.
//!
//! Delivery is at-most-once per change per subscriber, with no ordering guarantee. A subscriber
//! that drops its receiver is pruned the next time a notification fails to send; disconnection
//! can never crash the notifying thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

pub type SubscriberId = u64;

pub struct ChangeNotifier {
    subscribers: Mutex<Vec<(SubscriberId, Sender<()>)>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub(crate) fn new() -> ChangeNotifier {
        ChangeNotifier {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new observer. The returned receiver yields one `()` per observed change; the
    /// id can be used to [unsubscribe](ChangeNotifier::unsubscribe) explicitly, though simply
    /// dropping the receiver works too.
    pub fn subscribe(&self) -> (SubscriberId, Receiver<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel();
        self.subscribers.lock().unwrap().push((id, sender));
        (id, receiver)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(subscriber_id, _)| *subscriber_id != id);
    }

    /// Send one notification token to every currently registered subscriber, pruning the ones
    /// whose receiving end has been dropped.
    pub(crate) fn notify_all(&self) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(_, sender)| sender.send(()).is_ok());
    }
}
