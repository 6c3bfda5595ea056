//! Consumer registry for published position estimates
//!
//! The engine only produces estimates. Renderers and loggers attach here,
//! either as callbacks run on the estimating thread or as channel
//! subscribers polled from their own thread.

use crate::core::PositionEstimate;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Callback function type for position updates
pub type PositionCallback = Box<dyn Fn(&PositionEstimate) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(&PositionEstimate) + Send + Sync>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

#[derive(Default)]
pub struct ConsumerRegistry {
    next_id: u32,
    callbacks: Vec<(CallbackHandle, SharedCallback)>,
    subscribers: Vec<Sender<PositionEstimate>>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: PositionCallback) -> CallbackHandle {
        let handle = CallbackHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.callbacks.push((handle, Arc::from(callback)));
        handle
    }

    /// Returns `false` if the handle was not registered
    pub fn unregister(&mut self, handle: CallbackHandle) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(registered, _)| *registered != handle);
        self.callbacks.len() != before
    }

    pub fn subscribe(&mut self) -> Receiver<PositionEstimate> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Deliver to every consumer; subscribers whose receiver is gone are dropped
    pub fn publish(&mut self, estimate: &PositionEstimate) {
        for callback in self.callbacks() {
            callback(estimate);
        }
        self.notify_subscribers(estimate);
    }

    /// Registered callbacks, detached so they can run without holding the registry
    pub fn callbacks(&self) -> Vec<Arc<dyn Fn(&PositionEstimate) + Send + Sync>> {
        self.callbacks.iter().map(|(_, callback)| Arc::clone(callback)).collect()
    }

    pub fn notify_subscribers(&mut self, estimate: &PositionEstimate) {
        self.subscribers.retain(|sender| sender.send(*estimate).is_ok());
    }

    pub fn consumer_count(&self) -> usize {
        self.callbacks.len() + self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnresolvedReason;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callbacks_and_unregister() {
        let mut registry = ConsumerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = registry.register(Box::new(move |_: &PositionEstimate| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.publish(&PositionEstimate::Resolved { x: 1.0, y: 1.0 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(registry.unregister(handle));
        assert!(!registry.unregister(handle));
        registry.publish(&PositionEstimate::Resolved { x: 1.0, y: 1.0 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribers_receive_and_are_pruned() {
        let mut registry = ConsumerRegistry::new();
        let receiver = registry.subscribe();
        let dropped = registry.subscribe();
        drop(dropped);

        let estimate = PositionEstimate::Unresolved { reason: UnresolvedReason::OutOfBounds };
        registry.publish(&estimate);
        assert_eq!(receiver.try_recv().unwrap(), estimate);
        assert_eq!(registry.consumer_count(), 1);
    }
}
