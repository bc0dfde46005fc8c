use std::sync::{Mutex, MutexGuard, PoisonError};

pub type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out of notifications to registered callbacks.
///
/// Callbacks run while the hub lock is held, so `unsubscribe` returning
/// means the callback has finished its last invocation. Callbacks must not
/// subscribe or unsubscribe from inside a dispatch.
pub struct NotificationHub<T> {
	inner: Mutex<HubInner<T>>,
}

struct HubInner<T> {
	next_id: u64,
	subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> NotificationHub<T> {
	pub fn new() -> Self {
		Self {
			inner: Mutex::new(HubInner {
				next_id: 1,
				subscribers: Vec::new(),
			}),
		}
	}

	fn lock(&self) -> MutexGuard<'_, HubInner<T>> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn subscribe(&self, callback: Callback<T>) -> SubscriptionId {
		let mut inner = self.lock();
		let id = SubscriptionId(inner.next_id);
		inner.next_id += 1;
		inner.subscribers.push((id, callback));
		id
	}

	/// Returns whether `id` was registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut inner = self.lock();
		let before = inner.subscribers.len();
		inner.subscribers.retain(|(sub, _)| *sub != id);
		inner.subscribers.len() != before
	}

	pub fn emit(&self, value: &T) {
		let inner = self.lock();
		for (_, callback) in &inner.subscribers {
			callback(value);
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.lock().subscribers.len()
	}
}

impl<T> Default for NotificationHub<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn emit_reaches_every_subscriber() {
		let hub = NotificationHub::<u32>::new();
		let total = Arc::new(AtomicUsize::new(0));
		for _ in 0..3 {
			let total = total.clone();
			hub.subscribe(Box::new(move |v: &u32| {
				total.fetch_add(*v as usize, Ordering::SeqCst);
			}));
		}
		hub.emit(&2);
		assert_eq!(total.load(Ordering::SeqCst), 6);
	}

	#[test]
	fn unsubscribed_callback_is_not_invoked() {
		let hub = NotificationHub::<u32>::new();
		let hits = Arc::new(AtomicUsize::new(0));
		let id = {
			let hits = hits.clone();
			hub.subscribe(Box::new(move |_: &u32| {
				hits.fetch_add(1, Ordering::SeqCst);
			}))
		};
		hub.emit(&0);
		assert!(hub.unsubscribe(id));
		assert!(!hub.unsubscribe(id));
		hub.emit(&0);
		assert_eq!(hits.load(Ordering::SeqCst), 1);
		assert_eq!(hub.subscriber_count(), 0);
	}

	#[test]
	fn ids_are_unique() {
		let hub = NotificationHub::<()>::new();
		let a = hub.subscribe(Box::new(|_: &()| {}));
		let b = hub.subscribe(Box::new(|_: &()| {}));
		assert_ne!(a, b);
	}
}
