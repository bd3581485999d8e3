//! Event system for pyramid jobs
//!
//! A job announces what it is doing on an [`EventBus`]: start and end of the job, start and end
//! of every level, and the outcome of every tile. The CLI renders these as a progress bar, tests
//! count them.

use crate::TileCoord;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Events emitted while a pyramid is generated.
#[derive(Debug, Clone, PartialEq)]
pub enum PyramidEvent {
	/// A job has planned its pyramid and is about to render level `min_zoom`.
	JobStart { map_name: String, total_tiles: u64 },

	/// Rendering of `level` begins. It will produce `tiles` tile jobs.
	LevelStart { level: u8, tiles: u64 },

	/// A tile was written.
	TileComplete { coord: TileCoord, completed: u64, total: u64 },

	/// A tile could not be written. Its siblings are not affected.
	TileFailed { coord: TileCoord, message: String },

	/// Every tile job of `level` has been submitted.
	LevelComplete { level: u8 },

	/// All tile jobs of the job have finished.
	JobFinish {
		map_name: String,
		tiles_written: u64,
		tiles_failed: u64,
	},
}

/// Unique identifier for event listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type EventListener = Arc<dyn Fn(&PyramidEvent) + Send + Sync>;

/// Thread-safe event bus for pyramid events
///
/// Listeners are called synchronously on the thread that emits the event, which for tile
/// events is a worker thread. Uses lock-free arc-swap, since tile events are frequent.
#[derive(Clone)]
pub struct EventBus {
	listeners: Arc<ArcSwap<Vec<EventListener>>>,
}

impl EventBus {
	pub fn new() -> Self {
		Self {
			listeners: Arc::new(ArcSwap::from_pointee(Vec::new())),
		}
	}

	/// Register an event listener.
	///
	/// Uses read-copy-update (RCU), so listeners may be added while events are emitted.
	pub fn subscribe<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&PyramidEvent) + Send + Sync + 'static,
	{
		let listener: EventListener = Arc::new(listener);
		let previous = self.listeners.rcu(|old| {
			let mut new = (**old).clone();
			new.push(listener.clone());
			new
		});
		ListenerId(previous.len())
	}

	/// Emit an event to all listeners, in registration order.
	///
	/// A panicking listener is isolated; the remaining listeners still see the event.
	pub fn emit(&self, event: PyramidEvent) {
		let listeners = self.listeners.load();
		for listener in listeners.iter() {
			let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
				listener(&event);
			}));
		}
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.load().len()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for EventBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventBus")
			.field("listeners", &self.listener_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	fn level_start(level: u8) -> PyramidEvent {
		PyramidEvent::LevelStart { level, tiles: 1 }
	}

	#[test]
	fn test_event_bus_new() {
		let bus = EventBus::default();
		assert_eq!(bus.listener_count(), 0);
		bus.emit(level_start(0));
	}

	#[test]
	fn test_subscribe_returns_increasing_ids() {
		let bus = EventBus::new();
		let a = bus.subscribe(|_| {});
		let b = bus.subscribe(|_| {});
		assert_eq!(a, ListenerId(0));
		assert_eq!(b, ListenerId(1));
		assert_eq!(bus.listener_count(), 2);
	}

	#[test]
	fn test_emit_reaches_all_listeners() {
		let bus = EventBus::new();
		let seen = Arc::new(Mutex::new(Vec::new()));

		for _ in 0..2 {
			let seen = seen.clone();
			bus.subscribe(move |event| {
				if let PyramidEvent::LevelStart { level, .. } = event {
					seen.lock().unwrap().push(*level);
				}
			});
		}

		bus.emit(level_start(3));
		bus.emit(PyramidEvent::LevelComplete { level: 3 });
		assert_eq!(*seen.lock().unwrap(), [3, 3]);
	}

	#[test]
	fn test_panicking_listener_is_isolated() {
		let bus = EventBus::new();
		let counter = Arc::new(Mutex::new(0));

		bus.subscribe(|_| panic!("listener failure"));
		let c = counter.clone();
		bus.subscribe(move |_| *c.lock().unwrap() += 1);

		bus.emit(level_start(0));
		bus.emit(level_start(1));
		assert_eq!(*counter.lock().unwrap(), 2);
	}

	#[test]
	fn test_clones_share_listeners() {
		let bus = EventBus::new();
		let clone = bus.clone();
		let counter = Arc::new(Mutex::new(0));
		let c = counter.clone();
		clone.subscribe(move |_| *c.lock().unwrap() += 1);

		bus.emit(level_start(0));
		assert_eq!(*counter.lock().unwrap(), 1);
	}
}
