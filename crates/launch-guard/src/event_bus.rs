//! Broadcast channel for guard change notifications.

use launch_types::GuardEvent;
use tokio::sync::broadcast;

/// Fan-out of [`GuardEvent`]s to any number of observers.
///
/// Publishing never fails; events sent while nobody listens are dropped and
/// slow observers see `RecvError::Lagged`.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<GuardEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<GuardEvent> {
		self.sender.subscribe()
	}

	pub fn publish(&self, event: GuardEvent) {
		let _ = self.sender.send(event);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::Address;

	#[tokio::test]
	async fn test_publish_reaches_subscribers() {
		let bus = EventBus::new(8);
		bus.publish(GuardEvent::TrustedSignerRemoved {
			signer: Address::ZERO,
		});

		let mut rx = bus.subscribe();
		let event = GuardEvent::TrustedSignerAdded {
			signer: Address::repeat_byte(1),
		};
		bus.publish(event.clone());
		assert_eq!(rx.recv().await.unwrap(), event);
	}
}
