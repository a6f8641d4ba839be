//! Local in-memory channel for testing and thread-to-thread communication

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;

use tetherwire::Message;

use crate::channel::Channel;
use crate::channel::ChannelId;

type SubscriberList = Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>>;

/// A channel implementation for local, in-memory communication.
/// Routes messages between two endpoints in the same process over unbounded
/// queues, preserving FIFO order per direction.
#[derive(Clone)]
pub struct LocalChannel {
    id: ChannelId,
    // Where our sends land: the peer endpoint's subscribers.
    peer_subscribers: SubscriberList,
    subscribers: SubscriberList,
}

impl LocalChannel {
    /// Create a pair of connected endpoints.
    pub fn pair() -> (Self, Self) {
        let subs_a: SubscriberList = Arc::new(Mutex::new(Vec::new()));
        let subs_b: SubscriberList = Arc::new(Mutex::new(Vec::new()));

        let a = Self {
            id: ChannelId::fresh(),
            peer_subscribers: subs_b.clone(),
            subscribers: subs_a.clone(),
        };
        let b = Self {
            id: ChannelId::fresh(),
            peer_subscribers: subs_a,
            subscribers: subs_b,
        };
        (a, b)
    }
}

impl Channel for LocalChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn send(&self, message: Message) -> anyhow::Result<()> {
        let mut subscribers = self
            .peer_subscribers
            .lock()
            .map_err(|_| anyhow::anyhow!("subscriber list poisoned"))?;
        // A subscriber whose receiver was dropped is pruned here; a message
        // with no subscribers at all is dropped, like postMessage with no
        // listener attached.
        subscribers.retain(|tx| tx.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tetherwire::GetData;
    use tetherwire::Token;

    fn get(key: &str) -> Message {
        Message::Get {
            id: Token::fresh(),
            data: GetData { key: key.into() },
        }
    }

    #[tokio::test]
    async fn test_pair_routes_between_endpoints() {
        let (a, b) = LocalChannel::pair();
        let mut incoming_b = b.subscribe();

        let message = get("x");
        a.send(message.clone()).unwrap();

        assert_eq!(incoming_b.recv().await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_fifo_order_preserved() {
        let (a, b) = LocalChannel::pair();
        let mut incoming_b = b.subscribe();

        let first = get("first");
        let second = get("second");
        a.send(first.clone()).unwrap();
        a.send(second.clone()).unwrap();

        assert_eq!(incoming_b.recv().await.unwrap(), first);
        assert_eq!(incoming_b.recv().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_fan_out_and_detach() {
        let (a, b) = LocalChannel::pair();
        let mut one = b.subscribe();
        let two = b.subscribe();

        // Dropping a receiver detaches that handler; the other still sees
        // every message.
        drop(two);
        let message = get("x");
        a.send(message.clone()).unwrap();
        a.send(message.clone()).unwrap();

        assert_eq!(one.recv().await.unwrap(), message);
        assert_eq!(one.recv().await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_endpoints_have_distinct_ids() {
        let (a, b) = LocalChannel::pair();
        assert_ne!(a.id(), b.id());
    }
}
