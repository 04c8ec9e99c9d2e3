//! The presence counter: one integer plus the set of subscribers it is pushed to.
use std::collections::BTreeMap;

use presence_map::protocol::ChannelMessage;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::error::{Result, ServerError};

pub type SubscriberId = u64;

/// Receiver of count payloads.
pub trait Subscriber {
    /// Queues `payload` for delivery. Must not block.
    fn send(&mut self, payload: &str) -> Result<()>;
}

impl Subscriber for UnboundedSender<String> {
    fn send(&mut self, payload: &str) -> Result<()> {
        UnboundedSender::send(self, payload.to_owned()).map_err(|_| ServerError::SubscriberGone)
    }
}

impl<S: Subscriber + ?Sized> Subscriber for Box<S> {
    fn send(&mut self, payload: &str) -> Result<()> {
        (**self).send(payload)
    }
}

/// Counts connected subscribers and broadcasts every change to all of them.
///
/// The count increments on connect and decrements, floored at zero, on disconnect.
/// A failed send to one subscriber never prevents delivery to the others.
#[derive(Debug)]
pub struct PresenceCounter<S> {
    online: u64,
    next_id: SubscriberId,
    subscribers: BTreeMap<SubscriberId, S>,
}

impl<S> Default for PresenceCounter<S> {
    fn default() -> Self {
        Self {
            online: 0,
            next_id: 1,
            subscribers: BTreeMap::new(),
        }
    }
}

impl<S: Subscriber> PresenceCounter<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn online(&self) -> u64 {
        self.online
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Registers `subscriber`, increments the count and broadcasts it, the new
    /// subscriber included.
    pub fn connect(&mut self, subscriber: S) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, subscriber);
        self.online += 1;
        debug!(id, online = self.online, "subscriber connected");
        self.broadcast();
        id
    }

    /// Removes the subscriber, decrements the count and broadcasts it to the rest.
    /// Unknown ids leave the count untouched.
    pub fn disconnect(&mut self, id: SubscriberId) -> u64 {
        if self.subscribers.remove(&id).is_none() {
            debug!(id, "ignoring disconnect of unknown subscriber");
            return self.online;
        }
        self.online = self.online.saturating_sub(1);
        debug!(id, online = self.online, "subscriber disconnected");
        self.broadcast();
        self.online
    }

    /// Sends the current count to every subscriber. Returns the number of successful sends.
    pub fn broadcast(&mut self) -> usize {
        let payload = match ChannelMessage::count(self.online).to_json() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(online = self.online, %err, "cannot encode count");
                return 0;
            }
        };
        let mut delivered = 0;
        for (id, subscriber) in self.subscribers.iter_mut() {
            match subscriber.send(&payload) {
                Ok(()) => delivered += 1,
                Err(err) => debug!(id, %err, "dropping count for subscriber"),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use presence_map::protocol::parse_count;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use super::*;

    fn received(rx: &mut UnboundedReceiver<String>) -> Vec<u64> {
        let mut out = Vec::new();
        while let Ok(payload) = rx.try_recv() {
            out.push(parse_count(&payload).expect("count payload"));
        }
        out
    }

    /// Subscriber whose sends always fail.
    struct Broken;

    impl Subscriber for Broken {
        fn send(&mut self, _payload: &str) -> Result<()> {
            Err(ServerError::SubscriberGone)
        }
    }

    #[test]
    fn three_connects_then_one_disconnect() {
        let mut counter = PresenceCounter::new();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        let (tx3, mut rx3) = unbounded_channel();

        counter.connect(tx1);
        counter.connect(tx2);
        let third = counter.connect(tx3);
        assert_eq!(counter.disconnect(third), 2);

        assert_eq!(received(&mut rx1), vec![1, 2, 3, 2]);
        assert_eq!(received(&mut rx2), vec![2, 3, 2]);
        assert_eq!(received(&mut rx3), vec![3]);
        assert_eq!(counter.subscriber_count(), 2);
    }

    #[test]
    fn count_tracks_connects_minus_disconnects() {
        let mut counter = PresenceCounter::new();
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        let mut expected: u64 = 0;

        for step in 0..40u32 {
            if step % 3 == 2 {
                if let Some(id) = ids.pop() {
                    counter.disconnect(id);
                    expected = expected.saturating_sub(1);
                }
            } else {
                let (tx, rx) = unbounded_channel();
                ids.push(counter.connect(tx));
                receivers.push(rx);
                expected += 1;
            }
            assert_eq!(counter.online(), expected);
        }
    }

    #[test]
    fn unknown_disconnect_does_not_go_below_zero() {
        let mut counter: PresenceCounter<UnboundedSender<String>> = PresenceCounter::new();
        assert_eq!(counter.disconnect(7), 0);
        let (tx, mut rx) = unbounded_channel();
        let id = counter.connect(tx);
        assert_eq!(counter.disconnect(id), 0);
        assert_eq!(counter.disconnect(id), 0);
        assert_eq!(received(&mut rx), vec![1]);
    }

    #[test]
    fn failing_subscriber_does_not_block_others() {
        let mut counter: PresenceCounter<Box<dyn Subscriber>> = PresenceCounter::new();
        let (tx, mut rx) = unbounded_channel();
        counter.connect(Box::new(Broken));
        counter.connect(Box::new(tx));

        assert_eq!(counter.broadcast(), 1);
        assert_eq!(received(&mut rx), vec![2, 2]);
    }

    #[test]
    fn closed_receiver_is_a_failed_send() {
        let mut counter = PresenceCounter::new();
        let (tx, rx) = unbounded_channel::<String>();
        drop(rx);
        counter.connect(tx);
        assert_eq!(counter.broadcast(), 0);
        assert_eq!(counter.online(), 1);
    }
}
