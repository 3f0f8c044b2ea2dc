//! Raw sample delivery: the subscription contract and the audio-fed tap

use crate::meter::Channel;
use log::{debug, warn};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Handle for one channel's sample subscription.
///
/// Not `Clone`: handing it back to [`SampleSource::unsubscribe`] consumes it,
/// so a subscription can only be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    channel: Channel,
    id: u64,
}

impl Subscription {
    pub fn new(channel: Channel, id: u64) -> Self {
        Self { channel, id }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Something that reports raw peak levels per channel
pub trait SampleSource {
    fn subscribe(&mut self, channel: Channel) -> Subscription;
    fn unsubscribe(&mut self, subscription: Subscription);
}

/// A raw peak reading for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub channel: Channel,
    pub level: f32,
}

/// Subscription table shared with the audio callback
#[derive(Debug, Default)]
struct Listeners {
    active: [Option<u64>; 3],
}

/// Sample source fed from the audio input stream.
///
/// The audio thread publishes through a [`TapPublisher`]; samples for
/// subscribed channels arrive in order on the receiver returned by
/// [`InputTap::new`].
pub struct InputTap {
    listeners: Arc<Mutex<Listeners>>,
    sender: UnboundedSender<Sample>,
    next_id: u64,
}

impl InputTap {
    pub fn new() -> (Self, UnboundedReceiver<Sample>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tap = Self {
            listeners: Arc::new(Mutex::new(Listeners::default())),
            sender,
            next_id: 1,
        };
        (tap, receiver)
    }

    /// Get a publishing handle for the audio thread
    pub fn publisher(&self) -> TapPublisher {
        TapPublisher {
            listeners: Arc::clone(&self.listeners),
            sender: self.sender.clone(),
        }
    }

    pub fn is_subscribed(&self, channel: Channel) -> bool {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.active[channel.index()].is_some()
    }
}

impl SampleSource for InputTap {
    fn subscribe(&mut self, channel: Channel) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;

        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = listeners.active[channel.index()].replace(id) {
            warn!("{} subscription {} replaced by {}", channel, previous, id);
        }
        debug!("{} subscribed ({})", channel, id);
        Subscription::new(channel, id)
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = &mut listeners.active[subscription.channel().index()];
        if *slot == Some(subscription.id()) {
            *slot = None;
            debug!("{} unsubscribed ({})", subscription.channel(), subscription.id());
        } else {
            warn!(
                "Ignoring stale {} subscription {}",
                subscription.channel(),
                subscription.id()
            );
        }
    }
}

/// Audio-thread side of an [`InputTap`]
#[derive(Clone)]
pub struct TapPublisher {
    listeners: Arc<Mutex<Listeners>>,
    sender: UnboundedSender<Sample>,
}

impl TapPublisher {
    /// Publish one channel's peak if anyone is listening
    pub fn publish(&self, channel: Channel, level: f32) {
        let subscribed = {
            let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.active[channel.index()].is_some()
        };
        if subscribed {
            // The receiver is gone once the app loop has shut down
            let _ = self.sender.send(Sample { channel, level });
        }
    }

    /// Publish the left and right peaks of one buffer, plus the master
    /// reading as their mean
    pub fn publish_frame(&self, left: f32, right: f32) {
        self.publish(Channel::Left, left);
        self.publish(Channel::Right, right);
        self.publish(Channel::Master, (left + right) / 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_subscribed_channels_are_delivered() {
        let (mut tap, mut rx) = InputTap::new();
        let publisher = tap.publisher();
        let _master = tap.subscribe(Channel::Master);

        publisher.publish_frame(0.4, 0.8);

        let sample = rx.try_recv().unwrap();
        assert_eq!(sample.channel, Channel::Master);
        assert!((sample.level - 0.6).abs() < 1e-6);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let (mut tap, mut rx) = InputTap::new();
        let publisher = tap.publisher();
        let subscriptions: Vec<_> = Channel::ALL.iter().map(|&c| tap.subscribe(c)).collect();
        assert_eq!(subscriptions.len(), 3);

        publisher.publish_frame(0.1, 0.2);
        publisher.publish_frame(0.3, 0.4);

        let channels: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|s| s.channel)
            .collect();
        assert_eq!(
            channels,
            vec![
                Channel::Left,
                Channel::Right,
                Channel::Master,
                Channel::Left,
                Channel::Right,
                Channel::Master
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (mut tap, mut rx) = InputTap::new();
        let publisher = tap.publisher();
        let left = tap.subscribe(Channel::Left);
        assert!(tap.is_subscribed(Channel::Left));

        tap.unsubscribe(left);
        assert!(!tap.is_subscribed(Channel::Left));

        publisher.publish(Channel::Left, 0.5);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stale_subscription_does_not_release_newer_one() {
        let (mut tap, _rx) = InputTap::new();
        let old = tap.subscribe(Channel::Right);
        let newer = tap.subscribe(Channel::Right);
        assert_ne!(old.id(), newer.id());

        tap.unsubscribe(old);
        assert!(tap.is_subscribed(Channel::Right));
        tap.unsubscribe(newer);
        assert!(!tap.is_subscribed(Channel::Right));
    }

    #[test]
    fn test_publish_after_receiver_dropped_is_harmless() {
        let (mut tap, rx) = InputTap::new();
        let publisher = tap.publisher();
        let _left = tap.subscribe(Channel::Left);
        drop(rx);
        publisher.publish(Channel::Left, 0.9);
    }
}
