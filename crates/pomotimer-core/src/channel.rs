//! Single-writer, multi-reader state channel.
//!
//! The engine is the only publisher. Observers attach and detach freely;
//! publishing with zero observers is not an error. Alongside the event
//! stream the channel keeps the most recent snapshot, so a late subscriber
//! can resync without waiting for the next tick.

use tokio::sync::{broadcast, watch};

use crate::events::Event;
use crate::timer::Snapshot;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct StateChannel {
    events: broadcast::Sender<Event>,
    latest: watch::Sender<Snapshot>,
}

impl StateChannel {
    pub fn new(initial: Snapshot) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (latest, _) = watch::channel(initial);
        Self { events, latest }
    }

    /// Broadcast `event`. Snapshots also become the resync value.
    pub fn publish(&self, event: Event) {
        if let Some(snapshot) = event.as_snapshot() {
            self.latest.send_replace(snapshot.clone());
        }
        // Err only means nobody is listening right now.
        let _ = self.events.send(event);
    }

    pub fn publish_snapshot(&self, snapshot: Snapshot) {
        self.publish(Event::StateSnapshot(snapshot));
    }

    pub fn latest(&self) -> Snapshot {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            events: self.events.subscribe(),
            latest: self.latest.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

/// One observer's view of the channel.
#[derive(Debug)]
pub struct Subscription {
    events: broadcast::Receiver<Event>,
    latest: watch::Receiver<Snapshot>,
}

impl Subscription {
    /// The snapshot the most recent publish carried.
    pub fn resync(&self) -> Snapshot {
        self.latest.borrow().clone()
    }

    /// Next event, or `None` once the engine is gone.
    ///
    /// A subscriber that fell behind skips the events it missed, including
    /// the stale ones still buffered, and gets the current snapshot instead.
    pub async fn recv(&mut self) -> Option<Event> {
        match self.events.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => Some(self.catch_up(missed)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing
    /// is queued.
    pub fn try_recv(&mut self) -> Option<Event> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => Some(self.catch_up(missed)),
            Err(_) => None,
        }
    }

    /// Discard everything buffered behind a lag and resync. The receiver
    /// restarts at the oldest retained event, which is already out of date.
    fn catch_up(&mut self, missed: u64) -> Event {
        let mut stale = 0usize;
        loop {
            match self.events.try_recv() {
                Ok(_) => stale += 1,
                Err(broadcast::error::TryRecvError::Lagged(more)) => {
                    stale = stale.saturating_add(usize::try_from(more).unwrap_or(usize::MAX));
                }
                Err(_) => break,
            }
        }
        tracing::warn!(missed, stale, "state subscriber lagged, resyncing");
        Event::StateSnapshot(self.resync())
    }

    /// Drain everything currently queued.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
