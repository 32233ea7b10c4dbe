use crate::middleware::Delivery;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// what happened to a pushed delivery.
#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// queued after evicting the oldest pending message of the same topic
    DroppedOldest,
    /// nobody subscribed to the topic, the delivery was discarded
    NotSubscribed,
}

#[derive(Debug, Default)]
struct TopicSlot {
    depth: usize,
    pending: usize,
}

#[derive(Debug, Default)]
struct InboxState {
    deliveries: VecDeque<Delivery>,
    topics: HashMap<String, TopicSlot>,
    closed: bool,
}

/// Pending deliveries of every subscription in arrival order.
///
/// Each topic holds at most `depth` pending messages; pushing onto a full
/// topic evicts that topic's oldest message.
#[derive(Debug, Default)]
pub struct Inbox {
    state: Mutex<InboxState>,
    notify: Notify,
}

impl Inbox {
    fn state(&self) -> MutexGuard<'_, InboxState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// returns false if the topic already had a queue, the old depth is kept.
    pub fn add_topic(&self, topic: &str, depth: usize) -> bool {
        let mut state = self.state();
        if state.topics.contains_key(topic) {
            return false;
        }
        state
            .topics
            .insert(topic.to_string(), TopicSlot { depth, pending: 0 });
        true
    }

    /// forgets the topic along with its pending deliveries.
    pub fn remove_topic(&self, topic: &str) {
        let mut state = self.state();
        state.topics.remove(topic);
        state.deliveries.retain(|d| d.topic != topic);
    }

    pub fn push(&self, delivery: Delivery) -> PushOutcome {
        let mut state = self.state();
        let state = &mut *state;
        let Some(slot) = state.topics.get_mut(&delivery.topic) else {
            return PushOutcome::NotSubscribed;
        };

        let mut outcome = PushOutcome::Queued;
        if slot.pending >= slot.depth {
            if let Some(pos) = state
                .deliveries
                .iter()
                .position(|d| d.topic == delivery.topic)
            {
                state.deliveries.remove(pos);
                slot.pending -= 1;
            }
            outcome = PushOutcome::DroppedOldest;
        }
        slot.pending += 1;
        state.deliveries.push_back(delivery);
        self.notify.notify_one();
        outcome
    }

    /// no more deliveries will be pushed, waiting consumers are released once
    /// the pending ones are drained.
    pub fn close(&self) {
        self.state().closed = true;
        self.notify.notify_one();
    }

    /// waits for the oldest pending delivery, `None` once closed and drained.
    pub async fn pop(&self) -> Option<Delivery> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state();
                if let Some(delivery) = state.deliveries.pop_front() {
                    if let Some(slot) = state.topics.get_mut(&delivery.topic) {
                        slot.pending = slot.pending.saturating_sub(1);
                    }
                    return Some(delivery);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }
}
