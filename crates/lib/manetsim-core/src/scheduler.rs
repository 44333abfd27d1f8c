use std::cmp::Reverse;
use std::fmt;

use keyed_priority_queue::KeyedPriorityQueue;
use log::debug;
use typed_builder::TypedBuilder;

use crate::bucket::{Bucket, TimeUS};
use crate::error::ConfigError;
use crate::hashbrown::HashMap;

/// Handle of a scheduled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    at: TimeUS,
    seq: u64,
}

/// A virtual-time event queue. Events pop in non-decreasing time order; events at the same
/// time pop in the order they were scheduled.
pub struct EventQueue<E> {
    queue: KeyedPriorityQueue<EventId, Reverse<EventKey>>,
    events: HashMap<EventId, E>,
    next_seq: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            queue: KeyedPriorityQueue::new(),
            events: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: TimeUS, event: E) -> EventId {
        let event_id = EventId(self.next_seq);
        let key = EventKey {
            at,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.push(event_id, Reverse(key));
        self.events.insert(event_id, event);
        event_id
    }

    pub fn peek_time(&self) -> Option<TimeUS> {
        self.queue.peek().map(|(_, key)| key.0.at)
    }

    pub fn pop(&mut self) -> Option<(TimeUS, E)> {
        let (event_id, key) = self.queue.pop()?;
        let event = self.events.remove(&event_id)?;
        Some((key.0.at, event))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops every outstanding event and returns how many were dropped.
    pub fn retire_all(&mut self) -> usize {
        let retired = self.events.len();
        self.queue = KeyedPriorityQueue::new();
        self.events.clear();
        retired
    }
}

/// A trait used to represent a scheduler. The order of calling the scheduler's functions is
/// important: `initialize` once, `trigger` until it returns `None`, then `terminate`.
pub trait Scheduler<B: Bucket> {
    fn duration(&self) -> TimeUS;
    fn initialize(&mut self) -> Result<(), ConfigError>;
    fn trigger(&mut self) -> Result<Option<TimeUS>, ConfigError>;
    fn terminate(self) -> B;
}

#[derive(TypedBuilder)]
pub struct DefaultScheduler<B>
where
    B: Bucket,
{
    pub bucket: B,
    pub duration: TimeUS,
    #[builder(default)]
    pub queue: EventQueue<B::Event>,
    #[builder(default = TimeUS::default())]
    pub now: TimeUS,
}

impl<B> Scheduler<B> for DefaultScheduler<B>
where
    B: Bucket,
{
    fn duration(&self) -> TimeUS {
        self.duration
    }

    fn initialize(&mut self) -> Result<(), ConfigError> {
        self.bucket.initialize(&mut self.queue)
    }

    /// Executes the next event. Returns `None` once the queue is drained or the next event
    /// lies beyond the run duration.
    fn trigger(&mut self) -> Result<Option<TimeUS>, ConfigError> {
        match self.queue.peek_time() {
            Some(at) if at <= self.duration => {}
            _ => return Ok(None),
        }
        let (at, event) = match self.queue.pop() {
            Some(next) => next,
            None => return Ok(None),
        };
        self.now = at;
        self.bucket.handle(at, event, &mut self.queue)?;
        Ok(Some(self.now))
    }

    fn terminate(mut self) -> B {
        let retired = self.queue.retire_all();
        debug!("Retired {} outstanding events at {}", retired, self.now);
        self.bucket.terminate(self.duration);
        self.bucket
    }
}
