// Worker Domain Model
// A worker is owned by the queue's registry; the director only reads it.

use super::queue::QueueName;
use std::fmt;

/// Worker identity as stored in the registry
///
/// Resque encodes it as `host:pid:queue1,queue2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host segment of a Resque-style id
    pub fn host(&self) -> Option<&str> {
        self.0.split(':').next().filter(|h| !h.is_empty())
    }

    /// Pid segment of a Resque-style id
    pub fn pid(&self) -> Option<u32> {
        self.0.split(':').nth(1).and_then(|p| p.parse().ok())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A running worker process and the queues it pulls from
///
/// `queues` keeps the registry's order and any repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    pub id: WorkerId,
    pub queues: Vec<QueueName>,
}

impl Worker {
    pub fn new<I, Q>(id: impl Into<String>, queues: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<QueueName>,
    {
        Self {
            id: WorkerId::new(id),
            queues: queues.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a Resque worker id (`host:pid:q1,q2`)
    ///
    /// Returns `None` when the id lacks any of the three segments.
    pub fn parse_resque(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        parts.next().filter(|host| !host.is_empty())?;
        parts.next().filter(|pid| !pid.is_empty())?;
        let queues = parts.next()?;

        let queues: Vec<QueueName> = queues
            .split(',')
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self {
            id: WorkerId::new(raw),
            queues,
        })
    }

    /// True only when the worker's queue list is exactly `[queue]`
    ///
    /// A worker that also serves other queues, or lists `queue` twice, is
    /// not counted towards the fleet of `queue`.
    pub fn is_dedicated_to(&self, queue: &str) -> bool {
        matches!(self.queues.as_slice(), [only] if only == queue)
    }
}

/// Workers from `workers` dedicated to `queue`, in registry order
pub fn dedicated_to<'a>(workers: &'a [Worker], queue: &'a str) -> impl Iterator<Item = &'a Worker> {
    workers.iter().filter(move |w| w.is_dedicated_to(queue))
}
