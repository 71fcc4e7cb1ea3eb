use std::time::Duration;

use async_trait::async_trait;

/// What kind of work a service call performs, used to pick its artificial delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// Single-record read.
    Lookup,
    /// Single-flag flip (like, save, viewed).
    Toggle,
    /// Whole-collection read or filter.
    Scan,
    /// Create, update or delete.
    Write,
}

/// Stand-in for the round trip of a remote backend. Every service call awaits
/// it before touching the store.
#[async_trait]
pub trait Latency {
    async fn pause(&self, call: Call);
}

pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn pause(&self, _: Call) {}
}

/// `short` for lookups and toggles, `long` for scans and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLatency {
    pub short: Duration,
    pub long: Duration,
}

impl FixedLatency {
    pub fn of(&self, call: Call) -> Duration {
        match call {
            Call::Lookup | Call::Toggle => self.short,
            Call::Scan | Call::Write => self.long,
        }
    }
}

#[async_trait]
impl Latency for FixedLatency {
    async fn pause(&self, call: Call) {
        let d = self.of(call);
        tracing::trace!("simulated latency - {:?} {:?}", call, d);

        tokio::time::sleep(d).await
    }
}
