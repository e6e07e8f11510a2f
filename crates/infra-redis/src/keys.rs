// Resque key layout

use director_core::domain::WorkerId;

/// Namespace Resque prefixes its keys with unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "resque";

/// Builds the Redis keys Resque uses for worker bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResqueKeys {
    namespace: String,
}

impl ResqueKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Set of registered worker ids
    pub fn workers(&self) -> String {
        format!("{}:workers", self.namespace)
    }

    /// Hash of worker id to last heartbeat
    pub fn heartbeats(&self) -> String {
        format!("{}:workers:heartbeat", self.namespace)
    }

    /// Job the worker is currently processing
    pub fn worker(&self, id: &WorkerId) -> String {
        format!("{}:worker:{}", self.namespace, id)
    }

    pub fn started(&self, id: &WorkerId) -> String {
        format!("{}:worker:{}:started", self.namespace, id)
    }

    pub fn processed_stat(&self, id: &WorkerId) -> String {
        format!("{}:stat:processed:{}", self.namespace, id)
    }

    pub fn failed_stat(&self, id: &WorkerId) -> String {
        format!("{}:stat:failed:{}", self.namespace, id)
    }
}

impl Default for ResqueKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
