// Worker Registry Port
// Abstraction over the job queue's record of live workers

use crate::domain::{Worker, WorkerId};
use async_trait::async_trait;
use thiserror::Error;

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Registry query failed: {0}")]
    Query(String),

    #[error("Failed to deregister worker {id}: {reason}")]
    Deregister { id: WorkerId, reason: String },
}

/// Worker Registry trait
///
/// Implementations:
/// - ResqueRegistry: Resque's worker set in Redis
#[async_trait]
pub trait WorkerRegistry: Send + Sync {
    /// List every registered worker with its queue subscriptions
    ///
    /// # Errors
    /// - RegistryError::Unavailable if the backing store cannot be reached
    /// - RegistryError::Query if the listing itself fails
    async fn list_workers(&self) -> Result<Vec<Worker>, RegistryError>;

    /// Remove a worker from the registry
    ///
    /// Deregistering an id that is no longer registered is not an error.
    async fn deregister(&self, id: &WorkerId) -> Result<(), RegistryError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory registry for testing
    #[derive(Default)]
    pub struct MockWorkerRegistry {
        workers: Arc<Mutex<Vec<Worker>>>,
        deregistered: Arc<Mutex<Vec<WorkerId>>>,
        failure: Arc<Mutex<Option<String>>>,
        list_calls: Arc<Mutex<usize>>,
    }

    impl MockWorkerRegistry {
        pub fn new(workers: Vec<Worker>) -> Self {
            Self {
                workers: Arc::new(Mutex::new(workers)),
                ..Default::default()
            }
        }

        pub fn empty() -> Self {
            Self::default()
        }

        pub fn register(&self, worker: Worker) {
            self.workers.lock().unwrap().push(worker);
        }

        /// Make every following call fail with `RegistryError::Unavailable`
        pub fn fail_with(&self, message: impl Into<String>) {
            *self.failure.lock().unwrap() = Some(message.into());
        }

        pub fn workers(&self) -> Vec<Worker> {
            self.workers.lock().unwrap().clone()
        }

        pub fn deregistered(&self) -> Vec<WorkerId> {
            self.deregistered.lock().unwrap().clone()
        }

        pub fn list_calls(&self) -> usize {
            *self.list_calls.lock().unwrap()
        }

        fn check_failure(&self) -> Result<(), RegistryError> {
            match self.failure.lock().unwrap().clone() {
                Some(message) => Err(RegistryError::Unavailable(message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl WorkerRegistry for MockWorkerRegistry {
        async fn list_workers(&self) -> Result<Vec<Worker>, RegistryError> {
            *self.list_calls.lock().unwrap() += 1;
            self.check_failure()?;
            Ok(self.workers.lock().unwrap().clone())
        }

        async fn deregister(&self, id: &WorkerId) -> Result<(), RegistryError> {
            self.check_failure()?;
            self.workers.lock().unwrap().retain(|w| &w.id != id);
            self.deregistered.lock().unwrap().push(id.clone());
            Ok(())
        }
    }
}
