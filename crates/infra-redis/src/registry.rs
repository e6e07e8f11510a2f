// Resque worker registry over Redis

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use std::fmt;
use tracing::{debug, info, warn};

use director_core::domain::{Worker, WorkerId};
use director_core::port::worker_registry::{RegistryError, WorkerRegistry};

use crate::keys::ResqueKeys;
use crate::signal::{local_hostname, quit_worker, QuitOutcome};

/// Reads and prunes the worker set a Resque deployment keeps in Redis
///
/// Workers running on this host are sent `QUIT` before their entry is
/// removed. Workers on other hosts only lose their registry entry.
#[derive(Clone)]
pub struct ResqueRegistry {
    conn: ConnectionManager,
    keys: ResqueKeys,
    local_host: Option<String>,
}

impl fmt::Debug for ResqueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResqueRegistry")
            .field("connection", &"ConnectionManager")
            .field("namespace", &self.keys.namespace())
            .field("local_host", &self.local_host)
            .finish()
    }
}

impl ResqueRegistry {
    /// Connect to Redis at `redis_url`, using Resque's `namespace`
    pub async fn connect(redis_url: &str, namespace: &str) -> Result<Self, RegistryError> {
        info!(redis_url = %redis_url, namespace = %namespace, "Connecting to Resque registry");

        let client = redis::Client::open(redis_url)
            .map_err(|e| RegistryError::Unavailable(format!("Failed to create Redis client: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| RegistryError::Unavailable(format!("Failed to connect to Redis: {e}")))?;

        let local_host = local_hostname();
        if local_host.is_none() {
            warn!("Hostname unavailable, scale down will not signal worker processes");
        }
        info!(local_host = ?local_host, "Connected to Resque registry");

        Ok(Self {
            conn,
            keys: ResqueKeys::new(namespace),
            local_host,
        })
    }

    pub fn keys(&self) -> &ResqueKeys {
        &self.keys
    }
}

#[async_trait]
impl WorkerRegistry for ResqueRegistry {
    async fn list_workers(&self) -> Result<Vec<Worker>, RegistryError> {
        let key = self.keys.workers();
        debug!(key = %key, "Registry SMEMBERS");

        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .smembers(key.as_str())
            .await
            .map_err(|e| query_error("SMEMBERS", e))?;

        Ok(parse_worker_ids(ids))
    }

    async fn deregister(&self, id: &WorkerId) -> Result<(), RegistryError> {
        debug!(worker_id = %id, "Registry deregister");

        report_quit(id, &quit_worker(id, self.local_host.as_deref()));

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .srem(self.keys.workers(), id.as_str())
            .ignore()
            .del(self.keys.worker(id))
            .ignore()
            .del(self.keys.started(id))
            .ignore()
            .del(self.keys.processed_stat(id))
            .ignore()
            .del(self.keys.failed_stat(id))
            .ignore()
            .hdel(self.keys.heartbeats(), id.as_str())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| RegistryError::Deregister {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        info!(worker_id = %id, "Worker deregistered");
        Ok(())
    }
}

fn report_quit(id: &WorkerId, outcome: &QuitOutcome) {
    match outcome {
        QuitOutcome::Signalled(pid) => info!(worker_id = %id, pid = pid, "Sent QUIT to worker"),
        QuitOutcome::AlreadyGone(pid) => debug!(worker_id = %id, pid = pid, "Worker process already exited"),
        QuitOutcome::Remote => warn!(
            worker_id = %id,
            "Worker runs on another host, removing its registry entry only"
        ),
        QuitOutcome::Unaddressable => warn!(worker_id = %id, "Worker id has no usable pid, removing its registry entry only"),
        QuitOutcome::Failed(reason) => warn!(worker_id = %id, reason = %reason, "Failed to send QUIT to worker"),
    }
}

fn query_error(command: &str, e: RedisError) -> RegistryError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
        RegistryError::Unavailable(format!("Redis {command} failed: {e}"))
    } else {
        RegistryError::Query(format!("Redis {command} failed: {e}"))
    }
}

/// Parse raw worker ids, skipping malformed entries
///
/// Output is sorted by id so repeated listings are stable.
fn parse_worker_ids(ids: Vec<String>) -> Vec<Worker> {
    let mut workers: Vec<Worker> = ids
        .into_iter()
        .filter_map(|raw| {
            let worker = Worker::parse_resque(&raw);
            if worker.is_none() {
                warn!(worker_id = %raw, "Skipping malformed worker id");
            }
            worker
        })
        .collect();

    workers.sort_by(|a, b| a.id.cmp(&b.id));
    workers
}
