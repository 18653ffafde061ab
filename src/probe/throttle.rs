use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A permit that holds both global and per-host semaphore permits.
pub struct ThrottlePermit {
    _global: OwnedSemaphorePermit,
    _host: OwnedSemaphorePermit,
}

/// Caps in-flight requests overall and per host.
pub struct Throttle {
    global: Arc<Semaphore>,
    per_host: DashMap<String, Arc<Semaphore>>,
    default_per_host: usize,
}

impl Throttle {
    pub fn new(global_limit: usize, default_per_host: usize) -> Self {
        Self {
            global: Arc::new(Semaphore::new(global_limit.max(1))),
            per_host: DashMap::new(),
            default_per_host: default_per_host.max(1),
        }
    }

    fn host_semaphore(&self, host: &str) -> Arc<Semaphore> {
        self.per_host
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.default_per_host)))
            .value()
            .clone()
    }

    pub async fn acquire(&self, host: &str) -> anyhow::Result<ThrottlePermit> {
        let host_sem = self.host_semaphore(host);
        // Host first: a busy host must not park global slots while it waits
        let hperm = host_sem.acquire_owned().await?;
        let gperm = self.global.clone().acquire_owned().await?;
        Ok(ThrottlePermit { _global: gperm, _host: hperm })
    }

    /// Requests currently allowed to start against `host`.
    #[cfg(test)]
    pub fn available_for(&self, host: &str) -> usize {
        self.host_semaphore(host).available_permits().min(self.global.available_permits())
    }
}
