use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use arcade_engine::{EngineBootError, RenderEngine};

type BootResult = Result<Arc<RenderEngine>, Arc<EngineBootError>>;
type BootFuture = Shared<BoxFuture<'static, BootResult>>;
type BootFn = Arc<dyn Fn() -> BoxFuture<'static, Result<RenderEngine, EngineBootError>> + Send + Sync>;

enum EngineSlot {
    Unloaded,
    Loading(BootFuture),
    Loaded(Arc<RenderEngine>),
    Failed,
}

/// Process-wide lazy loader for the shared 3D engine.
///
/// The engine boot is expensive, so it runs at most once per process no
/// matter how many games ask for it concurrently: the first caller starts
/// the boot and everyone else awaits the same shared future. A failed boot
/// is not cached forever; the next request starts a fresh attempt.
pub struct EngineLoader {
    slot: Mutex<EngineSlot>,
    boot: BootFn,
}

impl Default for EngineLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineLoader {
    pub fn new() -> Self {
        Self::with_boot(Arc::new(|| RenderEngine::boot().boxed()))
    }

    /// Loader with an injected boot routine. Host code uses `new`; this
    /// exists so tests can count boots and force failures.
    pub fn with_boot(boot: BootFn) -> Self {
        Self {
            slot: Mutex::new(EngineSlot::Unloaded),
            boot,
        }
    }

    /// Resolve the shared engine, booting it on first use.
    pub async fn ensure_loaded(&self) -> BootResult {
        let shared = {
            let mut slot = self.lock();
            match &*slot {
                EngineSlot::Loaded(engine) => return Ok(Arc::clone(engine)),
                EngineSlot::Loading(inflight) => inflight.clone(),
                EngineSlot::Unloaded | EngineSlot::Failed => {
                    if matches!(*slot, EngineSlot::Failed) {
                        tracing::info!("retrying 3D engine boot after earlier failure");
                    }
                    let boot = Arc::clone(&self.boot);
                    let fut = async move { boot().await.map(Arc::new).map_err(Arc::new) }
                        .boxed()
                        .shared();
                    *slot = EngineSlot::Loading(fut.clone());
                    fut
                },
            }
        };

        let result = shared.clone().await;

        let mut slot = self.lock();
        // Only the attempt we awaited may record its outcome; a newer
        // attempt may already occupy the slot.
        if let EngineSlot::Loading(current) = &*slot {
            if current.ptr_eq(&shared) {
                *slot = match &result {
                    Ok(engine) => EngineSlot::Loaded(Arc::clone(engine)),
                    Err(err) => {
                        tracing::warn!(error = %err, "3D engine boot failed");
                        EngineSlot::Failed
                    },
                };
            }
        }
        result
    }

    /// Whether a previous `ensure_loaded` already succeeded.
    pub fn is_loaded(&self) -> bool {
        matches!(*self.lock(), EngineSlot::Loaded(_))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineSlot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loader(boots: Arc<AtomicUsize>, fail_first: usize) -> EngineLoader {
        EngineLoader::with_boot(Arc::new(move || {
            let attempt = boots.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < fail_first {
                    Err(EngineBootError::Interrupted("test failure".into()))
                } else {
                    RenderEngine::boot().await
                }
            }
            .boxed()
        }))
    }

    #[tokio::test]
    async fn concurrent_requests_boot_once() {
        let boots = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(counting_loader(Arc::clone(&boots), 0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let loader = Arc::clone(&loader);
            tasks.push(tokio::spawn(async move { loader.ensure_loaded().await }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(boots.load(Ordering::SeqCst), 1);
        assert!(loader.is_loaded());
    }

    #[tokio::test]
    async fn loaded_engine_is_reused() {
        let boots = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(Arc::clone(&boots), 0);

        let first = loader.ensure_loaded().await.unwrap();
        let second = loader.ensure_loaded().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(boots.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_boot_is_retried() {
        let boots = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(Arc::clone(&boots), 1);

        let first = loader.ensure_loaded().await;
        assert!(first.is_err());
        assert!(!loader.is_loaded());

        let second = loader.ensure_loaded().await;
        assert!(second.is_ok(), "second attempt should boot fresh");
        assert_eq!(boots.load(Ordering::SeqCst), 2);
        assert!(loader.is_loaded());
    }

    #[tokio::test]
    async fn failure_is_shared_not_multiplied() {
        let boots = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(counting_loader(Arc::clone(&boots), 8));

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let loader = Arc::clone(&loader);
            tasks.push(tokio::spawn(async move { loader.ensure_loaded().await }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_err());
        }
        // All four callers raced the same first attempt, then at most a few
        // fresh retries; never one boot per caller per poll.
        assert!(boots.load(Ordering::SeqCst) <= 4);
    }
}
