use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

/// One resource registered during a module's `start`: a spawned loop task
/// or an arbitrary teardown closure.
enum Resource {
    Task(JoinHandle<()>),
    Teardown(Box<dyn FnOnce() + Send>),
}

/// Accumulates every resource a module acquires while mounting — loop
/// tasks, subscriptions, scene teardowns — so one generic routine can
/// release them all instead of each game hand-rolling its own closure.
#[derive(Default)]
pub struct ResourceBag {
    resources: Vec<Resource>,
}

impl ResourceBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the module's loop task; invoking the handle aborts it.
    pub fn register_task(&mut self, handle: JoinHandle<()>) {
        self.resources.push(Resource::Task(handle));
    }

    /// Register an arbitrary teardown closure, run exactly once.
    pub fn register<F: FnOnce() + Send + 'static>(&mut self, teardown: F) {
        self.resources.push(Resource::Teardown(Box::new(teardown)));
    }

    /// Seal the bag into the idempotent handle returned from `start`.
    pub fn into_handle(self) -> CleanupHandle {
        CleanupHandle {
            resources: Arc::new(Mutex::new(self.resources)),
        }
    }
}

/// The zero-argument teardown a module returns from `start`.
///
/// Idempotent: the first invocation drains the resource list, aborting the
/// loop task and running teardown closures in registration order; later
/// invocations see an empty list and do nothing. Safe to call after normal
/// completion and at an arbitrary point mid-run.
#[derive(Clone)]
pub struct CleanupHandle {
    resources: Arc<Mutex<Vec<Resource>>>,
}

impl CleanupHandle {
    /// A handle with nothing to release, for modules that finish before
    /// acquiring any resources.
    pub fn noop() -> Self {
        ResourceBag::new().into_handle()
    }

    pub fn invoke(&self) {
        let drained = match self.resources.lock() {
            Ok(mut resources) => std::mem::take(&mut *resources),
            Err(_) => return,
        };
        for resource in drained {
            match resource {
                Resource::Task(handle) => handle.abort(),
                Resource::Teardown(run) => run(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn teardowns_run_once_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bag = ResourceBag::new();
        for i in 0..3 {
            let log = Arc::clone(&log);
            bag.register(move || log.lock().unwrap().push(i));
        }
        let handle = bag.into_handle();
        handle.invoke();
        handle.invoke();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn double_invoke_does_not_panic() {
        let handle = CleanupHandle::noop();
        handle.invoke();
        handle.invoke();
    }

    #[tokio::test]
    async fn invoke_aborts_registered_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = Arc::clone(&counter);
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                task_counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let mut bag = ResourceBag::new();
        bag.register_task(task);
        let handle = bag.into_handle();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        handle.invoke();
        let after_abort = counter.load(Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert_eq!(
            counter.load(Ordering::SeqCst),
            after_abort,
            "loop task should stop ticking after cleanup"
        );
    }

    #[tokio::test]
    async fn clones_share_idempotence() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut bag = ResourceBag::new();
        let c = Arc::clone(&count);
        bag.register(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let handle = bag.into_handle();
        let clone = handle.clone();
        clone.invoke();
        handle.invoke();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
