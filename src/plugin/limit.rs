use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Caps how many calls into one minder operation may run at once.
///
/// Blocking callers wait on [`run`](Self::run); with the `async` feature,
/// async callers are suspended in [`run_async`](Self::run_async). The two
/// paths keep separate slot counts. Waiters are not served in any guaranteed order.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimit {
    max: usize,
    slots: Arc<(Mutex<usize>, Condvar)>,
    #[cfg(feature = "async")]
    semaphore: Arc<tokio::sync::Semaphore>,
}

struct SlotGuard<'a>(&'a (Mutex<usize>, Condvar));

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let (in_use, freed) = self.0;
        *in_use.lock().unwrap_or_else(PoisonError::into_inner) -= 1;
        freed.notify_one();
    }
}

impl ConcurrencyLimit {
    /// A ceiling of zero is treated as one.
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            max,
            slots: Arc::new((Mutex::new(0), Condvar::new())),
            #[cfg(feature = "async")]
            semaphore: Arc::new(tokio::sync::Semaphore::new(max)),
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.acquire();
        f()
    }

    fn acquire(&self) -> SlotGuard<'_> {
        let (in_use, freed) = &*self.slots;
        let mut count = in_use.lock().unwrap_or_else(PoisonError::into_inner);
        while *count >= self.max {
            count = freed.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
        *count += 1;
        SlotGuard(&self.slots)
    }

    #[cfg(feature = "async")]
    pub async fn run_async<F: std::future::Future>(&self, fut: F) -> F::Output {
        // The semaphore is never closed.
        let _permit = self.semaphore.acquire().await.ok();
        fut.await
    }
}
