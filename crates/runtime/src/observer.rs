//! Explicit observer lists with removable handles.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

/// Handle returned by a subscription, used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Ordered list of callbacks notified synchronously.
///
/// Callbacks are invoked outside the internal lock, so a callback may
/// subscribe, unsubscribe or trigger another notification. A panicking
/// callback is logged and the remaining callbacks still run.
pub struct ObserverList<T> {
    inner: Mutex<Observers<T>>,
}

struct Observers<T> {
    next_id: u64,
    entries: Vec<(ObserverHandle, Callback<T>)>,
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Observers {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> ObserverHandle {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = ObserverHandle(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((handle, Arc::new(callback)));
        handle
    }

    /// Removes a callback. Returns false if the handle was unknown.
    pub fn unsubscribe(&self, handle: ObserverHandle) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = inner.entries.len();
        inner.entries.retain(|(h, _)| *h != handle);
        inner.entries.len() < before
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Calls every callback registered at the time of the call, in order.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
                error!(target: "runtime::observer", "Observer panicked, continuing");
            }
        }
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unsubscribed_callbacks_are_not_called() {
        let list = ObserverList::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let handle = list.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        list.notify(&1);
        assert!(list.unsubscribe(handle));
        assert!(!list.unsubscribe(handle));
        list.notify(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_output_reports_subscriber_count() {
        let list = ObserverList::<u32>::new();
        let handle = list.subscribe(|_| {});
        list.subscribe(|_| {});
        list.unsubscribe(handle);

        assert_eq!(format!("{list:?}"), "ObserverList { len: 1 }");
    }

    #[test]
    fn panicking_callback_does_not_stop_others() {
        let list = ObserverList::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        list.subscribe(|_| panic!("observer failure"));
        let counter = Arc::clone(&hits);
        list.subscribe(move |value| {
            counter.fetch_add(*value as usize, Ordering::SeqCst);
        });

        list.notify(&3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
