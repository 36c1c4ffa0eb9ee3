//! Read-side cache for the two query endpoints, the current user and a
//! jar's contents. Concurrent requests for the same key are deduplicated,
//! a transport failure is retried once, and successful payloads replace
//! the cached value. Views subscribe for change notification and drop the
//! subscription on unmount.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;

use capsulejar_core::{Envelope, Jar, User};

use crate::api::{ApiClient, ApiError};

/// Per-key cache entry. The transitions are pure so the dedup rules can
/// be exercised without a browser.
struct Slot<T> {
    data: Option<Rc<T>>,
    fetching: bool,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            data: None,
            fetching: false,
        }
    }
}

impl<T> Slot<T> {
    /// Returns true when the caller should issue the request. A fetch in
    /// flight always wins; cached data suppresses non-forced fetches.
    fn begin(&mut self, force: bool) -> bool {
        if self.fetching {
            return false;
        }
        if self.data.is_some() && !force {
            return false;
        }
        self.fetching = true;
        true
    }

    /// A failed fetch keeps whatever was cached before.
    fn complete(&mut self, data: Option<Rc<T>>) {
        self.fetching = false;
        if data.is_some() {
            self.data = data;
        }
    }
}

struct CacheInner {
    api: Rc<ApiClient>,
    user: RefCell<Slot<User>>,
    jars: RefCell<HashMap<String, Slot<Jar>>>,
    listeners: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next_listener_id: Cell<u64>,
}

impl CacheInner {
    fn notify(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

#[derive(Clone)]
pub(crate) struct QueryCache {
    inner: Rc<CacheInner>,
}

impl PartialEq for QueryCache {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Unsubscribes when dropped.
pub(crate) struct Subscription {
    inner: Rc<CacheInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(id, _)| *id != self.id);
    }
}

impl QueryCache {
    pub(crate) fn new(api: Rc<ApiClient>) -> Self {
        Self {
            inner: Rc::new(CacheInner {
                api,
                user: RefCell::new(Slot::default()),
                jars: RefCell::new(HashMap::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            }),
        }
    }

    pub(crate) fn subscribe(&self, listener: Rc<dyn Fn()>) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));
        Subscription {
            inner: Rc::clone(&self.inner),
            id,
        }
    }

    pub(crate) fn user(&self) -> Option<Rc<User>> {
        self.inner.user.borrow().data.clone()
    }

    pub(crate) fn jar(&self, jar_id: &str) -> Option<Rc<Jar>> {
        self.inner
            .jars
            .borrow()
            .get(jar_id)
            .and_then(|slot| slot.data.clone())
    }

    pub(crate) fn ensure_user(&self) {
        self.fetch_user(false);
    }

    pub(crate) fn refetch_user(&self) {
        self.fetch_user(true);
    }

    pub(crate) fn ensure_jar(&self, jar_id: &str) {
        self.fetch_jar(jar_id, false);
    }

    pub(crate) fn refetch_jar(&self, jar_id: &str) {
        self.fetch_jar(jar_id, true);
    }

    fn fetch_user(&self, force: bool) {
        if !self.inner.user.borrow_mut().begin(force) {
            return;
        }
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let api = Rc::clone(&inner.api);
            let data = fetch_with_retry(api.current_user(), api.current_user()).await;
            inner.user.borrow_mut().complete(data.map(Rc::new));
            inner.notify();
        });
    }

    fn fetch_jar(&self, jar_id: &str, force: bool) {
        {
            let mut jars = self.inner.jars.borrow_mut();
            let slot = jars.entry(jar_id.to_string()).or_default();
            if !slot.begin(force) {
                return;
            }
        }
        let inner = Rc::clone(&self.inner);
        let jar_id = jar_id.to_string();
        spawn_local(async move {
            let api = Rc::clone(&inner.api);
            let data =
                fetch_with_retry(api.jar_contents(&jar_id), api.jar_contents(&jar_id)).await;
            if let Some(slot) = inner.jars.borrow_mut().get_mut(&jar_id) {
                slot.complete(data.map(Rc::new));
            }
            inner.notify();
        });
    }
}

/// Reads retry one time on a transport failure. An envelope that decodes
/// but reports a non-ok status is not retried; it simply yields no data.
/// Both futures are lazy, so the retry costs nothing unless it runs.
async fn fetch_with_retry<T>(
    first: impl std::future::Future<Output = Result<Envelope<T>, ApiError>>,
    retry: impl std::future::Future<Output = Result<Envelope<T>, ApiError>>,
) -> Option<T> {
    let envelope = match first.await {
        Ok(envelope) => envelope,
        Err(_) => retry.await.ok()?,
    };
    if envelope.is_ok() {
        envelope.data
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_fetches_for_one_key_collapse() {
        let mut slot: Slot<u32> = Slot::default();
        assert!(slot.begin(false));
        assert!(!slot.begin(false));
        assert!(!slot.begin(true));
        slot.complete(Some(Rc::new(7)));
        assert_eq!(slot.data.as_deref(), Some(&7));
    }

    #[test]
    fn cached_data_suppresses_fetch_unless_forced() {
        let mut slot: Slot<u32> = Slot::default();
        assert!(slot.begin(false));
        slot.complete(Some(Rc::new(1)));
        assert!(!slot.begin(false));
        assert!(slot.begin(true));
        slot.complete(Some(Rc::new(2)));
        assert_eq!(slot.data.as_deref(), Some(&2));
    }

    #[test]
    fn failed_fetch_keeps_previous_data() {
        let mut slot: Slot<u32> = Slot::default();
        assert!(slot.begin(false));
        slot.complete(Some(Rc::new(1)));
        assert!(slot.begin(true));
        slot.complete(None);
        assert_eq!(slot.data.as_deref(), Some(&1));
        assert!(!slot.fetching);
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let cache = QueryCache::new(Rc::new(ApiClient::new(String::new(), None)));
        let hits = Rc::new(Cell::new(0u32));
        let listener = {
            let hits = Rc::clone(&hits);
            Rc::new(move || hits.set(hits.get() + 1)) as Rc<dyn Fn()>
        };
        let subscription = cache.subscribe(listener);
        cache.inner.notify();
        assert_eq!(hits.get(), 1);
        drop(subscription);
        cache.inner.notify();
        assert_eq!(hits.get(), 1);
    }
}
