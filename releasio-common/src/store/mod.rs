//! Reactive persisted key-value store
//!
//! A [`Store`] is one execution context's view of a durable set of named
//! cells. It loads a snapshot of the backend when opened and then:
//!
//! - Answers reads synchronously from memory, migrating each registered cell
//!   the first time it is read
//! - Applies writes to memory immediately, then persists them through a
//!   background writer task and publishes them to sibling contexts
//! - Notifies local subscribers asynchronously, in write order
//! - Applies changes published by sibling contexts (last write wins per key)
//!
//! A read never fails: missing, unreadable or unusable stored values fall
//! back to a default and are logged.

pub mod backend;
pub mod broadcast;
pub mod cell;
pub mod codec;
pub mod migrator;
pub mod registry;

pub use backend::{MemoryBackend, StorageBackend};
#[cfg(feature = "sqlx")]
pub use backend::SqliteBackend;
pub use broadcast::{CrossContextBroadcaster, Detached};
pub use cell::PersistentCell;
pub use migrator::{Field, Migrated, MigrationReport, Presence, Shape, StoreMigrator};
pub use registry::{CellRegistry, CellSpec};

use crate::events::{ContextId, DashboardEvent};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tokio::sync::{broadcast as tokio_broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

enum PersistOp {
    Put { key: String, text: String },
    Remove { key: String },
    Flush(oneshot::Sender<()>),
}

struct Notification {
    key: String,
    value: Option<Value>,
}

#[derive(Default)]
struct State {
    /// Last known stored text per key
    raw: HashMap<String, String>,
    /// Values already read in this context; `None` means "use the default"
    materialized: HashMap<String, Option<Value>>,
    listeners: HashMap<String, Vec<(u64, Listener)>>,
    /// Newest change applied per key, for last-write-wins merging
    stamps: HashMap<String, Stamp>,
}

/// Orders writes to one key; ties on time are broken by context id
type Stamp = (DateTime<Utc>, ContextId);

impl State {
    fn has_listeners(&self, key: &str) -> bool {
        self.listeners.get(key).is_some_and(|l| !l.is_empty())
    }

    /// Record `stamp` for `key` unless a newer change was already applied
    fn advance(&mut self, key: &str, stamp: Stamp) -> bool {
        match self.stamps.get(key) {
            Some(current) if *current >= stamp => false,
            _ => {
                self.stamps.insert(key.to_string(), stamp);
                true
            }
        }
    }
}

struct Inner {
    context: ContextId,
    registry: CellRegistry,
    state: RwLock<State>,
    persist_tx: mpsc::UnboundedSender<PersistOp>,
    notify_tx: mpsc::UnboundedSender<Notification>,
    transport: Arc<dyn CrossContextBroadcaster>,
    next_listener_id: AtomicU64,
    // Dropping the store closes this, which stops the remote listener task
    _shutdown: oneshot::Sender<()>,
}

/// Handle to one context's store; clones share the same context
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Open a store over `backend`, joining sibling contexts on `transport`
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(
        backend: Arc<dyn StorageBackend>,
        transport: Arc<dyn CrossContextBroadcaster>,
        registry: CellRegistry,
    ) -> Result<Self> {
        let raw = backend.load_all().await?;
        let context = ContextId::new();

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(
            "Opened store context {} ({} persisted cells, {} registered)",
            context,
            raw.len(),
            registry.len()
        );

        let inner = Arc::new(Inner {
            context,
            registry,
            state: RwLock::new(State {
                raw,
                ..State::default()
            }),
            persist_tx,
            notify_tx,
            transport,
            next_listener_id: AtomicU64::new(1),
            _shutdown: shutdown_tx,
        });

        tokio::spawn(run_writer(backend, persist_rx));
        tokio::spawn(run_notifier(Arc::downgrade(&inner), notify_rx));

        match inner.transport.subscribe() {
            Some(rx) => {
                tokio::spawn(run_remote_listener(Arc::downgrade(&inner), rx, shutdown_rx));
            }
            None => debug!(
                "No cross-context transport; store context {} runs local-only",
                context
            ),
        }

        Ok(Self { inner })
    }

    /// Open a volatile, detached store
    pub async fn open_local(registry: CellRegistry) -> Result<Self> {
        Self::open(Arc::new(MemoryBackend::new()), Arc::new(Detached), registry).await
    }

    pub fn context(&self) -> ContextId {
        self.inner.context
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.inner.registry
    }

    /// Current value of `key` as `T`, or `default` if there is no usable
    /// stored value
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.inner.current(key) else {
            return default;
        };

        match codec::from_value(&value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Cell {} does not decode, using default: {}", key, e);
                default
            }
        }
    }

    /// Current structural value of `key`
    ///
    /// Falls back to the registered default, or `null` for unregistered keys.
    pub fn read_value(&self, key: &str) -> Value {
        self.inner
            .current(key)
            .or_else(|| self.inner.registry.get(key).map(|spec| spec.default.clone()))
            .unwrap_or(Value::Null)
    }

    /// Replace the value of `key`
    ///
    /// On a serialization failure the prior value is retained and the error
    /// returned.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = codec::to_value(value).map_err(|e| {
            warn!("Rejected write to {}: {}", key, e);
            e
        })?;
        self.write_value(key, value)
    }

    /// Replace the value of `key` with an already structural value
    ///
    /// Registered cells are conformed to their shape first; a value that
    /// cannot be conformed at all is rejected with `InvalidInput`.
    pub fn write_value(&self, key: &str, value: Value) -> Result<()> {
        let value = self.inner.canonicalize(key, value)?;
        let text = codec::to_text(&value)?;
        let mut state = self.inner.write_state();
        self.inner.commit(&mut state, key, value, text);
        Ok(())
    }

    /// Replace the value of `key` with `f(current)` and return the new value
    ///
    /// The read and the write happen under one lock, so concurrent updates in
    /// this context are not lost. `f` must not call back into the store.
    pub fn update<T, F>(&self, key: &str, default: T, f: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let mut state = self.inner.write_state();
        let current = self
            .inner
            .materialize(&mut state, key)
            .and_then(|v| codec::from_value(&v).ok())
            .unwrap_or(default);

        let next = f(current);
        let value = self.inner.canonicalize(key, codec::to_value(&next)?)?;
        let text = codec::to_text(&value)?;
        self.inner.commit(&mut state, key, value, text);
        Ok(next)
    }

    /// Like [`Store::update`], but `f` may refuse
    ///
    /// `f` returns the new value together with a result for the caller. When
    /// it returns an error nothing is written and the error is passed on.
    pub fn try_update<T, R, F>(&self, key: &str, default: T, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> Result<(T, R)>,
    {
        let mut state = self.inner.write_state();
        let current = self
            .inner
            .materialize(&mut state, key)
            .and_then(|v| codec::from_value(&v).ok())
            .unwrap_or(default);

        let (next, out) = f(current)?;
        let value = self.inner.canonicalize(key, codec::to_value(&next)?)?;
        let text = codec::to_text(&value)?;
        self.inner.commit(&mut state, key, value, text);
        Ok(out)
    }

    /// Remove `key` so that it reads as its default again
    pub fn clear(&self, key: &str) {
        let inner = &self.inner;
        let mut state = inner.write_state();

        state.raw.remove(key);
        state.materialized.insert(key.to_string(), None);
        inner.send_persist(PersistOp::Remove {
            key: key.to_string(),
        });

        if let Some(spec) = inner.registry.get(key) {
            for legacy in &spec.legacy_keys {
                if state.raw.remove(*legacy).is_some() {
                    inner.send_persist(PersistOp::Remove {
                        key: legacy.to_string(),
                    });
                }
            }
        }

        let timestamp = inner.stamp(&mut state, key);
        inner.notify(&state, key, None);
        inner.transport.publish(DashboardEvent::CellCleared {
            key: key.to_string(),
            origin: inner.context,
            timestamp,
        });
    }

    /// Register a listener for changes of `key`
    ///
    /// The listener receives `None` when the cell is cleared. Dropping the
    /// returned [`Subscription`] unregisters it.
    pub fn subscribe_value<F>(&self, key: &str, listener: F) -> Subscription
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .write_state()
            .listeners
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(listener)));

        Subscription {
            inner: Arc::downgrade(&self.inner),
            key: key.to_string(),
            id,
        }
    }

    /// Register a typed listener; a cleared cell is reported as `default`
    pub fn subscribe<T, F>(&self, key: &str, default: T, listener: F) -> Subscription
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let owned_key = key.to_string();
        self.subscribe_value(key, move |value| match value {
            None => listener(default.clone()),
            Some(value) => match codec::from_value::<T>(value) {
                Ok(v) => listener(v),
                Err(e) => warn!("Skipping undecodable change of {}: {}", owned_key, e),
            },
        })
    }

    /// Typed handle to one cell
    pub fn cell<T>(&self, key: &str, default: T) -> PersistentCell<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        PersistentCell::new(self.clone(), key, default)
    }

    /// Wait until every write issued so far has reached the backend
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.inner.send_persist(PersistOp::Flush(done_tx));
        let _ = done_rx.await;
    }
}

impl Inner {
    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.read_state().materialized.get(key) {
            return value.clone();
        }
        let mut state = self.write_state();
        self.materialize(&mut state, key)
    }

    /// Resolve the in-memory value of `key`, migrating on first access
    fn materialize(&self, state: &mut State, key: &str) -> Option<Value> {
        if let Some(value) = state.materialized.get(key) {
            return value.clone();
        }

        let spec = self.registry.get(key);
        if let Some(spec) = spec {
            if !state.raw.contains_key(key) {
                self.copy_forward(state, spec);
            }
        }

        let value = match state.raw.get(key).map(|text| codec::parse(text)) {
            None => None,
            Some(Err(e)) => {
                warn!("Stored value of {} is unreadable, using default: {}", key, e);
                None
            }
            Some(Ok(raw)) => match spec {
                None => Some(raw),
                Some(spec) => {
                    let migrated = StoreMigrator::migrate(&spec.shape, &raw);
                    match migrated.value {
                        None => {
                            warn!(
                                "Stored value of {} does not match its shape, using default",
                                key
                            );
                            None
                        }
                        Some(value) => {
                            if migrated.changed {
                                info!(
                                    dropped = ?migrated.report.dropped,
                                    defaulted = ?migrated.report.defaulted,
                                    "Migrated stored cell {}",
                                    key
                                );
                                self.persist_migrated(state, key, &value);
                            }
                            Some(value)
                        }
                    }
                }
            },
        };

        state.materialized.insert(key.to_string(), value.clone());
        value
    }

    fn copy_forward(&self, state: &mut State, spec: &CellSpec) {
        let found = spec
            .legacy_keys
            .iter()
            .find_map(|legacy| state.raw.get(*legacy).map(|text| (*legacy, text.clone())));

        if let Some((legacy, text)) = found {
            info!("Copying legacy cell {} forward to {}", legacy, spec.key);
            state.raw.insert(spec.key.to_string(), text.clone());
            self.send_persist(PersistOp::Put {
                key: spec.key.to_string(),
                text,
            });
        }
    }

    fn persist_migrated(&self, state: &mut State, key: &str, value: &Value) {
        match codec::to_text(value) {
            Ok(text) => {
                state.raw.insert(key.to_string(), text.clone());
                self.send_persist(PersistOp::Put {
                    key: key.to_string(),
                    text,
                });
            }
            Err(e) => warn!("Could not persist migrated {}: {}", key, e),
        }
    }

    fn canonicalize(&self, key: &str, value: Value) -> Result<Value> {
        let Some(spec) = self.registry.get(key) else {
            return Ok(value);
        };

        let migrated = StoreMigrator::migrate(&spec.shape, &value);
        match migrated.value {
            Some(v) => {
                if migrated.changed {
                    debug!(dropped = ?migrated.report.dropped, "Conformed write to {}", key);
                }
                Ok(v)
            }
            None => Err(Error::InvalidInput(format!(
                "value for {} does not match its shape",
                key
            ))),
        }
    }

    fn commit(&self, state: &mut State, key: &str, value: Value, text: String) {
        state.raw.insert(key.to_string(), text.clone());
        state
            .materialized
            .insert(key.to_string(), Some(value.clone()));

        self.send_persist(PersistOp::Put {
            key: key.to_string(),
            text: text.clone(),
        });
        let timestamp = self.stamp(state, key);
        self.notify(state, key, Some(value));
        self.transport.publish(DashboardEvent::CellChanged {
            key: key.to_string(),
            value: text,
            origin: self.context,
            timestamp,
        });
    }

    /// Stamp a local change; never earlier than a change already seen
    fn stamp(&self, state: &mut State, key: &str) -> DateTime<Utc> {
        let mut timestamp = Utc::now();
        if let Some((seen, _)) = state.stamps.get(key) {
            if *seen >= timestamp {
                timestamp = *seen + chrono::Duration::nanoseconds(1);
            }
        }
        state.stamps.insert(key.to_string(), (timestamp, self.context));
        timestamp
    }

    fn send_persist(&self, op: PersistOp) {
        if self.persist_tx.send(op).is_err() {
            error!("Store writer has stopped; change kept in memory only");
        }
    }

    fn notify(&self, state: &State, key: &str, value: Option<Value>) {
        if !state.has_listeners(key) {
            return;
        }
        let _ = self.notify_tx.send(Notification {
            key: key.to_string(),
            value,
        });
    }

    fn listeners_for(&self, key: &str) -> Vec<Listener> {
        self.read_state()
            .listeners
            .get(key)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Merge a change published by another context
    fn apply_remote(&self, event: DashboardEvent) {
        if event.origin() == Some(self.context) {
            return;
        }

        match event {
            DashboardEvent::CellChanged {
                key,
                value,
                origin,
                timestamp,
            } => {
                let mut state = self.write_state();
                if !state.advance(&key, (timestamp, origin)) {
                    debug!("Ignoring stale remote change of {}", key);
                    return;
                }
                state.raw.insert(key.clone(), value.clone());

                if !state.has_listeners(&key) {
                    // Re-read lazily from the new text
                    state.materialized.remove(&key);
                    return;
                }

                match codec::parse(&value) {
                    Ok(parsed) => {
                        debug!("Applying remote change of {}", key);
                        state.materialized.insert(key.clone(), Some(parsed.clone()));
                        self.notify(&state, &key, Some(parsed));
                    }
                    Err(e) => {
                        warn!("Ignoring unreadable remote change of {}: {}", key, e);
                        state.materialized.remove(&key);
                    }
                }
            }
            DashboardEvent::CellCleared {
                key,
                origin,
                timestamp,
            } => {
                let mut state = self.write_state();
                if !state.advance(&key, (timestamp, origin)) {
                    debug!("Ignoring stale remote clear of {}", key);
                    return;
                }
                state.raw.remove(&key);
                state.materialized.insert(key.clone(), None);
                self.notify(&state, &key, None);
            }
            DashboardEvent::AccessDenied { .. } => {}
        }
    }
}

/// Registration of a store listener; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    inner: Weak<Inner>,
    key: String,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Explicitly unsubscribe (same as dropping)
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.write_state();
        if let Some(list) = state.listeners.get_mut(&self.key) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                state.listeners.remove(&self.key);
            }
        }
    }
}

async fn run_writer(backend: Arc<dyn StorageBackend>, mut rx: mpsc::UnboundedReceiver<PersistOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            PersistOp::Put { key, text } => {
                if let Err(e) = backend.put(&key, &text).await {
                    error!("Failed to persist cell {}: {}", key, e);
                }
            }
            PersistOp::Remove { key } => {
                if let Err(e) = backend.remove(&key).await {
                    error!("Failed to remove cell {}: {}", key, e);
                }
            }
            PersistOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Store writer stopped");
}

async fn run_notifier(inner: Weak<Inner>, mut rx: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        let listeners = match inner.upgrade() {
            Some(inner) => inner.listeners_for(&notification.key),
            None => break,
        };
        for listener in listeners {
            listener(notification.value.as_ref());
        }
    }
}

async fn run_remote_listener(
    inner: Weak<Inner>,
    mut rx: tokio_broadcast::Receiver<DashboardEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            received = rx.recv() => match received {
                Ok(event) => match inner.upgrade() {
                    Some(inner) => inner.apply_remote(event),
                    None => break,
                },
                Err(tokio_broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Store fell behind sibling contexts, {} changes skipped", skipped);
                }
                Err(tokio_broadcast::error::RecvError::Closed) => {
                    debug!("Cross-context transport closed; continuing local-only");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use proptest::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn registry() -> CellRegistry {
        let mut registry = CellRegistry::new();
        registry
            .register(CellSpec::new(
                "platform-connections",
                Shape::flags(&["facebook", "instagram", "tiktok", "x", "youtube"]),
                json!({"facebook": false, "instagram": false, "tiktok": false, "x": false, "youtube": false}),
            ))
            .unwrap();
        registry
            .register(
                CellSpec::new("selected-artist-id", Shape::nullable(Shape::Number), Value::Null)
                    .with_legacy_key("app-selected-artist-id"),
            )
            .unwrap();
        registry
    }

    async fn sibling(backend: &Arc<MemoryBackend>, bus: &EventBus) -> Store {
        Store::open(backend.clone(), Arc::new(bus.clone()), registry())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_value_reads_default() {
        let store = Store::open_local(registry()).await.unwrap();
        assert_eq!(store.read("releasio-anything", 5_i64), 5);
        assert_eq!(store.read_value("unregistered"), Value::Null);
        assert_eq!(store.read_value("selected-artist-id"), Value::Null);
    }

    #[tokio::test]
    async fn test_write_is_visible_immediately_and_persisted() {
        let backend = Arc::new(MemoryBackend::new());
        let store = Store::open(backend.clone(), Arc::new(Detached), registry())
            .await
            .unwrap();

        store.write("selected-artist-id", &Some(7_i64)).unwrap();
        assert_eq!(store.read("selected-artist-id", None::<i64>), Some(7));

        store.flush().await;
        assert_eq!(backend.raw("selected-artist-id").await.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_failed_serialization_keeps_prior_value() {
        let store = Store::open_local(CellRegistry::new()).await.unwrap();
        store.write("pairs", &vec![1, 2]).unwrap();

        let mut bad = std::collections::BTreeMap::new();
        bad.insert((1, 2), 3);
        assert!(store.write("pairs", &bad).is_err());
        assert_eq!(store.read("pairs", Vec::<i32>::new()), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_shape_violation_rejected_on_write() {
        let store = Store::open_local(registry()).await.unwrap();
        let err = store
            .write_value("platform-connections", json!(["facebook"]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_stored_platform_connections_are_migrated_once() {
        let backend = Arc::new(MemoryBackend::with_cells([(
            "platform-connections",
            r#"{"facebook":true,"myspace":true}"#,
        )]));
        let store = Store::open(backend.clone(), Arc::new(Detached), registry())
            .await
            .unwrap();

        assert_eq!(
            store.read_value("platform-connections"),
            json!({"facebook": true, "instagram": false, "tiktok": false, "x": false, "youtube": false})
        );

        store.flush().await;
        let persisted = backend.raw("platform-connections").await.unwrap();
        assert!(!persisted.contains("myspace"));
    }

    #[tokio::test]
    async fn test_legacy_key_copied_forward() {
        let backend = Arc::new(MemoryBackend::with_cells([("app-selected-artist-id", "3")]));
        let store = Store::open(backend.clone(), Arc::new(Detached), registry())
            .await
            .unwrap();

        assert_eq!(store.read("selected-artist-id", None::<i64>), Some(3));
        store.flush().await;
        assert_eq!(backend.raw("selected-artist-id").await.as_deref(), Some("3"));

        store.clear("selected-artist-id");
        store.flush().await;
        assert_eq!(backend.raw("app-selected-artist-id").await, None);
        assert_eq!(store.read("selected-artist-id", None::<i64>), None);
    }

    #[tokio::test]
    async fn test_update_applies_to_current_value() {
        let store = Store::open_local(CellRegistry::new()).await.unwrap();
        store.write("counter", &1_i64).unwrap();
        let next = store.update("counter", 0_i64, |n| n + 41).unwrap();
        assert_eq!(next, 42);
        assert_eq!(store.read("counter", 0_i64), 42);
    }

    #[tokio::test]
    async fn test_local_subscribers_notified_and_unsubscribed() {
        let store = Store::open_local(CellRegistry::new()).await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = store.subscribe("view", "dashboard".to_string(), move |v: String| {
            let _ = tx.send(v);
        });

        store.write("view", &"releases").unwrap();
        let seen = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(seen.as_deref(), Some("releases"));

        store.clear("view");
        let seen = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(seen.as_deref(), Some("dashboard"));

        subscription.unsubscribe();
        store.write("view", &"analytics").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sibling_context_observes_selected_artist() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = EventBus::new(64);
        let a = sibling(&backend, &bus).await;
        let b = sibling(&backend, &bus).await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = b.subscribe("selected-artist-id", None::<i64>, move |id| {
            let _ = tx.send(id);
        });

        a.write("selected-artist-id", &Some(7_i64)).unwrap();

        let seen = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(seen, Some(Some(7)));
        assert_eq!(b.read("selected-artist-id", None::<i64>), Some(7));
    }

    #[tokio::test]
    async fn test_sibling_without_subscriber_still_reads_latest() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = EventBus::new(64);
        let a = sibling(&backend, &bus).await;
        let b = sibling(&backend, &bus).await;

        assert_eq!(b.read("selected-artist-id", None::<i64>), None);
        a.write("selected-artist-id", &Some(9_i64)).unwrap();

        // Give the remote listener a chance to run
        for _ in 0..50 {
            if b.read("selected-artist-id", None::<i64>) == Some(9) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(b.read("selected-artist-id", None::<i64>), Some(9));
    }

    #[tokio::test]
    async fn test_own_events_are_not_reapplied() {
        let bus = EventBus::new(64);
        let store = Store::open(Arc::new(MemoryBackend::new()), Arc::new(bus.clone()), registry())
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = store.subscribe("counter", 0_i64, move |n| {
            let _ = tx.send(n);
        });

        store.write("counter", &1_i64).unwrap();
        assert_eq!(timeout(Duration::from_secs(1), rx.recv()).await.unwrap(), Some(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }

    proptest! {
        #[test]
        fn prop_malformed_text_reads_default(garbage in ".*", default in any::<i64>()) {
            let malformed = format!("{{{}", garbage);
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let backend = Arc::new(MemoryBackend::with_cells([
                    ("counter", malformed.clone()),
                    ("platform-connections", malformed.clone()),
                ]));
                let store = Store::open(backend, Arc::new(Detached), registry()).await.unwrap();

                prop_assert_eq!(store.read("counter", default), default);
                let flags = store.read_value("platform-connections");
                prop_assert_eq!(flags.as_object().map(|o| o.len()), Some(5));
                Ok(())
            })?;
        }
    }
}
