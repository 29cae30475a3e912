//! Background persistence
//!
//! Stores update memory first and hand the serialized value to a
//! [`PersistHandle`]. A single writer thread owned by [`Persister`] applies
//! the writes in the order they were issued. When several writes for the same
//! key are waiting, only the newest one is applied, so a stale payload never
//! lands after a newer one.
//!
//! Failed writes are logged and reported on the failure channel. They are not
//! retried.

use crate::config::persist::{FAILURE_CHANNEL_CAPACITY, WRITER_THREAD_NAME};
use crate::data::storage::KeyValueStore;
use crate::error::{CivicsError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// A single durable write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl PersistOp {
    /// Storage key this op targets
    pub fn key(&self) -> &str {
        match self {
            PersistOp::Set { key, .. } | PersistOp::Remove { key } => key,
        }
    }
}

/// A write that could not be applied
#[derive(Debug)]
pub struct PersistFailure {
    pub key: String,
    pub error: CivicsError,
}

enum Message {
    Op(PersistOp),
    /// Barrier: acknowledged once everything queued before it is applied
    Flush(Sender<()>),
    Shutdown,
}

#[derive(Clone)]
enum HandleInner {
    Inline {
        store: Arc<dyn KeyValueStore>,
        failures: Sender<PersistFailure>,
    },
    Queue(Sender<Message>),
}

/// Cheap, cloneable handle used by the stores to issue writes
#[derive(Clone)]
pub struct PersistHandle {
    inner: HandleInner,
}

impl PersistHandle {
    /// Queue a write of `value` under `key`
    pub fn set(&self, key: &str, value: String) -> Result<()> {
        self.submit(PersistOp::Set {
            key: key.to_string(),
            value,
        })
    }

    /// Queue removal of `key`
    pub fn remove(&self, key: &str) -> Result<()> {
        self.submit(PersistOp::Remove {
            key: key.to_string(),
        })
    }

    /// Issue a write.
    ///
    /// Inline handles apply it immediately and return the storage result.
    /// Queued handles return once the op is enqueued; a durable failure shows
    /// up later on the failure channel.
    pub fn submit(&self, op: PersistOp) -> Result<()> {
        match &self.inner {
            HandleInner::Inline { store, failures } => {
                apply(store.as_ref(), &op).inspect_err(|error| {
                    report(failures, op.key().to_string(), same_error(error));
                })
            }
            HandleInner::Queue(tx) => tx.send(Message::Op(op)).map_err(|e| {
                let key = match e.into_inner() {
                    Message::Op(op) => op.key().to_string(),
                    _ => String::new(),
                };
                warn!(key = %key, "persist writer stopped, value kept in memory only");
                CivicsError::StorageWrite(format!(
                    "Persist writer stopped before '{}' could be written",
                    key
                ))
            }),
        }
    }
}

/// Owner of the background writer
///
/// Dropping the persister applies everything still queued and joins the
/// writer thread. Handles that outlive it get an error from then on.
pub struct Persister {
    handle: PersistHandle,
    failures: Receiver<PersistFailure>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    /// Start a background writer over `store`
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let (tx, rx) = unbounded::<Message>();
        let (failures_tx, failures_rx) = bounded(FAILURE_CHANNEL_CAPACITY);

        let worker = std::thread::Builder::new()
            .name(WRITER_THREAD_NAME.into())
            .spawn(move || run_writer(store, rx, failures_tx))?;

        Ok(Self {
            handle: PersistHandle {
                inner: HandleInner::Queue(tx),
            },
            failures: failures_rx,
            worker: Some(worker),
        })
    }

    /// Apply writes synchronously on the calling thread
    pub fn inline(store: Arc<dyn KeyValueStore>) -> Self {
        let (failures_tx, failures_rx) = bounded(FAILURE_CHANNEL_CAPACITY);
        Self {
            handle: PersistHandle {
                inner: HandleInner::Inline {
                    store,
                    failures: failures_tx,
                },
            },
            failures: failures_rx,
            worker: None,
        }
    }

    /// Handle for issuing writes
    pub fn handle(&self) -> PersistHandle {
        self.handle.clone()
    }

    /// Whether writes run on a background thread
    pub fn is_background(&self) -> bool {
        self.worker.is_some()
    }

    /// Block until every write issued before this call has been applied
    pub fn flush(&self) {
        if let HandleInner::Queue(tx) = &self.handle.inner {
            let (ack_tx, ack_rx) = bounded(1);
            if tx.send(Message::Flush(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
    }

    /// Drain the failures reported so far
    pub fn failures(&self) -> Vec<PersistFailure> {
        self.failures.try_iter().collect()
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let HandleInner::Queue(tx) = &self.handle.inner {
                let _ = tx.send(Message::Shutdown);
            }
            let _ = worker.join();
        }
    }
}

fn run_writer(
    store: Arc<dyn KeyValueStore>,
    rx: Receiver<Message>,
    failures: Sender<PersistFailure>,
) {
    let mut pending: Vec<PersistOp> = Vec::new();

    // Block for one message, then drain whatever else is already queued
    while let Ok(first) = rx.recv() {
        let mut shutdown = false;
        for msg in std::iter::once(first).chain(rx.try_iter()) {
            match msg {
                Message::Op(op) => pending.push(op),
                Message::Flush(ack) => {
                    apply_coalesced(store.as_ref(), &mut pending, &failures);
                    let _ = ack.send(());
                }
                // Ops queued behind the shutdown still complete
                Message::Shutdown => shutdown = true,
            }
        }
        apply_coalesced(store.as_ref(), &mut pending, &failures);
        if shutdown {
            break;
        }
    }

    debug!("persist writer stopped");
}

/// Apply `pending` in order, skipping ops superseded by a later op on the
/// same key
fn apply_coalesced(
    store: &dyn KeyValueStore,
    pending: &mut Vec<PersistOp>,
    failures: &Sender<PersistFailure>,
) {
    if pending.is_empty() {
        return;
    }

    let mut last: HashMap<&str, usize> = HashMap::new();
    for (i, op) in pending.iter().enumerate() {
        last.insert(op.key(), i);
    }
    let keep: Vec<bool> = pending
        .iter()
        .enumerate()
        .map(|(i, op)| last.get(op.key()) == Some(&i))
        .collect();

    for (op, keep) in pending.drain(..).zip(keep) {
        if !keep {
            continue;
        }
        if let Err(error) = apply(store, &op) {
            report(failures, op.key().to_string(), error);
        }
    }
}

fn apply(store: &dyn KeyValueStore, op: &PersistOp) -> Result<()> {
    let result = match op {
        PersistOp::Set { key, value } => store.set(key, value),
        PersistOp::Remove { key } => store.remove(key),
    };
    if result.is_ok() {
        debug!(key = op.key(), "persisted");
    }
    result
}

/// Copy of `error` for the failure channel; I/O errors keep only their message
fn same_error(error: &CivicsError) -> CivicsError {
    match error {
        CivicsError::StorageRead(msg) => CivicsError::StorageRead(msg.clone()),
        CivicsError::StorageWrite(msg) => CivicsError::StorageWrite(msg.clone()),
        CivicsError::Malformed { key, reason } => CivicsError::Malformed {
            key: key.clone(),
            reason: reason.clone(),
        },
        CivicsError::NotFound(msg) => CivicsError::NotFound(msg.clone()),
        CivicsError::Catalog(msg) => CivicsError::Catalog(msg.clone()),
        CivicsError::Config(msg) => CivicsError::Config(msg.clone()),
        CivicsError::Io(e) => CivicsError::StorageWrite(e.to_string()),
    }
}

fn report(failures: &Sender<PersistFailure>, key: String, error: CivicsError) {
    warn!(key = %key, error = %error, "persist failed, value kept in memory only");
    // Full channel: the failure is still in the log
    let _ = failures.try_send(PersistFailure { key, error });
}
