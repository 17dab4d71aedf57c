//! Global error capture: converts host-process uncaught-error signals
//! into error-level records fed through the normal enrichment path.
//!
//! Two capturable channels exist on a Rust host:
//! - a process-wide panic hook, chained to whatever hook was already
//!   installed (the "uncaught exception" channel)
//! - [`report_unhandled_error`], fed by host glue such as task
//!   supervisors or `JoinError` handlers (the "unhandled rejection"
//!   channel)
//!
//! Attach/detach is per client and idempotent. The panic hook itself is
//! installed once per process and stays chained afterwards; it becomes a
//! pass-through while no client is attached. Detaching removes the
//! client from the dispatch registry, which is what stops capture.

use crate::client::ClientInner;
use crate::domain::{LogLevel, LogOptions};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::cell::Cell;
use std::panic::PanicHookInfo;
use std::sync::{Arc, Once, Weak};
use tracing::debug;

/// Bucket carried by records converted from captured panics.
pub const PANIC_BUCKET: &str = "uncaught_exception";
/// Bucket carried by records converted from reported unhandled errors.
pub const UNHANDLED_BUCKET: &str = "unhandled_rejection";

static REGISTRY: Mutex<Vec<(u64, Weak<ClientInner>)>> = Mutex::new(Vec::new());
static HOOK: Once = Once::new();

thread_local! {
    // Suppresses re-entrant capture: a panic raised while converting a
    // panic must not dispatch again.
    static IN_DISPATCH: Cell<bool> = const { Cell::new(false) };
}

/// Per-client attach state. Never shared across client instances.
#[derive(Debug, Default)]
pub struct BridgeRegistration {
    attached: bool,
}

impl BridgeRegistration {
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

pub(crate) fn attach(client: &Arc<ClientInner>) {
    let mut registration = client.bridge.lock();
    if registration.attached {
        return;
    }

    install_panic_hook();
    REGISTRY
        .lock()
        .push((client.bridge_id(), Arc::downgrade(client)));
    registration.attached = true;
    debug!(client = client.bridge_id(), "error bridge attached");
}

pub(crate) fn detach(client: &ClientInner) {
    let mut registration = client.bridge.lock();
    if !registration.attached {
        return;
    }

    REGISTRY.lock().retain(|(id, _)| *id != client.bridge_id());
    registration.attached = false;
    debug!(client = client.bridge_id(), "error bridge detached");
}

/// Report an error that no other handler owned (a dropped task failure,
/// a supervisor-observed `JoinError`, ...). Every attached client
/// converts it into an error-level record. A no-op while no client is
/// attached; never fails.
pub fn report_unhandled_error(reason: impl std::fmt::Display) {
    let mut context = Map::new();
    context.insert("reason".to_string(), Value::String(reason.to_string()));
    broadcast(UNHANDLED_BUCKET, "Unhandled error".to_string(), context);
}

fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            dispatch_panic(info);
            previous(info);
        }));
    });
}

fn dispatch_panic(info: &PanicHookInfo<'_>) {
    if IN_DISPATCH.get() {
        return;
    }
    IN_DISPATCH.set(true);

    let mut context = Map::new();
    if let Some(location) = info.location() {
        context.insert(
            "filename".to_string(),
            Value::String(location.file().to_string()),
        );
        context.insert("lineno".to_string(), Value::from(location.line()));
        context.insert("colno".to_string(), Value::from(location.column()));
    }
    let thread = std::thread::current();
    if let Some(name) = thread.name() {
        context.insert("thread".to_string(), Value::String(name.to_string()));
    }

    broadcast(PANIC_BUCKET, panic_message(info), context);
    IN_DISPATCH.set(false);
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    info.payload()
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with non-string payload".to_string())
}

fn broadcast(bucket: &str, message: String, context: Map<String, Value>) {
    // Snapshot the live clients before enqueueing so the registry lock
    // is never held across buffer operations.
    let clients: Vec<Arc<ClientInner>> = {
        let mut registry = REGISTRY.lock();
        registry.retain(|(_, weak)| weak.strong_count() > 0);
        registry
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect()
    };

    for client in clients {
        client.enqueue(
            LogLevel::Error,
            LogOptions {
                bucket: bucket.to_string(),
                message: message.clone(),
                context: Some(context.clone()),
                ..LogOptions::default()
            },
        );
    }
}
