//! Client lifecycle: construction, the logging entry points, user and
//! session state, flush on demand, and teardown.
//!
//! Every caller-facing operation except construction runs behind a
//! uniform fault barrier: internal failures degrade to a no-op plus a
//! `tracing` diagnostic, never to an error or panic in the host. Only an
//! unusable configuration is allowed to fail, synchronously, at
//! construction.

mod enrich;
mod scheduler;

use crate::bridge::{self, BridgeRegistration};
use crate::buffer::{Batch, BatchBuffer};
use crate::config::{ClientOptions, Config, ConfigError};
use crate::domain::{LogLevel, LogOptions, UserInfo};
use crate::sender::{HttpClient, Transport};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Shared core of one client instance. Producers (logging calls, the
/// error bridge) and the flush scheduler all act on this through an
/// `Arc`.
pub struct ClientInner {
    config: Config,
    buffer: BatchBuffer,
    transport: Transport,
    user: RwLock<Option<UserInfo>>,
    session_id: RwLock<Option<String>>,
    handle: Handle,
    shutdown: CancellationToken,
    destroyed: AtomicBool,
    pub(crate) bridge: Mutex<BridgeRegistration>,
    id: u64,
}

impl ClientInner {
    pub(crate) fn bridge_id(&self) -> u64 {
        self.id
    }

    /// Enrich and buffer one entry; request a flush when the buffer
    /// reached the configured batch size. Non-suspending, and never
    /// raises to the caller.
    pub(crate) fn enqueue(&self, level: LogLevel, options: LogOptions) {
        if self.destroyed.load(Ordering::SeqCst) {
            return;
        }
        fault_barrier("enqueue", || {
            let user_id = self.user.read().as_ref().map(|user| user.id.clone());
            let session_id = self.session_id.read().clone();
            let record = enrich::build_record(&self.config, user_id, session_id, level, options);
            if self.buffer.append(record) {
                self.request_flush();
            }
            Ok(())
        });
    }

    /// Swap out the buffer and hand the batch to a fire-and-forget
    /// delivery. The swap happens synchronously on the calling thread,
    /// so a size-triggered flush captures exactly the records that
    /// filled the batch.
    pub(crate) fn request_flush(&self) {
        let records = self.buffer.swap_and_clear();
        if records.is_empty() {
            return;
        }
        let transport = self.transport.clone();
        let batch = Batch::new(records);
        self.handle.spawn(async move {
            transport.send_batch(batch).await;
        });
    }

    async fn flush_now(&self) {
        let records = self.buffer.swap_and_clear();
        if records.is_empty() {
            return;
        }
        self.transport.send_batch(Batch::new(records)).await;
    }
}

/// Gunsole telemetry client.
///
/// Construct one per application; log at four severities; delivery is
/// buffered, batched, and retried in the background. Under sustained
/// network failure the application observes nothing: logs silently stop
/// being delivered.
pub struct GunsoleClient {
    inner: Arc<ClientInner>,
}

impl GunsoleClient {
    /// Resolve the configuration and start the client (empty buffer,
    /// flush scheduler running, error bridge detached).
    ///
    /// Must be called inside a tokio runtime; the scheduler and
    /// background deliveries are spawned on it.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
        let config = options.resolve()?;
        let handle = Handle::try_current().map_err(|_| {
            ConfigError::Runtime(
                "a gunsole client must be constructed inside a tokio runtime".to_string(),
            )
        })?;

        let http = HttpClient::new(&config.endpoint, config.api_key.clone(), &config.transport)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        let transport = Transport::new(
            http,
            config.project_id.clone(),
            config.transport.retry.clone(),
        );

        let batch_size = config.batch_size;
        let flush_interval = config.flush_interval;
        let shutdown = CancellationToken::new();
        let inner = Arc::new(ClientInner {
            config,
            buffer: BatchBuffer::new(batch_size),
            transport,
            user: RwLock::new(None),
            session_id: RwLock::new(None),
            handle: handle.clone(),
            shutdown: shutdown.clone(),
            destroyed: AtomicBool::new(false),
            bridge: Mutex::new(BridgeRegistration::default()),
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
        });

        scheduler::spawn(&handle, Arc::downgrade(&inner), flush_interval, shutdown);

        Ok(Self { inner })
    }

    /// Log an info-level entry. Alias for [`GunsoleClient::info`].
    pub fn log(&self, options: LogOptions) {
        self.inner.enqueue(LogLevel::Info, options);
    }

    pub fn debug(&self, options: LogOptions) {
        self.inner.enqueue(LogLevel::Debug, options);
    }

    pub fn info(&self, options: LogOptions) {
        self.inner.enqueue(LogLevel::Info, options);
    }

    pub fn warn(&self, options: LogOptions) {
        self.inner.enqueue(LogLevel::Warn, options);
    }

    pub fn error(&self, options: LogOptions) {
        self.inner.enqueue(LogLevel::Error, options);
    }

    /// Replace the current user wholesale. Records already enqueued keep
    /// the snapshot they were built with.
    pub fn set_user(&self, user: UserInfo) {
        if self.inner.destroyed.load(Ordering::SeqCst) {
            return;
        }
        fault_barrier("set_user", || {
            *self.inner.user.write() = Some(user);
            Ok(())
        });
    }

    pub fn set_session_id(&self, session_id: impl Into<String>) {
        if self.inner.destroyed.load(Ordering::SeqCst) {
            return;
        }
        let session_id = session_id.into();
        fault_barrier("set_session_id", || {
            *self.inner.session_id.write() = Some(session_id);
            Ok(())
        });
    }

    /// Start converting uncaught host errors into error-level records.
    /// Idempotent: a second attach never duplicates registrations.
    pub fn attach_error_bridge(&self) {
        if self.inner.destroyed.load(Ordering::SeqCst) {
            return;
        }
        fault_barrier("attach_error_bridge", || {
            bridge::attach(&self.inner);
            Ok(())
        });
    }

    /// Stop converting uncaught host errors. A no-op when already
    /// detached; never fails.
    pub fn detach_error_bridge(&self) {
        fault_barrier("detach_error_bridge", || {
            bridge::detach(&self.inner);
            Ok(())
        });
    }

    pub fn error_bridge_attached(&self) -> bool {
        self.inner.bridge.lock().is_attached()
    }

    /// Flush pending records now. Always resolves, never errors; the
    /// delivery outcome is observable only through `tracing`
    /// diagnostics.
    pub async fn flush(&self) {
        if self.inner.destroyed.load(Ordering::SeqCst) {
            return;
        }
        if AssertUnwindSafe(self.inner.flush_now())
            .catch_unwind()
            .await
            .is_err()
        {
            debug!(operation = "flush", "internal fault suppressed: panic");
        }
    }

    /// Tear the client down: stop the flush scheduler, force the error
    /// bridge detached, and issue one final best-effort flush. Terminal
    /// and idempotent; every subsequent operation is a silent no-op. An
    /// in-flight delivery retry sequence runs to completion on its own.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.shutdown.cancel();
        fault_barrier("destroy", || {
            bridge::detach(&self.inner);
            Ok(())
        });
        self.inner.request_flush();
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

/// Uniform fault barrier for caller-facing operations: catches panics
/// and internal errors, reduces them to a diagnostic emission, and lets
/// the host continue untouched.
fn fault_barrier<T>(
    operation: &'static str,
    f: impl FnOnce() -> Result<T, anyhow::Error>,
) -> Option<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            debug!(operation, %error, "internal fault suppressed");
            None
        }
        Err(_) => {
            debug!(operation, "internal fault suppressed: panic");
            None
        }
    }
}
