/*!
 * Structured Tracing
 * Subscriber setup and syscall spans using the tracing crate
 *
 * Records emitted through the `log` facade by the process and scheduler
 * code are bridged into the same subscriber.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Syscalls slower than this are reported at warn level
const SLOW_SYSCALL_MICROS: u128 = 10_000;

static NEXT_SYSCALL_ID: AtomicU64 = AtomicU64::new(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - KERNEL_TRACE_JSON: Enable JSON output (default: false)
///
/// Installing twice is a no-op.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("KERNEL_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "structured tracing initialized");
    }
}

/// Span around a single syscall, closed (and timed) on drop
pub struct SyscallSpan {
    span: tracing::Span,
    start: Instant,
    id: u64,
    name: &'static str,
}

impl SyscallSpan {
    pub fn new(name: &'static str, pid: u32) -> Self {
        let id = NEXT_SYSCALL_ID.fetch_add(1, Ordering::Relaxed);
        let span = span!(
            Level::DEBUG,
            "syscall",
            id = id,
            syscall = name,
            pid = pid,
            return_value = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            id,
            name,
        }
    }

    /// Sequence number of this call
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Record the value handed back to the caller
    pub fn record_return(&self, value: i64) {
        self.span.record("return_value", value);
    }
}

impl Drop for SyscallSpan {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_micros();
        self.span.record("duration_us", elapsed as u64);
        let _entered = self.span.enter();

        if elapsed > SLOW_SYSCALL_MICROS {
            warn!(id = self.id, syscall = self.name, duration_us = elapsed as u64, "slow syscall");
        } else {
            debug!(id = self.id, syscall = self.name, duration_us = elapsed as u64, "syscall completed");
        }
    }
}
