#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_lossless,            // Infallible casts are clear enough with `as`
    clippy::cast_possible_truncation, // Safe within realistic value bounds (durations, sizes)
    clippy::cast_precision_loss,      // Acceptable for backoff jitter math
    clippy::cast_sign_loss,           // Safe where values are known non-negative
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. BatchBuffer in buffer module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod bridge;
pub mod buffer;
pub mod client;
pub mod config;
pub mod domain;
pub mod sender;

// Re-export main types for easy access
pub use bridge::report_unhandled_error;
pub use client::GunsoleClient;
pub use config::{ClientOptions, Config, ConfigError, Mode};
pub use domain::{LogLevel, LogOptions, LogRecord, UserInfo};
pub use sender::{RetryConfig, TransportConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
