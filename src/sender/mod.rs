pub mod client;
pub mod payload;
pub mod transport;

pub use client::{HttpClient, TransportConfig};
pub use payload::BatchPayload;
pub use transport::{RetryConfig, Transport, TransportError};
