//! Transports carrying JSON-RPC messages to and from clients.

pub mod framing;
pub mod sse;
pub mod stdio;

pub use sse::SseTransport;
pub use stdio::StdioTransport;
