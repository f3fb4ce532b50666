//! toolbox-mcp — MCP server exposing clock, calculator, and
//! shared-memory tools over SSE and stdio transports.

pub mod calc;
pub mod config;
pub mod protocol;
pub mod session;
pub mod store;
pub mod tools;
pub mod transport;
pub mod types;

pub use protocol::ProtocolHandler;
pub use session::SessionRegistry;
pub use store::MemoryStore;
pub use tools::ToolRegistry;
pub use transport::{SseTransport, StdioTransport};
