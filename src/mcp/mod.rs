//! MCP 工具层
//!
//! 通过 JSON-RPC 2.0 暴露积分查询、对比、排行榜和健康检查，
//! 支持 stdio 与 HTTP (`POST /mcp`) 两种传输。

mod handler;
pub mod protocol;
pub mod resources;
pub mod tools;
pub mod transport;

pub use handler::{McpHandler, SERVER_NAME};
pub use transport::{serve_lines, serve_stdio};
