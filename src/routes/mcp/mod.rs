mod handler;

pub use handler::handle_mcp;
