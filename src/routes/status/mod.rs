mod handler;
mod model;

pub use handler::{health, rate_limit_reset, reconnect_cache, status};
pub use model::{HealthResponse, StatusResponse};
