pub mod audit;
pub mod fuel;
pub mod handlers;
pub mod mailbox;
pub mod middleware;
pub mod routes;
pub mod vouchers;

pub use routes::create_router;

use serde::Serialize;

/// Error body shared by the API endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
