mod error;
mod handlers;
mod router;

pub use error::ApiError;
pub use router::{AppState, create_router};
