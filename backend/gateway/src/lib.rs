//! MathMentor HTTP Gateway
//!
//! Exposes tutor sessions over a small JSON API so the tutor can be driven
//! from a browser or any HTTP client.

pub mod api;
pub mod error;
pub mod server;
pub mod session_registry;

pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState};
pub use session_registry::{SessionRegistry, SharedSession};
