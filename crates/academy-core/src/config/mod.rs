//! Configuration for the academy client

mod env_loader;
mod model;
pub mod timeouts;

pub use env_loader::{load_from_env, load_from_lookup};
pub use model::{ApiConfig, AppConfig, FirebaseConfig, QueryConfig};
