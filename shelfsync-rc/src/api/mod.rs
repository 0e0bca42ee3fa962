//! HTTP API handlers for shelfsync-rc

pub mod buildinfo;
pub mod health;
pub mod process;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use process::{not_found, process_data, process_routes};
