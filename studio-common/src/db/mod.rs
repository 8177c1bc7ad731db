//! Database schema, initialization and row models

pub mod init;
pub mod migrations;
pub mod models;
pub mod users;

pub use init::*;
pub use migrations::*;
pub use models::*;
