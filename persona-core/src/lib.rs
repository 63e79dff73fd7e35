pub mod config;
pub mod corpus;
pub mod error;
pub mod error_utils;
pub mod types;

pub use config::*;
pub use corpus::*;
pub use error::*;
pub use error_utils::*;
pub use types::*;
