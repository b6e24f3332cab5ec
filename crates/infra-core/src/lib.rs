pub mod config;
pub mod context;
pub mod convert;
pub mod detect;
pub mod error;
pub mod git;
pub mod io;
pub mod models;
pub mod paths;
pub mod services;
pub mod state;
pub mod terraform;
pub mod types;

pub use error::{InfraError, Result};
