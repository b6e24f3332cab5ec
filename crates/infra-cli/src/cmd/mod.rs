pub mod config;
pub mod init;
pub mod service;
pub mod state;
pub mod terraform;
pub mod util;
