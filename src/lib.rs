pub mod config;
pub mod domain;
pub mod poller;
pub mod shutdown;
pub mod utils;
