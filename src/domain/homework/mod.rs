pub mod client;
pub mod dto;
pub mod service;

pub use client::{PraktikumClient, SharedStatusApi, StatusApi};
pub use dto::{Homework, StatusResponse};
pub use service::parse_homework_status;
