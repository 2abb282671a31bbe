pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod paths;
pub mod registry;
pub mod service;
pub mod transfer;
pub mod utils;
pub mod watcher;

pub use service::Service;
