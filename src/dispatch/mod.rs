//! Event-to-transfer dispatch
//!
//! Decides, per watch event, whether a transfer runs and with which rule.

pub mod dispatcher;
pub mod results;
pub mod settle;

pub use dispatcher::{DispatchMode, MAX_WORKERS, TransferDispatcher};
pub use results::DispatchResult;
pub use settle::wait_until_settled;
