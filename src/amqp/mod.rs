pub mod blower;
pub mod commands;
pub mod error;
pub mod session;
pub mod sucker;
pub mod worker;
