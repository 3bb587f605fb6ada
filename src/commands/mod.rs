pub mod command;
pub mod common;
pub mod stats;
pub mod validate;
