pub mod candidate;
pub mod code_host;
pub mod config;
pub mod report;
