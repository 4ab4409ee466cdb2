//! src/lib.rs
pub mod bench;
pub mod cli;
pub mod configuration;
pub mod counter;
pub mod counts;
pub mod error;
pub mod input;
pub mod master;
pub mod render;
pub mod report;
pub mod resources;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod tokenizer;
pub mod top;
pub mod worker;
