//! tests/api/main.rs
mod counting;
mod fanout;
mod helpers;
