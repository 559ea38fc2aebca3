pub mod adapters;
pub mod config;
pub mod core;
pub mod storage;

#[cfg(test)]
#[path = "tests/test.rs"]
mod tests;
