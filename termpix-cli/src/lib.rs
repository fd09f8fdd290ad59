// ABOUTME: Library exports for termpix CLI modules for testing and external use
// ABOUTME: Makes internal modules available to integration tests and benchmarks

pub mod cli;
pub mod cli_output;
pub mod config;
pub mod detection;
pub mod loader;
