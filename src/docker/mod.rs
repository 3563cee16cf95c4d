//! Docker operations module
//!
//! This module contains functionality for interacting with Docker:
//! - docker-compose invocations against the Laradock stack
//! - External process execution

pub mod compose;
pub mod runner;
