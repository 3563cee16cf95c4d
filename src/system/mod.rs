//! Host system integration
//!
//! - hosts file entries for project domains

pub mod hosts;
