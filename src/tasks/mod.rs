//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: purges expired in-process entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
