//! # Contracts
//!
//! Frozen interface contracts shared by every pipeline crate: work items,
//! results, the worker and store traits, configuration and the error
//! taxonomy. Business crates depend on this crate only, reverse dependencies
//! are prohibited.
//!
//! ## Ordering Model
//! - `sequence` is assigned by the submitting client and is unique per pipeline
//! - FIFO holds per queue; completion order across dispatchers is not ordered

mod blueprint;
mod error;
mod item;
mod store;
mod worker;
mod worker_id;

pub use blueprint::*;
pub use error::*;
pub use item::*;
pub use store::*;
pub use worker::Worker;
pub use worker_id::WorkerId;
