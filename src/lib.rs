//! `keepsake`: personalized greeting links and phase countdowns.
//!
//! The library encodes recipient names into share-link tokens, evaluates
//! time-phased experiences against a set of target instants, and drives
//! them with a once-per-second scheduler.

pub mod cli;
pub mod config;
pub mod error;
pub mod link;
pub mod observability;
pub mod phase;
pub mod shape;
