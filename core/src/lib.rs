//! Instrument stored procedures with call and state hints.
//!
//! [`patch()`] inserts an `INSERT INTO <hint table>` before every point where a
//! routine can exit, [`depatch()`] removes those inserts again and
//! [`repatch()`] does both, upgrading older hint formats on the way.

pub mod patch;
pub mod resolve;
pub mod split;
pub mod stmt;
pub mod token;

pub use patch::{PatchOptions, PatchResult, PatchWarning, Patcher, depatch, patch, repatch};
pub use split::{Statement, split_statements};
