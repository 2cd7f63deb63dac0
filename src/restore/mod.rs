//! Restoring persisted state from the backup store.
//!
//! The backup store is read-only from here: nothing is ever written back.

mod decision;
mod layout;

pub use decision::*;
pub use layout::*;
