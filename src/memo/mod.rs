//! Memo Module
//!
//! Memo-required detection: directory lookup, Horizon data-entry check and
//! the validation state shown by the review screen.

mod check;
mod directory;
mod validator;

pub use check::*;
pub use directory::*;
pub use validator::*;
