//! Core engine — the sample → record → predict → settle loop.

pub mod sequence;
pub mod ledger;
pub mod session;
pub mod timer;
