//! Functional core for prodhub.
//!
//! Everything in this crate is either plain data, a trait describing an
//! external collaborator, or a pure function over that data. I/O lives in
//! the `prodhub` crate.

pub mod auth;
pub mod calendar;
pub mod clock;
pub mod journal;
pub mod notes;
pub mod notifications;
pub mod record;
pub mod serde;
pub mod sharing;
pub mod storage;
pub mod tasks;
pub mod views;
