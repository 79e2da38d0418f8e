//! Composable queries, one module per table.
//!
//! Every write that participates in a read-then-write sequence is expressed
//! as a conditional `UPDATE ... WHERE status = <expected>` and reports whether
//! it matched, so callers never rely on in-process locking.

pub mod booking;
pub mod outbox;
pub mod payment;
pub mod request;
pub mod review;
pub mod schedule;
pub mod slot;
pub mod technician;
