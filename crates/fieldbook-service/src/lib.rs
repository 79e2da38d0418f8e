//! Scheduling and booking allocation services.
//!
//! Each module exposes plain async functions over a pooled connection. All
//! exclusivity comes from conditional writes in Postgres, so any number of
//! stateless workers may call these concurrently.

pub mod allocation;
pub mod availability;
pub mod error;
pub mod finder;
pub mod identity;
pub mod ledger;
pub mod lifecycle;
pub mod notify;
pub mod payment;
pub mod profile;
pub mod rules;
pub mod view;
