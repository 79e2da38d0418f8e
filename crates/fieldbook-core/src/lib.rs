//! Domain types and pure scheduling rules shared by every Fieldbook crate.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod fee;
pub mod geo;
pub mod pending;
pub mod policy;
pub mod ranking;
pub mod types;
