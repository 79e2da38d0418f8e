//! Postgres persistence for the Fieldbook scheduling core.

pub mod db;
pub mod error;
pub mod model;
