//! HTTP surface and background worker for the Fieldbook scheduling core.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
pub mod middleware;
pub mod payments_handler;
pub mod worker;
