//! Integration tests against a live Postgres database and the HTTP router.

mod helpers;

mod allocation;
mod availability;
mod finder;
mod http;
mod ledger;
