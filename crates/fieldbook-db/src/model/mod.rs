pub mod booking;
pub mod outbox;
pub mod payment;
pub mod request;
pub mod review;
pub mod schedule;
pub mod technician;
