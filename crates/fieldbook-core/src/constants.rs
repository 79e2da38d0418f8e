/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const SCHEDULES_ROUTE_COMPONENT: &str = "schedules";
pub const SCHEDULES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SCHEDULES_ROUTE_COMPONENT);

pub const SLOTS_ROUTE_COMPONENT: &str = "slots";
pub const SLOTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SLOTS_ROUTE_COMPONENT);

pub const REQUESTS_ROUTE_COMPONENT: &str = "requests";
pub const REQUESTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", REQUESTS_ROUTE_COMPONENT);

pub const BOOKINGS_ROUTE_COMPONENT: &str = "bookings";
pub const BOOKINGS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", BOOKINGS_ROUTE_COMPONENT);

pub const PAYMENTS_ROUTE_COMPONENT: &str = "payments";
pub const PAYMENTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", PAYMENTS_ROUTE_COMPONENT);

pub const TECHNICIANS_ROUTE_COMPONENT: &str = "technicians";
pub const TECHNICIANS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", TECHNICIANS_ROUTE_COMPONENT);

/// Lowest and highest accepted review rating.
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
