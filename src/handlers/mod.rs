pub mod bookings;
pub mod jobs;
pub mod notifications;
pub mod profiles;
pub mod properties;
pub mod ratings;
