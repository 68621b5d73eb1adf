pub mod booking;
pub mod notification;
pub mod profile;
pub mod property;
pub mod rating;
