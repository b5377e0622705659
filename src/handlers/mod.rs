pub mod admin;
pub mod auth;
pub mod public;
pub mod renter;
pub mod staff;
