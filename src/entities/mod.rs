pub mod account;
pub mod bike;
pub mod bike_stock;
pub mod brand;
pub mod payment;
pub mod rental;
pub mod renter;
pub mod station;
pub mod station_staff;
