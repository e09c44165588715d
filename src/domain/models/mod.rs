pub mod area;
pub mod booking;
pub mod cancellation;
pub mod geo;
pub mod route;
pub mod schedule;
pub mod service;
pub mod slot;
pub mod subscription;
