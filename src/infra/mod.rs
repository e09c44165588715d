pub mod factory;
pub mod geocoding;
pub mod memory;
pub mod travel;
