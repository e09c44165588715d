pub mod cached;
pub mod http_geocoder;
