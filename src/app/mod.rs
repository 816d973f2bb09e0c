pub mod ports;
pub mod media_service;
