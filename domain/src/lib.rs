pub mod codes;
pub mod models;
pub mod ports;
