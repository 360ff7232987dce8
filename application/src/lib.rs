pub mod definition_service;
pub mod formatter;
pub mod resources;
pub mod retrieval_service;
