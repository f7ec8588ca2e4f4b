pub mod label;
pub mod repo;
pub mod server;
