pub mod config;
pub mod extract;
pub mod files;
pub mod loader;
pub mod warehouse;
