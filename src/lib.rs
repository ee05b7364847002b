pub mod config;
pub mod db;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod reply;
pub mod server;
