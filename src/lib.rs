pub mod backend;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod frame;
pub mod keyspace;
pub mod monitor;
pub mod server;
pub mod session;
pub mod utils;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
