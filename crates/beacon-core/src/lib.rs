pub mod banner;
pub mod certificate;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod server;
pub mod tls;
