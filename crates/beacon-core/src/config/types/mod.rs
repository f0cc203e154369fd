mod certificate;
mod config;
mod headers;
mod log;

pub use certificate::*;
pub use config::*;
pub use headers::*;
pub use log::*;
