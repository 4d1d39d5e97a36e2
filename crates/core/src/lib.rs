pub mod config;
pub mod error;
pub mod work_order;

pub use config::Config;
pub use error::*;
pub use work_order::*;
