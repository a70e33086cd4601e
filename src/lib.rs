pub mod camp;
pub mod config;
pub mod error;
pub mod output;
pub mod ranking;
pub mod store;

pub use error::{CampError, CampResult};
