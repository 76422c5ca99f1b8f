pub mod error;
pub mod output_macros;
pub mod user_paths;

pub use error::{NexusError, Result};
