pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod source;
pub mod table;

pub use config::Config;
pub use error::{ExportError, Result};
pub use pipeline::Pipeline;
pub use table::{Cell, Table};
