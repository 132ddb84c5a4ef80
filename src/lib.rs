//! QuickEdit media conversion library
//!
//! Converts, trims and jpegifies remotely hosted media attachments. Video and
//! animated output goes through an external `ffmpeg`; still images go
//! through the `image` crate. Every request is self-contained and cleans up
//! its own staging files.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, ConversionInteractor, DefaultAppContainer};
pub use domain::errors::{ConversionError, ErrorKind};
pub use domain::model::{CommandRequest, FilePayload, Reply};
pub use error::{QuickEditError, QuickEditResult};
