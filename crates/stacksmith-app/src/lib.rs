//! Stacksmith Application
//!
//! Command-line shell around the core state and the compositor.

mod app;
mod cli;
mod error;
mod file_ops;
mod session;

pub use app::run;
pub use cli::{Cli, MoveSpec, ViewportSize};
pub use error::{AppError, AppResult};
pub use session::Session;
