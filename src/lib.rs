// Everything the integration tests drive headlessly lives here; main.rs
// only adds the CLI and the terminal rendering on top.
pub mod app_dirs;
pub mod audio;
pub mod celebration;
pub mod config;
pub mod history;
pub mod mode;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod vocab;
