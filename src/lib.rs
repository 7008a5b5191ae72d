// Library exports for the jobmail crate
// This allows tests and the binary to use the modules

pub mod classifier;
pub mod config;
pub mod date_utils;
pub mod email;
pub mod error;
pub mod gmail_client;
pub mod metadata_extractor;
pub mod pipeline;
pub mod status_update;
