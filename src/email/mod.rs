pub mod common;
pub mod samples;

// Re-export commonly used items
pub use common::Email;
pub use samples::sample_emails;
