//! Map errors to user-facing messages.

use crate::error::PipelineError;

pub fn map_error(err: &PipelineError) -> String {
    match err {
        PipelineError::Configuration(msg) => format!("Configuration error: {}", msg),
        PipelineError::Storage(e) => format!(
            "Storage error: {}\nCheck storage.store_path in your configuration.",
            e
        ),
    }
}
