mod text;
mod types;

pub use text::*;
pub use types::*;

/// Error types for the NVM module.
#[derive(Debug, thiserror::Error)]
pub enum NvmError {
    /// Error reading the file
    #[error("error reading NVM file")]
    Io(#[from] std::io::Error),

    /// Malformed or unexpected NVM structure
    #[error("NVM format error at line {line}: {message}")]
    Format {
        /// 1-based line number of the offending record, 0 at end of file
        line: usize,
        /// What was wrong with the record
        message: String,
    },
}

impl NvmError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}
