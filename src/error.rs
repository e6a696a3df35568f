//! Error types for the renderer

use thiserror::Error;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering a job
///
/// Every variant is terminal for the job it came from. The binary maps each
/// one to a distinct process exit status via [`Error::exit_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// The engine (browser or rasterizer) could not be acquired
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// The input document is missing or could not be parsed
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// Rasterization or PNG encoding failed
    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    /// The output file could not be written
    #[error("Failed to write output: {0}")]
    WriteError(String),

    /// Invalid job configuration (dimensions, basename, config file)
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Process exit status for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigError(_) => 2,
            Error::LoadError(_) => 3,
            Error::EncodeError(_) => 4,
            Error::WriteError(_) => 5,
            Error::InitializationError(_) => 6,
            #[cfg(feature = "cdp")]
            Error::CdpError(_) => 1,
            Error::Other(_) => 1,
        }
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_nonzero_and_distinct_per_taxonomy() {
        let errors = [
            Error::ConfigError("w".into()),
            Error::LoadError("l".into()),
            Error::EncodeError("e".into()),
            Error::WriteError("w".into()),
            Error::InitializationError("i".into()),
        ];
        let codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        let mut dedup = codes.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), codes.len());
        assert_eq!(Error::Other("x".into()).exit_code(), 1);
    }

    #[test]
    fn messages_carry_context() {
        let e = Error::LoadError("page.html: No such file or directory".into());
        assert_eq!(e.to_string(), "Failed to load document: page.html: No such file or directory");
    }
}
