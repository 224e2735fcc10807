//! CLI error handling with user-friendly messages.
//!
//! Every failure ends the process with status 1. Usage errors also print
//! the usage line so the user sees what was expected.

use std::fmt;
use std::process;

use etcpak::compress::CompressError;
use etcpak::container::ContainerError;
use etcpak::image_io::ImageIoError;
use etcpak::quality::QualityError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Missing or inconsistent arguments
    Usage { message: String, usage: String },
    /// Failed to initialize logging
    LoggingInit(String),
    /// Failed to read or write a raw image
    Image(ImageIoError),
    /// Failed to read or write a compressed container
    Container(ContainerError),
    /// Compression pipeline failure
    Compress(CompressError),
    /// Quality measurement failure
    Quality(QualityError),
}

impl CliError {
    /// Exit the process with an error message and status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Usage { usage, .. } = self {
            eprintln!();
            eprintln!("{}", usage);
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage { message, .. } => write!(f, "{}", message),
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Image(e) => write!(f, "{}", e),
            CliError::Container(e) => write!(f, "Container error: {}", e),
            CliError::Compress(e) => write!(f, "Compression failed: {}", e),
            CliError::Quality(e) => write!(f, "Quality measurement failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Image(e) => Some(e),
            CliError::Container(e) => Some(e),
            CliError::Compress(e) => Some(e),
            CliError::Quality(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ImageIoError> for CliError {
    fn from(e: ImageIoError) -> Self {
        CliError::Image(e)
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        CliError::Container(e)
    }
}

impl From<CompressError> for CliError {
    fn from(e: CompressError) -> Self {
        CliError::Compress(e)
    }
}

impl From<QualityError> for CliError {
    fn from(e: QualityError) -> Self {
        CliError::Quality(e)
    }
}
