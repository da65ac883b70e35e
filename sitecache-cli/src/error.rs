//! CLI error handling with user-friendly messages.

use sitecache::worker::WorkerError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to open the cache store
    Store(String),
    /// Failed to create the service
    ServiceCreation(WorkerError),
    /// Install or activation failed
    Install(WorkerError),
    /// A fetch through the gateway failed
    Fetch(WorkerError),
    /// No deployment installed in the cache store yet
    NeedsInstall,
    /// Failed to write an output file
    FileWrite { path: String, error: std::io::Error },
    /// Runtime failure while the gateway was resident
    Resident(String),
    /// Invalid command-line arguments
    Usage(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Store(_) => {
                eprintln!();
                eprintln!("Check that the cache directory exists and is writable,");
                eprintln!("or pass an explicit location with --cache-dir.");
            }
            CliError::Fetch(_) => {
                eprintln!();
                eprintln!("The URL was unreachable and nothing was cached for it.");
            }
            CliError::NeedsInstall => {
                eprintln!();
                eprintln!("Run 'sitecache install' to create a cache generation first.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Store(msg) => write!(f, "Failed to open cache store: {}", msg),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Install(e) => write!(f, "Install failed: {}", e),
            CliError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            CliError::NeedsInstall => write!(f, "No deployment found in the cache store"),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Resident(msg) => write!(f, "{}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ServiceCreation(e) | CliError::Install(e) | CliError::Fetch(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<WorkerError> for CliError {
    fn from(e: WorkerError) -> Self {
        CliError::ServiceCreation(e)
    }
}
