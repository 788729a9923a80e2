use std::fmt;

/// Conditions that end the command loop, each mapped to a process exit code
#[derive(Debug)]
pub enum ConsoleError {
    /// Console input or output failed (exit code 2)
    Io(std::io::Error),
    /// Browser or WebDriver could not be started (exit code 4)
    LaunchFailed(String),
    /// Operation timeout (exit code 5)
    Timeout(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl ConsoleError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ConsoleError::Io(_) => 2,
            ConsoleError::LaunchFailed(_) => 4,
            ConsoleError::Timeout(_) => 5,
            ConsoleError::Other(_) => 1,
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Io(err) => write!(f, "Console I/O failed: {}", err),
            ConsoleError::LaunchFailed(msg) => write!(f, "Browser launch failed: {}", msg),
            ConsoleError::Timeout(msg) => write!(f, "Operation timed out: {}", msg),
            ConsoleError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsoleError::Io(err) => Some(err),
            ConsoleError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Io(err)
    }
}

impl From<anyhow::Error> for ConsoleError {
    fn from(err: anyhow::Error) -> Self {
        // Classify by message, the launcher reports through anyhow context chains
        let msg = format!("{:#}", err);

        if msg.contains("Failed to connect to WebDriver")
            || msg.contains("WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            ConsoleError::LaunchFailed(msg)
        } else if msg.contains("timeout") || msg.contains("timed out") {
            ConsoleError::Timeout(msg)
        } else {
            ConsoleError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
