//! # pagepilot
#![allow(clippy::uninlined_format_args)]
//!
//! Interactive command console that drives a single browser page over WebDriver.
//!
//! Each console line is tokenized, parsed into a typed [`Intent`], gated on whether a
//! page has been loaded, and executed against the browser. Every command answers with a
//! [`DispatchResult`]: a success carrying an optional message and data, or a failure
//! carrying the error text. Only failing to start the browser ends the session.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Start an interactive session (Chrome, visible window)
//! pagepilot
//!
//! # Headless Firefox with a fixed viewport
//! pagepilot --browser firefox --headless --viewport 1280x800
//!
//! # Attach to an already running WebDriver server
//! pagepilot --webdriver-url http://localhost:4444
//!
//! # Run a script, stopping at the first failure
//! pagepilot --script checkout.txt --stop-on-error --output-dir artifacts
//! ```
//!
//! ## Console Commands
//!
//! ```text
//! > navigate https://example.com
//! Navigate to https://example.com/
//! {"url":"https://example.com/"}
//! > links info
//! Found 1 interactive elements
//! [0] <a> More information... -> https://www.iana.org/domains/example
//! > act 0
//! > print url
//! > input --text Email me@example.com --selector "#password" secret "Sign in"
//! > click --text Continue
//! > wait selector .results --state visible --timeout 5000
//! > show code --landing
//! > screenshot --landing
//! > move back
//! > exit
//! ```
//!
//! Element ids printed by `links` and `show elements` stay valid until the page changes.
//!
//! ## Library Usage
//!
//! ```no_run
//! use pagepilot::browser::BrowserFacade;
//! use pagepilot::config::ConsoleConfig;
//! use pagepilot::console::{Console, Mode};
//! use pagepilot::driver::WebDriverLauncher;
//!
//! # async fn example() -> Result<(), pagepilot::errors::ConsoleError> {
//! let config = ConsoleConfig {
//!     headless: true,
//!     ..ConsoleConfig::default()
//! };
//! let facade = BrowserFacade::new(Box::new(WebDriverLauncher::new(&config)), &config);
//! let mut console = Console::new(facade, config.format);
//!
//! let script = "navigate https://example.com\nprint title\n";
//! let mut output = Vec::new();
//! let summary = console.run(script.as_bytes(), &mut output, Mode::Batch).await?;
//! assert_eq!(summary.failed, 0);
//! console.shutdown().await?;
//! # Ok(())
//! # }
//! ```

/// Browser facade: navigation, element discovery and interaction
pub mod browser;

/// Command-line configuration and interaction timeouts
pub mod config;

/// Line loop and result rendering
pub mod console;

/// Readiness gate and intent execution
pub mod dispatch;

/// Page capability trait and its WebDriver implementation
pub mod driver;

/// Fatal errors and their exit codes
pub mod errors;

/// Typed commands
pub mod intent;

/// Per-verb command parsers
pub mod parser;

pub mod session;

pub mod tokenize;

/// Shared value types
pub mod types;

pub use console::{Console, Mode, RunSummary};
pub use dispatch::{BrowserController, DispatchResult, Dispatcher};
pub use errors::ConsoleError;
pub use intent::Intent;
pub use session::SessionState;
pub use types::{BrowserType, OutputFormat, ViewportSize};
