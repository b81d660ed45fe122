//! Testing utilities for the fleet console.
//!
//! - [`TestTerminal`]: headless terminal with text assertions that understand
//!   double-width (Hangul) cells
//! - [`InputSequence`]: scripted keyboard input

pub mod input;
pub mod terminal;

pub use input::InputSequence;
pub use terminal::TestTerminal;

/// Error types for testing operations.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type for testing operations.
pub type TestResult<T> = Result<T, TestError>;
