use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Task '{0}' is not a recurring template")]
    NotATemplate(String),

    #[error("Task not found: {0}")]
    NotFound(String),
}
