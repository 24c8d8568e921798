use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("one-wire bus error: {0}")]
    Bus(String),
    #[error("display error: {0}")]
    Display(String),
    #[error("gpio error: {0}")]
    Gpio(String),
}

/// Transport failures in the responder. None of these are recovered.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to accept connection")]
    Accept(#[source] io::Error),
    #[error("failed to read request")]
    Read(#[source] io::Error),
    #[error("failed to write response")]
    Write(#[source] io::Error),
}
