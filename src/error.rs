//! Error types for the vtab library.
//!
//! Almost everything in vtab degrades rather than fails: unparseable input
//! becomes `error` attribute events in the output stream (see `parser`).
//! The hard errors below are limited to constructing the supporting data
//! types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VtabError {
    /// A pitch name that does not match scientific pitch notation:
    /// a letter `A`-`G`, an optional `#` or `b`, and an octave digit.
    #[error("Invalid pitch name: '{0}'")]
    InvalidPitch(String),

    /// A tuning name with no built-in definition.
    #[error("Unknown tuning: '{0}' (expected 'standard' or 'bass')")]
    UnknownTuning(String),
}
