use alloc::string::String;

use derive_more::Display;

use crate::template::types::TemplateId;

/// Error returned when a template set cannot be analysed.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Error {
    /// A template reached the critical-cycle detector without an isolation
    /// level. Templates must be allocated (or tagged) before verification.
    #[display("template {name:?} ({template}) has no isolation level")]
    MissingIsolationLevel { template: TemplateId, name: String },
}

impl core::error::Error for Error {}
