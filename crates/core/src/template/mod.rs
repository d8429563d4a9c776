//! Transaction templates and their static read/write footprints.

pub mod display;
pub mod types;

pub use display::format_template_set;
