use alloc::string::String;
use core::fmt::{Display, Formatter, Result, Write};

use crate::template::types::{OperationKind, ProgramInstance, StaticOperation, TemplateSet};

impl Display for StaticOperation {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let tag = match self.kind {
            OperationKind::Read => 'r',
            OperationKind::Write => 'w',
            OperationKind::Update => 'u',
        };
        write!(f, "{tag}({})", self.key)
    }
}

/// `name[LEVEL]: op op ...`, with `?` in place of an unset level.
impl Display for ProgramInstance {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}[", self.name())?;
        match self.isolation_level() {
            Some(level) => write!(f, "{level}")?,
            None => f.write_char('?')?,
        }
        f.write_char(']')?;
        if !self.operations().is_empty() {
            f.write_char(':')?;
        }
        for op in self.operations() {
            write!(f, " {op}")?;
        }
        Ok(())
    }
}

/// Format a template set one template per line.
///
/// The output ends with a trailing newline unless the set is empty.
#[must_use]
pub fn format_template_set(templates: &TemplateSet) -> String {
    let mut output = String::new();
    for template in templates.templates() {
        let _ = writeln!(output, "{template}");
    }
    output
}
