//! Logical to physical table name mapping.

/// Maps the short table names callers use to the physical names in the
/// store by wrapping them in a fixed prefix and suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableNameMapper {
    prefix: String,
    suffix: String,
}

impl TableNameMapper {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn long_name(&self, short_name: &str) -> String {
        format!("{}{}{}", self.prefix, short_name, self.suffix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}
