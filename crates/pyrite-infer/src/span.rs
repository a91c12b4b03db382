//! Source locations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line/column position of a construct in its source file (1-based line, 0-based column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Placeholder for synthesized constructs
    pub const DUMMY: Span = Span { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_dummy(&self) -> bool {
        *self == Self::DUMMY
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
