use std::fmt;

/// A rectangular region of one tab, written in A1 notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub tab: String,
    pub cells: String,
}

impl SheetRange {
    pub fn new(tab: impl Into<String>, cells: impl Into<String>) -> Self {
        Self {
            tab: tab.into(),
            cells: cells.into(),
        }
    }
}

impl fmt::Display for SheetRange {
    /// Renders `'<tab>'!<cells>`, doubling any single quote inside the tab name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'!{}", self.tab.replace('\'', "''"), self.cells)
    }
}
