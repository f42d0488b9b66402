//! Analysis options.

use crate::render::PageSelection;

/// Options for analyzing a template.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    /// Run per-page association on the rayon pool
    pub parallel: bool,

    /// Pages to analyze; unselected pages contribute no candidates
    pub pages: PageSelection,
}

impl AnalyzeOptions {
    /// Create new analyze options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            pages: PageSelection::All,
        }
    }
}
