/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Kinds of publishable content. Each kind has its own table, its own admin
/// permissions and its own related-content pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Blog,
    CaseStudy,
}

impl ContentKind {
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Blog => "blogs",
            ContentKind::CaseStudy => "case_studies",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Blog => "Blog",
            ContentKind::CaseStudy => "Case study",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}
