//! Report document structure

use serde::{Deserialize, Serialize};

/// Title every report carries
pub const REPORT_TITLE: &str = "Code Analysis Report";

/// A titled block of normalized text. An empty title marks the lead section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub top_title: String,
    /// Display form of the source identifier
    pub source_label: String,
    pub sections: Vec<Section>,
}

impl Report {
    /// Markdown rendering: title, source heading, then one heading+paragraph per section
    pub fn to_markdown(&self) -> String {
        let mut doc = format!("# {}\n\n", self.top_title);

        if !self.source_label.is_empty() {
            doc.push_str(&format!("## File: {}\n\n", self.source_label));
        }

        for section in &self.sections {
            if !section.title.is_empty() {
                doc.push_str(&format!("### {}\n\n", section.title));
            }
            if !section.body.is_empty() {
                doc.push_str(&section.body);
                doc.push_str("\n\n");
            }
        }

        format!("{}\n", doc.trim_end())
    }
}
