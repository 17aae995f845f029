//! Turning run output into a sectioned report
//!
//! Free-text mode splits one long document on top-level `# ` headings.
//! Structured mode emits a fixed list of analysis categories from named outputs.

use std::collections::BTreeMap;

use crate::crew::executor::RunOutcome;
use crate::report::normalize::normalize;
use crate::report::types::{Report, Section, REPORT_TITLE};

/// Body used in structured mode when a category produced nothing
pub const MISSING_OUTPUT: &str = "No output available";

/// Categories rendered in structured mode, in report order: (output field, heading)
pub const STRUCTURED_CATEGORIES: [(&str, &str); 5] = [
    ("code_analysis_output", "Code Analysis Output"),
    ("security_analysis_output", "Security Analysis Output"),
    ("performance_analysis_output", "Performance Analysis Output"),
    ("code_test_output", "Test Coverage Output"),
    ("best_practices_output", "Best Practices Output"),
];

const HEADING_MARKER: &str = "# ";

/// Which synthesis strategy builds the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Split the aggregate text on top-level headings
    #[default]
    FreeText,
    /// One section per known analysis category
    Structured,
}

impl std::str::FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free-text" | "free_text" | "freetext" => Ok(Self::FreeText),
            "structured" => Ok(Self::Structured),
            other => Err(format!(
                "unknown report mode '{}' (free-text|structured)",
                other
            )),
        }
    }
}

/// What the synthesizer reads
#[derive(Debug, Clone, Copy)]
pub enum SynthesisInput<'a> {
    FreeText(&'a str),
    Structured(&'a BTreeMap<String, String>),
}

pub fn synthesize(input: SynthesisInput<'_>, source_label: &str) -> Report {
    let sections = match input {
        SynthesisInput::FreeText(text) => split_sections(text),
        SynthesisInput::Structured(outputs) => structured_sections(outputs),
    };

    Report {
        top_title: REPORT_TITLE.to_string(),
        source_label: source_label.to_string(),
        sections,
    }
}

/// Build the report for a finished run in the requested mode
pub fn synthesize_outcome(outcome: &RunOutcome, mode: ReportMode, source_label: &str) -> Report {
    match mode {
        ReportMode::FreeText => {
            synthesize(SynthesisInput::FreeText(&outcome.aggregate.text), source_label)
        }
        ReportMode::Structured => {
            let named = named_outputs(outcome);
            synthesize(SynthesisInput::Structured(&named), source_label)
        }
    }
}

/// Context output fields overlaid with every task's output
pub fn named_outputs(outcome: &RunOutcome) -> BTreeMap<String, String> {
    let mut named: BTreeMap<String, String> = outcome
        .context
        .fields()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    named.extend(outcome.outputs.to_map());
    named
}

/// Split on line-leading `# ` headings.
///
/// Text before the first heading becomes a lead section with an empty title and
/// is dropped when blank. Each chunk's first line is its title, the rest its body.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut chunks = text.split("\n# ");
    let lead = chunks.next().unwrap_or_default();

    // The very start of the text is a line boundary too
    let (lead, opening_chunk) = match lead.strip_prefix(HEADING_MARKER) {
        Some(chunk) => ("", Some(chunk)),
        None => (lead, None),
    };

    let mut sections = Vec::new();
    let lead_body = normalize(lead);
    if !lead_body.is_empty() {
        sections.push(Section::new("", lead_body));
    }

    for chunk in opening_chunk.into_iter().chain(chunks) {
        if chunk.trim().is_empty() {
            continue;
        }
        let (title, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
        sections.push(Section::new(title.trim(), normalize(body)));
    }

    sections
}

/// One section per category; blank or absent outputs get [`MISSING_OUTPUT`]
pub fn structured_sections(outputs: &BTreeMap<String, String>) -> Vec<Section> {
    STRUCTURED_CATEGORIES
        .iter()
        .map(|(field, heading)| {
            let body = outputs
                .get(*field)
                .map(|text| normalize(text))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| MISSING_OUTPUT.to_string());
            Section::new(*heading, body)
        })
        .collect()
}
