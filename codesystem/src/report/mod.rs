//! Report synthesis and persistence

pub mod normalize;
pub mod synthesize;
pub mod types;
pub mod writer;

pub use normalize::normalize;
pub use synthesize::{
    named_outputs, split_sections, structured_sections, synthesize, synthesize_outcome,
    ReportMode, SynthesisInput, MISSING_OUTPUT, STRUCTURED_CATEGORIES,
};
pub use types::{Report, Section, REPORT_TITLE};
pub use writer::{artifact_file_name, ReportWriter};
