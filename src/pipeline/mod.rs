//! Pipeline orchestration for SBOM analysis.
//!
//! Runs normalize → build graph → map vulnerabilities → propagate →
//! materialize → summarize over one document. Entry points differ only in
//! where the document comes from and how a bad document is reported:
//!
//! | Function | Input | Non-object document |
//! |----------|-------|---------------------|
//! | [`analyze`], [`analyze_with_config`] | `&Value` | empty analysis, warning logged |
//! | [`analyze_document`] | `&Value` | `Err` |
//! | [`analyze_str`] | JSON text | `Err` |
//! | [`analyze_file`] | path | `Err` with path context |
//! | [`analyze_batch`] | `&[Value]` | empty analysis per bad document |

mod analyze;
mod parse;

pub use analyze::{
    analyze, analyze_batch, analyze_document, analyze_str, analyze_with_config, SbomAnalysis,
};
pub use parse::analyze_file;
