//! Data model of the analysis.
//!
//! An SBOM document is turned into a [`ComponentGraph`]: an ordered map of
//! [`ComponentNode`]s keyed by [`ComponentId`], each carrying its edges, its
//! direct and transitive [`VulnerabilityList`]s and its worst direct
//! [`Severity`].

mod component;
mod graph;
mod metadata;
mod severity;
mod vulnerability;

pub use component::*;
pub use graph::*;
pub use metadata::*;
pub use severity::*;
pub use vulnerability::*;
