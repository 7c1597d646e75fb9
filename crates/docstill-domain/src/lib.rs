//! Docstill Domain Layer
//!
//! This crate contains the core data model for docstill: the typed field
//! tree produced by document extraction, the options and metadata that
//! travel with it, and the trait seams other layers implement.
//!
//! ## Key Concepts
//!
//! - **Field**: a leaf value extracted from a document, with confidence
//!   and optional on-page position
//! - **ExtractedNode**: the recursive tree - a field, an array of nodes,
//!   or an order-preserving record of named nodes
//! - **ExtractionOptions**: per-request switches (confidence, positions,
//!   document-type detection, temperature)
//! - **ExtractionMetadata**: immutable provenance for one pipeline run
//!
//! ## Architecture
//!
//! Infrastructure implementations (model providers, the pipeline itself)
//! live in other crates; this crate defines the shapes and the
//! `ModelProvider` trait they plug into.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod metadata;
pub mod node;
pub mod options;
pub mod traits;

// Re-exports for convenience
pub use field::{Field, FieldValue, Position, PositionError};
pub use metadata::{ExtractionId, ExtractionMetadata};
pub use node::ExtractedNode;
pub use options::ExtractionOptions;
pub use traits::{DocumentPart, ModelProvider, ModelRequest};
