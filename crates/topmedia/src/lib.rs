//! Top Media Combiner core: turns column-mapped media-monitoring rows into
//! reviewed rows with resolved permalinks, group/outlet assignments and
//! suppression reasons.
//!
//! Stages run in a fixed order, each consuming only the outputs of the
//! stages before it:
//!
//! 1. [`normalizer`]: raw permalink to resolved URL.
//! 2. [`locale`]: non-US edition detection.
//! 3. [`outlet`]: group/outlet assignment.
//! 4. [`author`]: excluded-region journalist lookup.
//! 5. [`flags`]: duplicate detection and suppression reasons.
//!
//! [`pipeline::Pipeline`] wires them together for a batch.

pub mod author;
pub mod error;
pub mod flags;
pub mod locale;
pub mod normalizer;
pub mod outlet;
pub mod pipeline;
pub mod rules;
pub mod summary;
pub mod types;
mod urls;

pub use author::{AuthorExclusionSet, AuthorRecord};
pub use error::{ResolutionError, RulesError};
pub use normalizer::{HttpResolver, IdentityResolver, Normalizer, ResolverConfig, UrlResolver};
pub use outlet::{OutletMap, OutletMapEntry, OutletRecord};
pub use pipeline::{Pipeline, ReferenceData};
pub use rules::Rules;
pub use summary::RunSummary;
pub use types::{Assignment, MediaRow, Resolution, SourcePlatform, SuppressReason};
