//! Package model
//!
//! Names, versions and requirements, and the steps that turn
//! installed distributions into a catalog with consolidated constraints.

mod catalog;
mod consolidate;
mod metadata;
mod name;
pub mod requirement;
pub mod version;

pub use catalog::{Catalog, CatalogBuilder, PackageFilter};
pub use consolidate::{Consolidated, ConsolidatedRequirement, Consolidator, Dependent};
pub use metadata::{DistributionRecord, MetadataExtractor};
pub use name::canonicalize_name;
pub use requirement::{Requirement, RequirementError};
pub use version::{SpecifierError, SpecifierSet};
