// Data Map - Core Library
// Privacy inventory transforms: dedup, category normalization, filters,
// grouping and relatedness between systems. Used by the CLI, the terminal
// viewer and tests.

pub mod model;
pub mod category;
pub mod deduplication;
pub mod aggregation;
pub mod filters;
pub mod grouping;
pub mod relatedness;
pub mod schema;
pub mod dataset;
pub mod config;

// Re-export commonly used types
pub use model::{
    PrivacyDeclaration, System,
    load_systems, parse_systems, sample_systems,
};
pub use category::{extract_short_category, unique_data_categories};
pub use deduplication::{dedupe_by_key, dedupe_with_report, DeduplicationReport};
pub use aggregation::{unique_data_categories_list, unique_data_uses};
pub use filters::{
    apply_filters, filter_by_data_categories, filter_by_data_use, FilterSelection,
};
pub use grouping::{
    group_systems, ordered_group_keys, LayoutMode, SystemGroups, NO_DATA_USE,
};
pub use relatedness::{connections_for_focused, related_keys, CategoryIndex, Connection};
pub use schema::{validate_systems, Severity, ValidationIssue};
pub use dataset::Dataset;
pub use config::ViewConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
