//! SegmentForge: customer segmentation using K-Means clustering
//!
//! Loads a customer table (id, gender, age, annual income, spending score),
//! partitions customers on their normalized age, income and spending score,
//! and summarizes every segment with statistics, charts and marketing insights.

pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod report;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{feature_matrix, load_customers, Customer, Feature, Gender};
pub use error::PartitionError;
pub use model::{
    dataset_from_rows, partition, predict_cluster, segment_customers, ClusterAssignment,
    NormalizationBounds, Partitioner,
};
pub use report::SegmentationReport;
pub use stats::{generate_insights, summarize_clusters, ClusterSummary, Overview};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
