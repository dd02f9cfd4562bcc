//! JSON export of a segmentation run

use crate::model::ClusterAssignment;
use crate::stats::{ClusterSummary, Overview};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Everything the dashboard shows, in machine-readable form
#[derive(Debug, Serialize)]
pub struct SegmentationReport {
    pub generated_at: DateTime<Utc>,
    pub total_customers: usize,
    pub k: usize,
    pub max_iterations: usize,
    pub seed: Option<u64>,
    pub iterations: usize,
    pub converged: bool,
    pub cluster_sizes: Vec<usize>,
    pub overview: Overview,
    pub clusters: Vec<ClusterSummary>,
    pub insights: Vec<String>,
}

impl SegmentationReport {
    pub fn new(
        assignment: &ClusterAssignment,
        max_iterations: usize,
        seed: Option<u64>,
        overview: Overview,
        clusters: Vec<ClusterSummary>,
        insights: Vec<String>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            total_customers: assignment.len(),
            k: assignment.n_clusters,
            max_iterations,
            seed,
            iterations: assignment.iterations,
            converged: assignment.converged,
            cluster_sizes: assignment.cluster_sizes(),
            overview,
            clusters,
            insights,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> crate::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        tracing::info!(path = %path.display(), "segmentation report written");
        Ok(())
    }
}
