//! K-Means partitioning engine
//!
//! Clusters customers on min-max normalized features. A run normalizes the
//! points into the unit cube, seeds `k` centroids uniformly at random inside
//! that cube, then alternates nearest-centroid assignment with mean updates
//! until no label changes or the iteration cap is reached.
//!
//! Centroids are seeded from the unit cube rather than from the data points
//! (no forgy or k-means++ sampling). That keeps the engine simple and matches
//! the dashboard it reproduces; it also means a centroid can start far from
//! every point and end a run with no members.

use crate::data::{feature_matrix, Customer};
use crate::error::PartitionError;
use anyhow::bail;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of customer segments used when none is given
pub const DEFAULT_CLUSTERS: usize = 5;

/// Iteration cap used when none is given
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Per-dimension minimum and maximum of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationBounds {
    pub mins: Array1<f64>,
    pub maxs: Array1<f64>,
}

impl NormalizationBounds {
    /// Compute bounds column by column
    pub fn fit(points: &ArrayView2<f64>) -> Self {
        let mins = points.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
        let maxs = points.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
        Self { mins, maxs }
    }

    pub fn dimensions(&self) -> usize {
        self.mins.len()
    }

    /// Rescale every point to `[0, 1]`; constant dimensions map to 0
    pub fn normalize(&self, points: &ArrayView2<f64>) -> Array2<f64> {
        let mut normalized = points.to_owned();
        for mut row in normalized.outer_iter_mut() {
            self.rescale(row.iter_mut());
        }
        normalized
    }

    /// Rescale a single point with these bounds
    ///
    /// Values outside the fitted range are not clamped.
    pub fn normalize_point(&self, point: &[f64]) -> Array1<f64> {
        let mut normalized = Array1::from(point.to_vec());
        self.rescale(normalized.iter_mut());
        normalized
    }

    fn rescale<'a>(&self, values: impl Iterator<Item = &'a mut f64>) {
        for ((value, &min), &max) in values.zip(self.mins.iter()).zip(self.maxs.iter()) {
            let range = max - min;
            *value = if range == 0.0 { 0.0 } else { (*value - min) / range };
        }
    }
}

/// Outcome of one partitioning run
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// Cluster label per input point, index-aligned with the input
    pub labels: Vec<usize>,
    /// Number of clusters requested
    pub n_clusters: usize,
    /// Assignment passes performed
    pub iterations: usize,
    /// True when the last pass left every label unchanged
    pub converged: bool,
    /// Final centroids in normalized space
    pub centroids: Array2<f64>,
    /// Bounds used to normalize the input
    pub bounds: NormalizationBounds,
}

impl ClusterAssignment {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Member count per cluster, including clusters that ended up empty
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Nearest final centroid for a point that is already normalized
    pub fn nearest_cluster(&self, normalized: ArrayView1<f64>) -> usize {
        nearest_centroid(&normalized, &self.centroids.view())
    }
}

/// K-Means engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    /// Number of clusters
    pub k: usize,
    /// Upper bound on assignment passes
    pub max_iterations: usize,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTERS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Partitioner {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Partition with a generator seeded from OS entropy
    pub fn partition(&self, points: ArrayView2<f64>) -> Result<ClusterAssignment, PartitionError> {
        let mut rng = ChaCha8Rng::from_entropy();
        self.partition_with_rng(points, &mut rng)
    }

    /// Partition reproducibly: equal seeds give equal assignments
    pub fn partition_seeded(
        &self,
        points: ArrayView2<f64>,
        seed: u64,
    ) -> Result<ClusterAssignment, PartitionError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.partition_with_rng(points, &mut rng)
    }

    /// Run k-means on `points` (one row per entity), drawing the initial
    /// centroids from `rng`
    ///
    /// # Errors
    /// * `InvalidInput` if there are no points, no dimensions, `k == 0` or
    ///   `max_iterations == 0`
    pub fn partition_with_rng<R: Rng>(
        &self,
        points: ArrayView2<f64>,
        rng: &mut R,
    ) -> Result<ClusterAssignment, PartitionError> {
        self.validate(&points)?;

        let bounds = NormalizationBounds::fit(&points);
        let normalized = bounds.normalize(&points);
        let mut centroids = initialize_centroids(self.k, points.ncols(), rng);

        // The zero baseline means a first pass that lands everything in
        // cluster 0 already counts as converged.
        let mut labels = vec![0; points.nrows()];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            if !assign_clusters(&normalized.view(), &centroids.view(), &mut labels) {
                converged = true;
                break;
            }
            // Centroids are left untouched after the final permitted pass so
            // they stay consistent with the returned labels.
            if iterations < self.max_iterations {
                update_centroids(&normalized.view(), &labels, &mut centroids);
            }
        }

        Ok(ClusterAssignment {
            labels,
            n_clusters: self.k,
            iterations,
            converged,
            centroids,
            bounds,
        })
    }

    fn validate(&self, points: &ArrayView2<f64>) -> Result<(), PartitionError> {
        if self.k == 0 {
            return Err(PartitionError::InvalidInput(
                "k must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PartitionError::InvalidInput(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if points.nrows() == 0 {
            return Err(PartitionError::InvalidInput(
                "cannot partition an empty point set".to_string(),
            ));
        }
        if points.ncols() == 0 {
            return Err(PartitionError::InvalidInput(
                "points must have at least one dimension".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stack equal-length rows into a point matrix
pub fn dataset_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>, PartitionError> {
    let first = rows.first().ok_or_else(|| {
        PartitionError::InvalidInput("cannot partition an empty point set".to_string())
    })?;
    let dims = first.len();
    if dims == 0 {
        return Err(PartitionError::InvalidInput(
            "points must have at least one dimension".to_string(),
        ));
    }
    if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != dims) {
        return Err(PartitionError::InvalidInput(format!(
            "point {} has {} dimensions, expected {}",
            index,
            row.len(),
            dims
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), dims), flat)
        .map_err(|e| PartitionError::InvalidInput(e.to_string()))
}

/// Partition a list of feature vectors into `k` clusters
///
/// Returns one label in `[0, k)` per input vector.
pub fn partition<R: Rng>(
    points: &[Vec<f64>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Vec<usize>, PartitionError> {
    let dataset = dataset_from_rows(points)?;
    let assignment = Partitioner::new(k)
        .with_max_iterations(max_iterations)
        .partition_with_rng(dataset.view(), rng)?;
    Ok(assignment.labels)
}

/// Cluster customers on age, annual income and spending score
///
/// A `seed` makes the run reproducible; without one every call draws fresh
/// initial centroids.
pub fn segment_customers(
    customers: &[Customer],
    partitioner: &Partitioner,
    seed: Option<u64>,
) -> crate::Result<ClusterAssignment> {
    let features = feature_matrix(customers);
    let assignment = match seed {
        Some(seed) => partitioner.partition_seeded(features.view(), seed)?,
        None => partitioner.partition(features.view())?,
    };
    Ok(assignment)
}

/// Segment a new customer from raw `[age, income, spending]` values
pub fn predict_cluster(assignment: &ClusterAssignment, values: &[f64]) -> crate::Result<usize> {
    let dims = assignment.bounds.dimensions();
    if values.len() != dims {
        bail!(
            "Feature vector must have exactly {} values, got {}",
            dims,
            values.len()
        );
    }

    let normalized = assignment.bounds.normalize_point(values);
    Ok(assignment.nearest_cluster(normalized.view()))
}

/// Draw `k` centroids uniformly from the `[0, 1)` unit cube, centroid by centroid
pub(crate) fn initialize_centroids<R: Rng>(k: usize, dims: usize, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_simple_fn((k, dims), || rng.gen::<f64>())
}

/// Reassign every point; returns whether any label changed
fn assign_clusters(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
    labels: &mut [usize],
) -> bool {
    let mut changed = false;
    for (point, label) in data.outer_iter().zip(labels.iter_mut()) {
        let nearest = nearest_centroid(&point, centroids);
        if nearest != *label {
            changed = true;
            *label = nearest;
        }
    }
    changed
}

/// Index of the closest centroid; the first one wins on ties
fn nearest_centroid(point: &ArrayView1<f64>, centroids: &ArrayView2<f64>) -> usize {
    let mut min_distance = f64::INFINITY;
    let mut closest = 0;

    for (index, centroid) in centroids.outer_iter().enumerate() {
        let distance = euclidean_distance(point, &centroid);
        if distance < min_distance {
            min_distance = distance;
            closest = index;
        }
    }

    closest
}

/// Move each centroid to the mean of its members; empty clusters stay put
fn update_centroids(data: &ArrayView2<f64>, labels: &[usize], centroids: &mut Array2<f64>) {
    let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
    let mut counts = vec![0usize; centroids.nrows()];

    for (point, &label) in data.outer_iter().zip(labels) {
        counts[label] += 1;
        let mut sum = sums.row_mut(label);
        sum += &point;
    }

    for (index, &count) in counts.iter().enumerate() {
        if count > 0 {
            let mean = &sums.row(index) / count as f64;
            centroids.row_mut(index).assign(&mean);
        }
    }
}

fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
