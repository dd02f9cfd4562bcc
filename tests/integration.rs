//! Integration tests for SegmentForge

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use segmentforge::{
    feature_matrix, generate_insights, load_customers, partition, predict_cluster,
    segment_customers, summarize_clusters, Overview, PartitionError, Partitioner,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Create a test CSV file with three well separated customer groups
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "CustomerID,Genre,Age,Annual Income (k$),Spending Score (1-100)"
    )
    .unwrap();

    // Young, low income, high spending
    writeln!(file, "1,Female,19,15,85").unwrap();
    writeln!(file, "2,Male,21,16,80").unwrap();
    writeln!(file, "3,Female,23,18,88").unwrap();
    writeln!(file, "4,Female,20,17,82").unwrap();

    // Older, high income, low spending
    writeln!(file, "5,Male,58,120,10").unwrap();
    writeln!(file, "6,Male,62,115,12").unwrap();
    writeln!(file, "7,Female,60,118,8").unwrap();

    // Middle aged, middle income, middle spending
    writeln!(file, "8,Female,40,60,50").unwrap();
    writeln!(file, "9,Male,42,62,52").unwrap();
    writeln!(file, "10,Female,44,58,48").unwrap();

    file
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let customers = load_customers(test_file.path().to_str().unwrap()).unwrap();
    assert_eq!(customers.len(), 10);

    let assignment = segment_customers(&customers, &Partitioner::new(3), Some(7)).unwrap();
    assert_eq!(assignment.len(), 10);
    assert!(assignment.labels.iter().all(|&label| label < 3));
    assert!(assignment.iterations <= 100);

    let summaries = summarize_clusters(&customers, &assignment.labels).unwrap();
    let total: usize = summaries.iter().map(|s| s.count).sum();
    assert_eq!(total, 10);
    assert!(summaries.windows(2).all(|w| w[0].cluster < w[1].cluster));

    let insights = generate_insights(&summaries);
    assert_eq!(insights.len(), summaries.len());

    let sizes = assignment.cluster_sizes();
    assert_eq!(sizes.len(), 3);
    assert_eq!(sizes.iter().sum::<usize>(), 10);
    let counted: Vec<usize> = summaries.iter().map(|s| s.count).collect();
    assert!(counted.iter().all(|count| sizes.contains(count)));
}

#[test]
fn test_groups_stay_together() {
    let test_file = create_test_csv();
    let customers = load_customers(test_file.path().to_str().unwrap()).unwrap();

    let mut intact = 0;
    for seed in 0..40 {
        let assignment =
            segment_customers(&customers, &Partitioner::new(3), Some(seed)).unwrap();
        let labels = &assignment.labels;

        if labels[0..4].iter().all(|&l| l == labels[0])
            && labels[4..7].iter().all(|&l| l == labels[4])
            && labels[7..10].iter().all(|&l| l == labels[7])
        {
            intact += 1;
        }
    }

    // Random unit-cube seeding occasionally parks two centroids on one group
    assert!(intact >= 30, "natural groups intact in only {} of 40 runs", intact);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let test_file = create_test_csv();
    let customers = load_customers(test_file.path().to_str().unwrap()).unwrap();
    let partitioner = Partitioner::new(4).with_max_iterations(50);

    let first = segment_customers(&customers, &partitioner, Some(2024)).unwrap();
    let second = segment_customers(&customers, &partitioner, Some(2024)).unwrap();
    assert_eq!(first.labels, second.labels);
}

#[test]
fn test_prediction() {
    let test_file = create_test_csv();
    let customers = load_customers(test_file.path().to_str().unwrap()).unwrap();
    let assignment = segment_customers(&customers, &Partitioner::new(3), Some(11)).unwrap();

    // Same values as customer 1
    let cluster = predict_cluster(&assignment, &[19.0, 15.0, 85.0]).unwrap();
    assert_eq!(cluster, assignment.labels[0]);
}

#[test]
fn test_distilled_contract() {
    let points = vec![vec![1.0, 1.0], vec![1.0, 2.0], vec![10.0, 10.0]];
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let labels = partition(&points, 2, 50, &mut rng).unwrap();

    assert_eq!(labels.len(), 3);
    assert_eq!(labels[0], labels[1]);
}

#[test]
fn test_error_handling_invalid_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    assert!(matches!(
        partition(&[], 2, 10, &mut rng),
        Err(PartitionError::InvalidInput(_))
    ));
    assert!(matches!(
        partition(&[vec![1.0, 2.0]], 0, 10, &mut rng),
        Err(PartitionError::InvalidInput(_))
    ));
    assert!(matches!(
        partition(&[vec![1.0, 2.0], vec![3.0]], 1, 10, &mut rng),
        Err(PartitionError::InvalidInput(_))
    ));

    let test_file = create_test_csv();
    let customers = load_customers(test_file.path().to_str().unwrap()).unwrap();
    assert!(segment_customers(&customers, &Partitioner::new(0), Some(1)).is_err());
    assert!(segment_customers(&[], &Partitioner::new(3), Some(1)).is_err());
}

#[test]
fn test_overview_and_features() {
    let test_file = create_test_csv();
    let customers = load_customers(test_file.path().to_str().unwrap()).unwrap();

    let matrix = feature_matrix(&customers);
    assert_eq!(matrix.shape(), &[10, 3]);

    let overview = Overview::from_customers(&customers).unwrap();
    assert_eq!(overview.total_customers, 10);
    assert_eq!(overview.male_count + overview.female_count, 10);
    let binned: usize = overview.age_distribution.iter().map(|b| b.count).sum();
    assert_eq!(binned, 10);
}
