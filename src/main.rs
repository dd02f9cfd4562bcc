//! SegmentForge: customer segmentation CLI
//!
//! This is the main entrypoint that orchestrates data loading, clustering,
//! segment statistics, visualization, reporting and prediction.

use anyhow::Result;
use clap::Parser;
use segmentforge::stats::segment_description;
use segmentforge::{
    generate_insights, load_customers, predict_cluster, segment_customers, summarize_clusters,
    viz, Args, ClusterAssignment, Overview, Partitioner, SegmentationReport,
};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let predict_values = args.parse_predict_values()?;

    println!("SegmentForge - Customer Segmentation using K-Means");
    println!("==================================================");

    let start_time = Instant::now();

    let customers = load_customers(&args.input)?;
    tracing::info!(customers = customers.len(), input = %args.input, "customer table loaded");

    let overview = Overview::from_customers(&customers)?;
    viz::print_overview(&overview);

    let partitioner = Partitioner::new(args.clusters).with_max_iterations(args.max_iters);
    tracing::debug!(?partitioner, seed = ?args.seed, "fitting k-means");

    let fit_start = Instant::now();
    let assignment = segment_customers(&customers, &partitioner, args.seed)?;
    tracing::info!(
        iterations = assignment.iterations,
        converged = assignment.converged,
        elapsed_ms = fit_start.elapsed().as_millis() as u64,
        "k-means finished"
    );
    if !assignment.converged {
        tracing::warn!(
            max_iterations = args.max_iters,
            "k-means stopped at the iteration cap before converging"
        );
    }

    let summaries = summarize_clusters(&customers, &assignment.labels)?;
    let sizes = assignment.cluster_sizes();
    let insights = generate_insights(&summaries);

    println!(
        "\n✓ Segmented {} customers into {} clusters ({} iterations{})",
        customers.len(),
        assignment.n_clusters,
        assignment.iterations,
        if assignment.converged { "" } else { ", not converged" }
    );
    println!("  Segment names follow raw cluster numbers and can change between unseeded runs.");

    viz::print_cluster_statistics(&summaries, &sizes);
    viz::print_insights(&insights);

    if !args.no_charts {
        let size_chart = viz::generate_visualization_report(
            &customers,
            &assignment.labels,
            &sizes,
            args.x_axis,
            args.y_axis,
            &args.output,
        )?;
        println!("\nScatter plot saved to: {}", args.output);
        println!("Segment sizes saved to: {}", size_chart.display());
    }

    if let Some(values) = predict_values {
        run_prediction(&assignment, &values)?;
    }

    if let Some(ref report_path) = args.report {
        let report = SegmentationReport::new(
            &assignment,
            args.max_iters,
            args.seed,
            overview,
            summaries,
            insights,
        );
        report.write_json(Path::new(report_path))?;
        println!("Report saved to: {}", report_path);
    }

    println!(
        "\nTotal processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Report which segment a new customer falls into
fn run_prediction(assignment: &ClusterAssignment, values: &[f64; 3]) -> Result<()> {
    println!("\n=== Prediction ===");
    println!(
        "Input: age={}, income={}k, spending={}",
        values[0], values[1], values[2]
    );

    let cluster = predict_cluster(assignment, values)?;
    let sizes = assignment.cluster_sizes();
    let percentage = sizes[cluster] as f64 / assignment.len() as f64 * 100.0;

    println!("\n✓ Predicted segment: {} ({})", cluster, segment_description(cluster));
    println!(
        "  Size: {} customers ({:.1}% of total)",
        sizes[cluster], percentage
    );
    println!(
        "  Centroid (normalized): age={:.2}, income={:.2}, spending={:.2}",
        assignment.centroids[[cluster, 0]],
        assignment.centroids[[cluster, 1]],
        assignment.centroids[[cluster, 2]]
    );

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
