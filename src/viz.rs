//! Chart rendering with Plotters and console output of segment statistics

use crate::data::{Customer, Feature};
use crate::stats::{
    segment_color, segment_description, weighted_average_income, weighted_average_spending,
    ClusterSummary, Overview,
};
use anyhow::{bail, Context};
use plotters::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Parse a `#rrggbb` color
pub fn parse_hex_color(hex: &str) -> crate::Result<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        bail!("Invalid color '{}': expected #rrggbb", hex);
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .with_context(|| format!("Invalid color '{}'", hex))
    };
    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Padded axis range covering every value
fn axis_range(values: &[f64]) -> std::ops::Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let padding = ((max - min) * 0.05).max(1.0);
    (min - padding)..(max + padding)
}

/// Path of the cluster size chart that accompanies `base_output_path`
pub fn size_chart_path(base_output_path: &str) -> PathBuf {
    let base = Path::new(base_output_path);
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "segments".to_string());
    base.with_file_name(format!("{}_sizes.png", stem))
}

/// Create scatter plot of two raw customer features colored by segment
///
/// # Arguments
/// * `customers` - Customer records
/// * `labels` - Segment label per customer
/// * `x_axis` / `y_axis` - Features to plot
/// * `output_path` - Path to save the PNG plot
/// * `plot_title` - Title for the plot
pub fn create_cluster_visualization(
    customers: &[Customer],
    labels: &[usize],
    x_axis: Feature,
    y_axis: Feature,
    output_path: &str,
    plot_title: Option<&str>,
) -> crate::Result<()> {
    if customers.len() != labels.len() {
        bail!(
            "Got {} labels for {} customers",
            labels.len(),
            customers.len()
        );
    }

    let default_title = format!("Customer Segments: {} vs {}", x_axis, y_axis);
    let title = plot_title.unwrap_or(&default_title);

    let x_values: Vec<f64> = customers.iter().map(|c| c.feature(x_axis)).collect();
    let y_values: Vec<f64> = customers.iter().map(|c| c.feature(y_axis)).collect();

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(axis_range(&x_values), axis_range(&y_values))?;

    chart
        .configure_mesh()
        .x_desc(x_axis.label())
        .y_desc(y_axis.label())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let clusters: BTreeSet<usize> = labels.iter().copied().collect();
    for cluster in clusters {
        let color = parse_hex_color(segment_color(cluster))?;
        let points: Vec<(f64, f64)> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == cluster)
            .map(|(i, _)| (x_values[i], y_values[i]))
            .collect();

        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|point| Circle::new(point, 4, color.filled())),
            )?
            .label(segment_description(cluster))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = output_path, "cluster scatter plot written");

    Ok(())
}

/// Create a bar chart of segment sizes, empty segments included
pub fn create_cluster_size_chart(cluster_sizes: &[usize], output_path: &Path) -> crate::Result<()> {
    let max_size = cluster_sizes.iter().copied().max().unwrap_or(1).max(1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Segment Sizes", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            -0.5f64..(cluster_sizes.len() as f64 - 0.5),
            0f64..(max_size * 1.1),
        )?;

    chart
        .configure_mesh()
        .x_desc("Segment")
        .y_desc("Number of Customers")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (cluster, &size) in cluster_sizes.iter().enumerate() {
        let color = parse_hex_color(segment_color(cluster))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(cluster as f64 - 0.4, 0.0), (cluster as f64 + 0.4, size as f64)],
            color.filled(),
        )))?;
    }

    root.present()?;
    tracing::info!(path = %output_path.display(), "segment size chart written");

    Ok(())
}

/// Round to one decimal place for display
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Print whole-table statistics
pub fn print_overview(overview: &Overview) {
    println!("\n=== Data Overview ===");
    println!("Total customers: {}", overview.total_customers);
    println!("Average age: {}", overview.avg_age.round());
    println!("Average income: ${}k", overview.avg_income.round());
    println!("Average spending score: {}", overview.avg_spending.round());
    println!(
        "Gender: {} female, {} male",
        overview.female_count, overview.male_count
    );

    println!("\nAge distribution:");
    for bucket in &overview.age_distribution {
        println!("  {:>8} | {:4}", bucket.range, bucket.count);
    }
    println!("\nIncome distribution:");
    for bucket in &overview.income_distribution {
        println!("  {:>8} | {:4}", bucket.range, bucket.count);
    }
}

/// Print per-segment statistics
pub fn print_cluster_statistics(summaries: &[ClusterSummary], cluster_sizes: &[usize]) {
    let total: usize = summaries.iter().map(|s| s.count).sum();

    println!("\n=== Cluster Analysis ===");
    println!("Number of segments: {}", summaries.len());
    println!("Total customers: {}", total);
    println!(
        "Average income: ${}k",
        weighted_average_income(summaries).round()
    );
    println!(
        "Average spending score: {}",
        weighted_average_spending(summaries).round()
    );

    let empty = cluster_sizes.iter().filter(|&&size| size == 0).count();
    if empty > 0 {
        println!("Empty segments: {}", empty);
    }

    println!("\n  Segment                    | Count |  Age | Income | Spending | Male | Female");
    println!("  ---------------------------|-------|------|--------|----------|------|-------");
    for s in summaries {
        println!(
            "  {:<26} | {:5} | {:4.1} | {:6.1} | {:8.1} | {:3}% | {:5}%",
            s.description,
            s.count,
            round1(s.avg_age),
            round1(s.avg_income),
            round1(s.avg_spending),
            s.male_pct.round(),
            s.female_pct.round()
        );
    }
}

/// Print marketing insights
pub fn print_insights(insights: &[String]) {
    println!("\n=== Marketing Insights ===");
    for (i, insight) in insights.iter().enumerate() {
        println!("{}. {}", i + 1, insight);
    }
}

/// Render the scatter plot and the size chart; returns the size chart path
pub fn generate_visualization_report(
    customers: &[Customer],
    labels: &[usize],
    cluster_sizes: &[usize],
    x_axis: Feature,
    y_axis: Feature,
    base_output_path: &str,
) -> crate::Result<PathBuf> {
    create_cluster_visualization(customers, labels, x_axis, y_axis, base_output_path, None)?;

    let size_chart = size_chart_path(base_output_path);
    create_cluster_size_chart(cluster_sizes, &size_chart)?;

    Ok(size_chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Gender;
    use tempfile::tempdir;

    fn create_test_data() -> (Vec<Customer>, Vec<usize>) {
        let customers = (0..12)
            .map(|i| Customer {
                customer_id: i,
                gender: if i % 2 == 0 { Gender::Male } else { Gender::Female },
                age: 20.0 + i as f64 * 3.0,
                annual_income: 15.0 + i as f64 * 8.0,
                spending_score: 90.0 - i as f64 * 6.0,
            })
            .collect();
        let labels = (0..12).map(|i| (i % 6) as usize).collect();
        (customers, labels)
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#0ea5e9").unwrap(), RGBColor(0x0e, 0xa5, 0xe9));
        assert_eq!(parse_hex_color("6b7280").unwrap(), RGBColor(0x6b, 0x72, 0x80));
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_axis_range_padding() {
        let range = axis_range(&[10.0, 110.0]);
        assert_eq!(range, 5.0..115.0);

        let flat = axis_range(&[3.0, 3.0]);
        assert_eq!(flat, 2.0..4.0);

        assert_eq!(axis_range(&[]), 0.0..1.0);
    }

    #[test]
    fn test_size_chart_path() {
        assert_eq!(
            size_chart_path("out/segments.png"),
            PathBuf::from("out/segments_sizes.png")
        );
        assert_eq!(size_chart_path("plot"), PathBuf::from("plot_sizes.png"));
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(55.25), 55.3);
        assert_eq!(round1(61.04), 61.0);
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let (customers, _) = create_test_data();
        let result = create_cluster_visualization(
            &customers,
            &[0, 1],
            Feature::Age,
            Feature::SpendingScore,
            "unused.png",
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_generate_visualization_report() {
        let (customers, labels) = create_test_data();
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("segments.png");
        let output_str = output_path.to_str().unwrap();

        let mut sizes = vec![0; 7];
        for &label in &labels {
            sizes[label] += 1;
        }
        let size_chart = generate_visualization_report(
            &customers,
            &labels,
            &sizes,
            Feature::AnnualIncome,
            Feature::SpendingScore,
            output_str,
        )
        .unwrap();

        assert!(output_path.exists());
        assert!(size_chart.exists());
    }
}
