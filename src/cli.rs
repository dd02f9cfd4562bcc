//! Command-line interface definitions and argument parsing

use crate::data::Feature;
use crate::model::{DEFAULT_CLUSTERS, DEFAULT_MAX_ITERATIONS};
use clap::{ArgAction, Parser};

/// Customer segmentation CLI using K-Means clustering on age, income and spending score
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the customer CSV file (id, gender, age, income, spending score)
    #[arg(short, long, default_value = "data/customers.csv")]
    pub input: String,

    /// Number of customer segments
    #[arg(short = 'k', long, default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iters: usize,

    /// Seed for centroid initialization; omit for a different run every time
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Output path for the scatter plot; the size chart is written next to it
    #[arg(short, long, default_value = "segments.png")]
    pub output: String,

    /// Feature on the scatter plot's horizontal axis
    #[arg(short = 'x', long, value_enum, default_value_t = Feature::AnnualIncome)]
    pub x_axis: Feature,

    /// Feature on the scatter plot's vertical axis
    #[arg(short = 'y', long, value_enum, default_value_t = Feature::SpendingScore)]
    pub y_axis: Feature,

    /// Write a JSON report of the run to this path
    #[arg(short, long)]
    pub report: Option<String>,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Segment a new customer: provide age,income,spending as comma-separated string
    /// Example: --predict "35,70,60"
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse customer values from the predict string
    /// Expected format: "age,income,spending"
    pub fn parse_predict_values(&self) -> crate::Result<Option<[f64; 3]>> {
        let Some(ref predict_str) = self.predict else {
            return Ok(None);
        };

        let parts: Vec<&str> = predict_str.split(',').collect();
        if parts.len() != 3 {
            anyhow::bail!("Predict values must be in format 'age,income,spending'");
        }

        let mut values = [0.0; 3];
        for ((value, part), feature) in values.iter_mut().zip(&parts).zip(Feature::ALL) {
            *value = part
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid {} value: {}", feature.label(), part))?;
        }

        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["segmentforge"]);
        assert_eq!(args.input, "data/customers.csv");
        assert_eq!(args.clusters, 5);
        assert_eq!(args.max_iters, 100);
        assert_eq!(args.seed, None);
        assert_eq!(args.x_axis, Feature::AnnualIncome);
        assert_eq!(args.y_axis, Feature::SpendingScore);
        assert_eq!(args.verbose, 0);
        assert!(!args.no_charts);
    }

    #[test]
    fn test_explicit_flags() {
        let args = Args::parse_from([
            "segmentforge",
            "-k",
            "3",
            "--max-iters",
            "20",
            "--seed",
            "42",
            "-x",
            "age",
            "-y",
            "annual-income",
            "-vv",
        ]);
        assert_eq!(args.clusters, 3);
        assert_eq!(args.max_iters, 20);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.x_axis, Feature::Age);
        assert_eq!(args.y_axis, Feature::AnnualIncome);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_parse_predict_values() {
        let mut args = Args::parse_from(["segmentforge", "--predict", "35, 70,60.5"]);

        let result = args.parse_predict_values().unwrap();
        assert_eq!(result, Some([35.0, 70.0, 60.5]));

        args.predict = None;
        assert_eq!(args.parse_predict_values().unwrap(), None);

        args.predict = Some("invalid".to_string());
        assert!(args.parse_predict_values().is_err());

        args.predict = Some("35,abc,60".to_string());
        let err = args.parse_predict_values().unwrap_err();
        assert!(err.to_string().contains("Annual Income"));
    }
}
