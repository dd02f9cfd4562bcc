//! Customer table loading using Polars

use anyhow::{anyhow, bail, Context};
use clap::ValueEnum;
use ndarray::Array2;
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Number of columns a customer table must provide
const REQUIRED_COLUMNS: usize = 5;

/// Customer gender as recorded in the source table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("male") {
            Ok(Gender::Male)
        } else if value.eq_ignore_ascii_case("female") {
            Ok(Gender::Female)
        } else {
            Err(anyhow!("Unknown gender value: '{}'", value))
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Numeric customer attribute used for clustering and charting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Feature {
    Age,
    AnnualIncome,
    SpendingScore,
}

impl Feature {
    /// Features in the order they appear in the clustering matrix
    pub const ALL: [Feature; 3] = [Feature::Age, Feature::AnnualIncome, Feature::SpendingScore];

    /// Column label as it appears in the source table
    pub fn label(self) -> &'static str {
        match self {
            Feature::Age => "Age",
            Feature::AnnualIncome => "Annual Income (k$)",
            Feature::SpendingScore => "Spending Score (1-100)",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the customer table
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub customer_id: i64,
    pub gender: Gender,
    pub age: f64,
    /// Annual income in thousands of dollars
    pub annual_income: f64,
    /// Spending score on a 1-100 scale
    pub spending_score: f64,
}

impl Customer {
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Age => self.age,
            Feature::AnnualIncome => self.annual_income,
            Feature::SpendingScore => self.spending_score,
        }
    }
}

/// Load the customer table from a CSV file
///
/// Columns are read by position (id, gender, age, income, spending score), so
/// the header text only has to be present, not match any particular naming.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * Customers in file order
pub fn load_customers(file_path: &str) -> crate::Result<Vec<Customer>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(file_path.into()))
        .with_context(|| format!("Failed to open customer table: {}", file_path))?
        .finish()
        .with_context(|| format!("Failed to parse customer table: {}", file_path))?;

    tracing::debug!(rows = df.height(), columns = df.width(), "customer table read");
    customers_from_frame(&df)
}

/// Convert a parsed table into typed customer records
pub fn customers_from_frame(df: &DataFrame) -> crate::Result<Vec<Customer>> {
    if df.width() < REQUIRED_COLUMNS {
        bail!(
            "Customer table must have at least {} columns (id, gender, age, income, spending score), found {}",
            REQUIRED_COLUMNS,
            df.width()
        );
    }
    if df.height() == 0 {
        bail!("Customer table contains no data rows");
    }

    let columns = df.get_columns();
    let ids = id_column(&columns[0])?;
    let genders = gender_column(&columns[1])?;
    let ages = float_column(&columns[2])?;
    let incomes = float_column(&columns[3])?;
    let spending = float_column(&columns[4])?;

    let customers = ids
        .into_iter()
        .zip(genders)
        .zip(ages)
        .zip(incomes)
        .zip(spending)
        .map(
            |((((customer_id, gender), age), annual_income), spending_score)| Customer {
                customer_id,
                gender,
                age,
                annual_income,
                spending_score,
            },
        )
        .collect();

    Ok(customers)
}

/// Build the `(n_customers, 3)` clustering matrix of age, income and spending score
pub fn feature_matrix(customers: &[Customer]) -> Array2<f64> {
    Array2::from_shape_fn((customers.len(), Feature::ALL.len()), |(row, col)| {
        customers[row].feature(Feature::ALL[col])
    })
}

fn id_column(column: &Column) -> crate::Result<Vec<i64>> {
    let series = column.as_materialized_series().cast(&DataType::Int64)?;
    series
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| missing_value(column, row)))
        .collect()
}

fn gender_column(column: &Column) -> crate::Result<Vec<Gender>> {
    let series = column.as_materialized_series().cast(&DataType::String)?;
    series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let text = value.ok_or_else(|| missing_value(column, row))?;
            text.parse::<Gender>()
                .with_context(|| format!("Invalid gender at row {}", row + 1))
        })
        .collect()
}

fn float_column(column: &Column) -> crate::Result<Vec<f64>> {
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| missing_value(column, row)))
        .collect()
}

fn missing_value(column: &Column, row: usize) -> anyhow::Error {
    anyhow!(
        "Column '{}' has a missing or non-numeric value at row {}",
        column.name(),
        row + 1
    )
}
