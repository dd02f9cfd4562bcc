//! Per-segment statistics, dataset overview and marketing insights

use crate::data::{Customer, Gender};
use anyhow::bail;
use serde::Serialize;
use std::collections::BTreeMap;

/// Display name and hex color for a segment label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentProfile {
    pub description: &'static str,
    pub color: &'static str,
}

/// Profiles indexed by raw cluster label.
///
/// Labels come from a randomly initialized run, so label 0 is not guaranteed to
/// describe the same kind of customer from one run to the next.
pub const SEGMENT_PROFILES: [SegmentProfile; 5] = [
    SegmentProfile {
        description: "Budget Conscious Shoppers",
        color: "#0ea5e9",
    },
    SegmentProfile {
        description: "High Value Customers",
        color: "#d946ef",
    },
    SegmentProfile {
        description: "Young Spenders",
        color: "#f97316",
    },
    SegmentProfile {
        description: "Mature Savers",
        color: "#10b981",
    },
    SegmentProfile {
        description: "Premium Segment",
        color: "#ef4444",
    },
];

/// Color for labels beyond the profile table
pub const FALLBACK_COLOR: &str = "#6b7280";

/// Description for a cluster label, falling back to `Cluster {n}`
pub fn segment_description(cluster: usize) -> String {
    SEGMENT_PROFILES
        .get(cluster)
        .map(|profile| profile.description.to_string())
        .unwrap_or_else(|| format!("Cluster {}", cluster))
}

/// Hex color for a cluster label
pub fn segment_color(cluster: usize) -> &'static str {
    SEGMENT_PROFILES
        .get(cluster)
        .map(|profile| profile.color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Descriptive statistics for one non-empty cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub count: usize,
    pub avg_age: f64,
    pub avg_income: f64,
    pub avg_spending: f64,
    /// Share of male customers, 0-100
    pub male_pct: f64,
    /// Share of female customers, 0-100
    pub female_pct: f64,
    pub description: String,
    pub color: String,
}

/// Group customers by label and summarize each cluster
///
/// Only labels with at least one member appear; summaries are sorted by label.
pub fn summarize_clusters(
    customers: &[Customer],
    labels: &[usize],
) -> crate::Result<Vec<ClusterSummary>> {
    if customers.len() != labels.len() {
        bail!(
            "Got {} labels for {} customers",
            labels.len(),
            customers.len()
        );
    }

    let mut groups: BTreeMap<usize, Vec<&Customer>> = BTreeMap::new();
    for (customer, &label) in customers.iter().zip(labels) {
        groups.entry(label).or_default().push(customer);
    }

    let summaries = groups
        .into_iter()
        .map(|(cluster, members)| {
            let count = members.len() as f64;
            let mean = |value: fn(&Customer) -> f64| {
                members.iter().map(|c| value(c)).sum::<f64>() / count
            };
            let share = |gender: Gender| {
                members.iter().filter(|c| c.gender == gender).count() as f64 / count * 100.0
            };

            ClusterSummary {
                cluster,
                count: members.len(),
                avg_age: mean(|c| c.age),
                avg_income: mean(|c| c.annual_income),
                avg_spending: mean(|c| c.spending_score),
                male_pct: share(Gender::Male),
                female_pct: share(Gender::Female),
                description: segment_description(cluster),
                color: segment_color(cluster).to_string(),
            }
        })
        .collect();

    Ok(summaries)
}

/// Count-weighted mean income across clusters
pub fn weighted_average_income(summaries: &[ClusterSummary]) -> f64 {
    weighted_average(summaries, |s| s.avg_income)
}

/// Count-weighted mean spending score across clusters
pub fn weighted_average_spending(summaries: &[ClusterSummary]) -> f64 {
    weighted_average(summaries, |s| s.avg_spending)
}

fn weighted_average(summaries: &[ClusterSummary], value: fn(&ClusterSummary) -> f64) -> f64 {
    let total: usize = summaries.iter().map(|s| s.count).sum();
    if total == 0 {
        return 0.0;
    }
    summaries
        .iter()
        .map(|s| value(s) * s.count as f64)
        .sum::<f64>()
        / total as f64
}

/// One marketing recommendation per cluster, in summary order
pub fn generate_insights(summaries: &[ClusterSummary]) -> Vec<String> {
    summaries
        .iter()
        .map(|s| {
            let advice = if s.avg_income > 80.0 && s.avg_spending > 70.0 {
                "Premium customers with high income and spending - target with luxury products and exclusive offers."
            } else if s.avg_income < 40.0 && s.avg_spending < 40.0 {
                "Price-sensitive segment - focus on value propositions and discount campaigns."
            } else if s.avg_age < 30.0 && s.avg_spending > 60.0 {
                "Young high spenders - target with trendy products and social media marketing."
            } else if s.avg_age > 50.0 && s.avg_spending < 50.0 {
                "Mature conservative spenders - emphasize quality and reliability in marketing."
            } else {
                "Balanced segment - use diversified marketing approach with moderate pricing."
            };
            format!("{}: {}", s.description, advice)
        })
        .collect()
}

/// Inclusive whole-number range shown as one histogram bar
#[derive(Debug, Clone, Copy)]
struct Bucket {
    label: &'static str,
    min: f64,
    max: f64,
}

const AGE_BUCKETS: [Bucket; 6] = [
    Bucket {
        label: "18-25",
        min: 18.0,
        max: 25.0,
    },
    Bucket {
        label: "26-35",
        min: 26.0,
        max: 35.0,
    },
    Bucket {
        label: "36-45",
        min: 36.0,
        max: 45.0,
    },
    Bucket {
        label: "46-55",
        min: 46.0,
        max: 55.0,
    },
    Bucket {
        label: "56-65",
        min: 56.0,
        max: 65.0,
    },
    Bucket {
        label: "65+",
        min: 65.0,
        max: 100.0,
    },
];

const INCOME_BUCKETS: [Bucket; 6] = [
    Bucket {
        label: "$0-30k",
        min: 0.0,
        max: 30.0,
    },
    Bucket {
        label: "$31-50k",
        min: 31.0,
        max: 50.0,
    },
    Bucket {
        label: "$51-70k",
        min: 51.0,
        max: 70.0,
    },
    Bucket {
        label: "$71-90k",
        min: 71.0,
        max: 90.0,
    },
    Bucket {
        label: "$91-110k",
        min: 91.0,
        max: 110.0,
    },
    Bucket {
        label: "$110k+",
        min: 111.0,
        max: 200.0,
    },
];

/// Labeled count in a distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub range: String,
    pub count: usize,
}

/// Whole-table statistics shown before segmentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_customers: usize,
    pub avg_age: f64,
    pub avg_income: f64,
    pub avg_spending: f64,
    pub male_count: usize,
    pub female_count: usize,
    pub age_distribution: Vec<BucketCount>,
    pub income_distribution: Vec<BucketCount>,
}

impl Overview {
    pub fn from_customers(customers: &[Customer]) -> crate::Result<Self> {
        if customers.is_empty() {
            bail!("Cannot summarize an empty customer table");
        }

        let n = customers.len() as f64;
        let mean = |value: fn(&Customer) -> f64| customers.iter().map(value).sum::<f64>() / n;
        let gender_count =
            |gender: Gender| customers.iter().filter(|c| c.gender == gender).count();

        Ok(Self {
            total_customers: customers.len(),
            avg_age: mean(|c| c.age),
            avg_income: mean(|c| c.annual_income),
            avg_spending: mean(|c| c.spending_score),
            male_count: gender_count(Gender::Male),
            female_count: gender_count(Gender::Female),
            age_distribution: histogram(customers, &AGE_BUCKETS, |c| c.age),
            income_distribution: histogram(customers, &INCOME_BUCKETS, |c| c.annual_income),
        })
    }
}

fn histogram(
    customers: &[Customer],
    buckets: &[Bucket],
    value: fn(&Customer) -> f64,
) -> Vec<BucketCount> {
    buckets
        .iter()
        .map(|bucket| BucketCount {
            range: bucket.label.to_string(),
            count: customers
                .iter()
                .map(|c| value(c).trunc())
                .filter(|v| (bucket.min..=bucket.max).contains(v))
                .count(),
        })
        .collect()
}
