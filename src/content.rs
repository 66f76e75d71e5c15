//! Review records shown in the detail panel.
//!
//! The page supplies these as JSON. Review ids may arrive as strings or as
//! numbers (database primary keys); both are normalised to strings so they
//! match the `data-review-id` attribute on each sphere.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub author: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Rating bucket in the distribution, highest rating first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: usize,
    /// Share of all reviews, rounded to one decimal place.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub avg_rating: f64,
    pub review_count: usize,
    pub photo_review_count: usize,
    pub rating_distribution: Vec<RatingBucket>,
}

/// All review records known to the widget, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ReviewCatalog {
    records: HashMap<String, ReviewRecord>,
    order: Vec<String>,
}

impl ReviewCatalog {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        let mut catalog = Self::default();
        for record in records {
            if !catalog.records.contains_key(&record.id) {
                catalog.order.push(record.id.clone());
            }
            catalog.records.insert(record.id.clone(), record);
        }
        catalog
    }

    /// Parse a JSON array of review records.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let records: Vec<ReviewRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn get(&self, id: &str) -> Option<&ReviewRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in the order they were supplied.
    pub fn iter(&self) -> impl Iterator<Item = &ReviewRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn stats(&self) -> ReviewStats {
        let review_count = self.len();

        let ratings: Vec<u8> = self.iter().filter_map(|r| r.rating).collect();
        let avg_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64
        };

        let photo_review_count = self.iter().filter(|r| !r.image_urls.is_empty()).count();

        let rating_distribution = (1..=5u8)
            .rev()
            .map(|rating| {
                let count = ratings.iter().filter(|&&r| r == rating).count();
                let percentage = if review_count > 0 {
                    (count as f64 / review_count as f64 * 1000.0).round() / 10.0
                } else {
                    0.0
                };
                RatingBucket { rating, count, percentage }
            })
            .collect();

        ReviewStats {
            avg_rating,
            review_count,
            photo_review_count,
            rating_distribution,
        }
    }
}
