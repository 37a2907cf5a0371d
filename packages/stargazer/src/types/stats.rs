//! Stats payload persisted on each generated work item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dated count. `page` is only set on the per-page daily groups the
/// aggregator consumes; published measures never carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub count: i64,
}

impl Measure {
    pub fn new(date: DateTime<Utc>, count: i64) -> Self {
        Self {
            date,
            page: None,
            count,
        }
    }

    pub fn for_page(page: u32, date: DateTime<Utc>, count: i64) -> Self {
        Self {
            date,
            page: Some(page),
            count,
        }
    }
}

/// A recent adopter. Empty `by` marks padding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adopter {
    pub by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub evolution: Vec<Measure>,
    #[serde(default)]
    pub per_days: Vec<Measure>,
    #[serde(default)]
    pub last_10: Vec<Adopter>,
    #[serde(default)]
    pub count_stars: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_page_is_not_serialized_on_published_measures() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let json = serde_json::to_value(Measure::new(date, 3)).unwrap();
        assert!(json.get("page").is_none());
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_empty_object_decodes_to_default_stats() {
        let stats: Stats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, Stats::default());
    }
}
