// src/model.rs
//! Wire and domain types shared by the pipeline, the tool boundary, and the store.
//!
//! Field names follow the JSON contract of the HTTP surface (`90_day_plan`,
//! `0_30`, ...), so these types serialize straight into responses and into the
//! `reports` table.

use serde::{de, Deserialize, Deserializer, Serialize};

/// `null` and a missing key both decode to the type's default.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn score_0_100<'de, D>(d: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let score = u8::deserialize(d)?;
    if score > 100 {
        return Err(de::Error::custom(format!("score {score} out of range 0..=100")));
    }
    Ok(score)
}

/// A collected signal. Identity is `url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

impl Item {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// Per-item impact assessment produced by the scoring tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactResult {
    pub event: String,
    pub impact_level: ImpactLevel,
    #[serde(deserialize_with = "score_0_100")]
    pub score: u8,
    #[serde(default)]
    pub why: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// Output of the entity extraction tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entities {
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub pricing_models: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NinetyDayPlan {
    #[serde(rename = "0_30", default)]
    pub days_0_30: Vec<String>,
    #[serde(rename = "30_60", default)]
    pub days_30_60: Vec<String>,
    #[serde(rename = "60_90", default)]
    pub days_60_90: Vec<String>,
}

/// Final market intelligence report. Produced once per run, never edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub summary: String,
    #[serde(default)]
    pub drivers: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub impact_radar: Vec<ImpactResult>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(rename = "90_day_plan", default)]
    pub ninety_day_plan: NinetyDayPlan,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Payload handed to the report generation tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportPayload {
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub impact_radar: Vec<ImpactResult>,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// What `/analyze` hands back once the report is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredReport {
    pub report_id: String,
    pub report: Report,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_uses_contract_field_names() {
        let report = Report {
            summary: "s".into(),
            ninety_day_plan: NinetyDayPlan {
                days_0_30: vec!["a".into()],
                days_30_60: vec!["b".into()],
                days_60_90: vec!["c".into()],
            },
            ..Default::default()
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["90_day_plan"]["0_30"], json!(["a"]));
        assert_eq!(v["90_day_plan"]["30_60"], json!(["b"]));
        assert_eq!(v["90_day_plan"]["60_90"], json!(["c"]));
        assert!(v.get("ninety_day_plan").is_none());
    }

    #[test]
    fn impact_level_serializes_as_title_case() {
        let r = ImpactResult {
            event: "e".into(),
            impact_level: ImpactLevel::High,
            score: 85,
            why: vec![],
            actions: vec![],
            url: String::new(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["impact_level"], "High");
        assert_eq!(v["score"], 85);
    }

    #[test]
    fn item_without_url_deserializes_to_empty_url() {
        let it: Item = serde_json::from_value(json!({ "title": "t" })).unwrap();
        assert!(it.url.is_empty());
    }

    #[test]
    fn null_title_and_url_deserialize_to_empty() {
        let it: Item = serde_json::from_value(json!({ "title": null, "url": null })).unwrap();
        assert_eq!(it, Item::default());

        let r: ImpactResult = serde_json::from_value(json!({
            "event": "e", "impact_level": "Low", "score": 10, "url": null
        }))
        .unwrap();
        assert!(r.url.is_empty());
    }

    #[test]
    fn score_outside_0_100_is_rejected() {
        let at = |score: u32| {
            serde_json::from_value::<ImpactResult>(json!({
                "event": "e", "impact_level": "High", "score": score
            }))
        };
        assert_eq!(at(100).unwrap().score, 100);
        assert_eq!(at(0).unwrap().score, 0);
        let err = at(101).unwrap_err().to_string();
        assert!(err.contains("out of range"), "{err}");
        assert!(at(300).is_err());
    }
}
