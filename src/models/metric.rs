// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Insight results returned to API clients.

use serde::Serialize;

/// A single derived scalar with its unit and a human readable summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub metric: f64,
    pub unit: &'static str,
    pub description: String,
}

impl Metric {
    pub fn new(metric: f64, unit: &'static str, description: impl Into<String>) -> Self {
        Self {
            metric,
            unit,
            description: description.into(),
        }
    }
}

/// Breakdown of a night's sleep by stage, compared against reference ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageComposition {
    pub deep_percent: f64,
    pub rem_percent: f64,
    pub light_percent: f64,
    /// Awake time as a share of sleep plus awake time
    pub awake_percent: f64,
    pub label: CompositionLabel,
    /// 0-100, higher is closer to the ideal mix
    pub quality_score: f64,
}

/// Qualitative verdict on stage composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionLabel {
    Balanced,
    DeepDeficient,
    RemDeficient,
    LightDeficient,
    DeepExcess,
    RemExcess,
    LightExcess,
}

/// Value produced by any insight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightValue {
    Scalar(Metric),
    Composition(StageComposition),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_serializes_flat() {
        let value = InsightValue::Scalar(Metric::new(87.5, "%", "Sleep efficiency: 87.50%"));
        let json = serde_json::to_value(&value).unwrap();

        assert_eq!(json["metric"], 87.5);
        assert_eq!(json["unit"], "%");
        assert_eq!(json["description"], "Sleep efficiency: 87.50%");
    }

    #[test]
    fn test_label_serializes_kebab_case() {
        for (label, expected) in [
            (CompositionLabel::Balanced, "balanced"),
            (CompositionLabel::DeepDeficient, "deep-deficient"),
            (CompositionLabel::RemExcess, "rem-excess"),
            (CompositionLabel::LightExcess, "light-excess"),
        ] {
            let json = serde_json::to_value(label).unwrap();
            assert_eq!(json, expected);
        }
    }
}
