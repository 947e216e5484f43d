//! Heatmap overlay data
//!
//! Map libraries take plain `[lat, lng, weight]` triples, so the helpers here
//! stop at that shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{ApplicationStatus, BoundingBox};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

const fn unit_weight() -> f64 {
    1.0
}

impl HeatmapPoint {
    #[must_use]
    pub const fn to_weighted(&self) -> [f64; 3] {
        [self.latitude, self.longitude, self.weight]
    }
}

/// Scale weights into 0..=1 relative to the heaviest point
///
/// Non-finite and negative weights count as zero.
#[must_use]
pub fn normalized_triples(points: &[HeatmapPoint]) -> Vec<[f64; 3]> {
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let max = points.iter().map(|p| clean(p.weight)).fold(0.0, f64::max);

    points
        .iter()
        .map(|p| {
            let weight = if max > 0.0 { clean(p.weight) / max } else { 0.0 };
            [p.latitude, p.longitude, weight]
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQuery {
    #[serde(default)]
    pub planning_authority: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub since: Option<NaiveDate>,
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
}

impl HeatmapQuery {
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(authority) = &self.planning_authority {
            pairs.push(("planningAuthority", authority.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(since) = self.since {
            pairs.push(("since", since.to_string()));
        }
        if let Some(bounds) = &self.bounds {
            pairs.push(("bounds", bounds.to_query_value()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(weight: f64) -> HeatmapPoint {
        HeatmapPoint {
            latitude: 53.0,
            longitude: -6.0,
            weight,
        }
    }

    #[test]
    fn normalizes_against_heaviest_point() {
        let triples = normalized_triples(&[point(2.0), point(8.0), point(f64::NAN), point(-1.0)]);
        assert!((triples[0][2] - 0.25).abs() < f64::EPSILON);
        assert!((triples[1][2] - 1.0).abs() < f64::EPSILON);
        assert!(triples[2][2].abs() < f64::EPSILON);
        assert!(triples[3][2].abs() < f64::EPSILON);
    }

    #[test]
    fn all_zero_weights_stay_zero() {
        let triples = normalized_triples(&[point(0.0), point(0.0)]);
        assert!(triples.iter().all(|t| t[2].abs() < f64::EPSILON));
    }

    #[test]
    fn weight_defaults_to_one() {
        let p: HeatmapPoint = serde_json::from_str(r#"{"lat":53.1,"lng":-6.1}"#).unwrap();
        assert_eq!(p.to_weighted(), [53.1, -6.1, 1.0]);
    }
}
