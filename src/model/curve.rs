use std::str::FromStr;

use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::warn;

use crate::model::constants::{MAX_ACCURACY, MAX_CURVE_POINTS};

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("curve definition is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid curve type '{0}', expected 'basic' or 'linear'")]
    UnknownType(String),

    #[error("a '{kind}' curve requires the '{field}' field")]
    MissingField { kind: CurveKind, field: &'static str },

    #[error("the cutoff may not be 0")]
    ZeroCutoff,

    #[error("the curve must start and end with [0.0,0.0], [1.0,1.0] respectively")]
    BadEndpoints,

    #[error("you may not have more than 15 points in your curve, got {0}")]
    TooManyPoints(usize),

    #[error("the x values for every point must be unique and ascending in order")]
    NotAscending
}

/// Curve type tag as it appears in the `type` field of a curve definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum CurveKind {
    #[strum(serialize = "basic")]
    Exponential,
    #[strum(serialize = "linear")]
    Linear
}

/// Wire shape of a curve definition. Every variant field is optional here;
/// [`Curve::try_from`] decides which ones are required.
#[derive(Debug, Clone, Deserialize)]
pub struct CurveDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub baseline: Option<f64>,
    pub cutoff: Option<f64>,
    pub exponential: Option<f64>,
    pub points: Option<Vec<[f64; 2]>>
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialCurve {
    baseline: f64,
    cutoff: f64,
    exponential: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearCurve {
    points: Vec<[f64; 2]>
}

/// A validated reward curve. Values of this type can only be obtained
/// through the checked constructors, so evaluation never has to re-validate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CurveDefinition")]
pub enum Curve {
    Exponential(ExponentialCurve),
    Linear(LinearCurve)
}

impl ExponentialCurve {
    pub fn new(baseline: f64, cutoff: f64, exponential: f64) -> Result<Self, CurveError> {
        if cutoff == 0.0 {
            return Err(CurveError::ZeroCutoff);
        }

        if !(0.0..=MAX_ACCURACY).contains(&baseline) {
            warn!(baseline, "Baseline is outside 0-100, the curve works on percent accuracy");
        }

        Ok(ExponentialCurve {
            baseline,
            cutoff,
            exponential
        })
    }

    pub fn evaluate(&self, accuracy: f64) -> f64 {
        let acc = accuracy.min(MAX_ACCURACY);
        let linear_part = acc / 100.0 * self.cutoff;

        if acc < self.baseline {
            return linear_part;
        }

        linear_part
            + (1.0 - self.cutoff) * ((acc - self.baseline) / (MAX_ACCURACY - self.baseline).powf(self.exponential))
    }
}

impl LinearCurve {
    pub fn new(points: Vec<[f64; 2]>) -> Result<Self, CurveError> {
        match (points.first(), points.last()) {
            (Some(first), Some(last)) if *first == [0.0, 0.0] && *last == [1.0, 1.0] => {}
            _ => return Err(CurveError::BadEndpoints)
        }

        if points.len() > MAX_CURVE_POINTS {
            return Err(CurveError::TooManyPoints(points.len()));
        }

        if points.windows(2).any(|w| w[0][0] >= w[1][0]) {
            return Err(CurveError::NotAscending);
        }

        Ok(LinearCurve { points })
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn evaluate(&self, accuracy: f64) -> f64 {
        let f = accuracy.clamp(0.0, MAX_ACCURACY) / MAX_ACCURACY;
        let last = self.points[self.points.len() - 1];
        if f >= last[0] {
            return last[1];
        }

        // First point to the right of f. Index 0 is never chosen since x0 == 0 <= f.
        let i = self
            .points
            .iter()
            .position(|p| f < p[0])
            .unwrap_or(self.points.len() - 1);
        let [x0, y0] = self.points[i - 1];
        let [x1, y1] = self.points[i];

        let t = (f - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }
}

impl Curve {
    /// Parses and validates a JSON curve definition such as
    /// `{"type": "linear", "points": [[0.0, 0.0], [0.8, 0.5], [1.0, 1.0]]}`.
    pub fn from_json(input: &str) -> Result<Self, CurveError> {
        let definition: CurveDefinition = serde_json::from_str(input)?;
        Curve::try_from(definition)
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Exponential(_) => CurveKind::Exponential,
            Curve::Linear(_) => CurveKind::Linear
        }
    }

    /// Maps a percent accuracy onto the curve's weighted value.
    /// Accuracies above 100 are treated as 100.
    pub fn evaluate(&self, accuracy: f64) -> f64 {
        match self {
            Curve::Exponential(c) => c.evaluate(accuracy),
            Curve::Linear(c) => c.evaluate(accuracy)
        }
    }
}

impl TryFrom<CurveDefinition> for Curve {
    type Error = CurveError;

    fn try_from(definition: CurveDefinition) -> Result<Self, Self::Error> {
        let kind = CurveKind::from_str(&definition.kind).map_err(|_| CurveError::UnknownType(definition.kind.clone()))?;
        let required = |value: Option<f64>, field: &'static str| value.ok_or(CurveError::MissingField { kind, field });

        match kind {
            CurveKind::Exponential => Ok(Curve::Exponential(ExponentialCurve::new(
                required(definition.baseline, "baseline")?,
                required(definition.cutoff, "cutoff")?,
                required(definition.exponential, "exponential")?
            )?)),
            CurveKind::Linear => {
                let points = definition.points.ok_or(CurveError::MissingField { kind, field: "points" })?;
                Ok(Curve::Linear(LinearCurve::new(points)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::random_linear_curve;
    use approx::assert_abs_diff_eq;
    use strum::IntoEnumIterator;

    fn exponential() -> Curve {
        Curve::from_json(r#"{"type": "basic", "baseline": 78, "cutoff": 0.5, "exponential": 2.5}"#).unwrap()
    }

    fn linear() -> Curve {
        Curve::from_json(r#"{"type": "linear", "points": [[0.0, 0.0], [0.8, 0.5], [1.0, 1.0]]}"#).unwrap()
    }

    #[test]
    fn test_exponential_at_zero() {
        assert_eq!(exponential().evaluate(0.0), 0.0);
    }

    #[test]
    fn test_exponential_at_full_accuracy() {
        let expected = 0.5 + 0.5 * (22.0 / 22f64.powf(2.5));
        assert_abs_diff_eq!(exponential().evaluate(100.0), expected);
    }

    #[test]
    fn test_exponential_below_baseline_is_linear() {
        assert_abs_diff_eq!(exponential().evaluate(50.0), 0.25);
    }

    #[test]
    fn test_exponential_clamps_accuracy() {
        let curve = exponential();
        assert_eq!(curve.evaluate(130.0), curve.evaluate(100.0));
    }

    #[test]
    fn test_exponential_monotonic() {
        let curve = exponential();
        let mut previous = curve.evaluate(0.0);
        for step in 1..=1000 {
            let value = curve.evaluate(step as f64 / 10.0);
            assert!(value >= previous, "curve decreased at {}", step as f64 / 10.0);
            previous = value;
        }
    }

    #[test]
    fn test_linear_endpoints() {
        let curve = linear();
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(100.0), 1.0);
        assert_eq!(curve.evaluate(120.0), 1.0);
    }

    #[test]
    fn test_linear_on_control_point() {
        assert_abs_diff_eq!(linear().evaluate(80.0), 0.5);
    }

    #[test]
    fn test_linear_interpolates() {
        assert_abs_diff_eq!(linear().evaluate(40.0), 0.25);
        assert_abs_diff_eq!(linear().evaluate(90.0), 0.75);
    }

    #[test]
    fn test_random_linear_curves_stay_monotonic() {
        for seed in 0..20 {
            let curve = Curve::Linear(random_linear_curve(seed, 2 + (seed as usize % 14)));
            let mut previous = curve.evaluate(0.0);
            for step in 1..=100 {
                let value = curve.evaluate(step as f64);
                assert!(value + 1e-12 >= previous);
                previous = value;
            }
            assert_eq!(previous, 1.0);
        }
    }

    #[test]
    fn test_reject_zero_cutoff() {
        let result = Curve::from_json(r#"{"type": "basic", "baseline": 78, "cutoff": 0, "exponential": 2.5}"#);
        assert!(matches!(result, Err(CurveError::ZeroCutoff)));
    }

    #[test]
    fn test_reject_too_many_points() {
        let mut points = vec![[0.0, 0.0]];
        points.extend((1..15).map(|i| [i as f64 / 15.0, i as f64 / 15.0]));
        points.push([1.0, 1.0]);
        assert_eq!(points.len(), 16);

        assert!(matches!(LinearCurve::new(points), Err(CurveError::TooManyPoints(16))));
    }

    #[test]
    fn test_accept_fifteen_points() {
        let mut points = vec![[0.0, 0.0]];
        points.extend((1..14).map(|i| [i as f64 / 14.0, i as f64 / 14.0]));
        points.push([1.0, 1.0]);

        assert!(LinearCurve::new(points).is_ok());
    }

    #[test]
    fn test_reject_bad_last_point() {
        let result = Curve::from_json(r#"{"type": "linear", "points": [[0.0, 0.0], [0.5, 0.5], [1.0, 0.99]]}"#);
        assert!(matches!(result, Err(CurveError::BadEndpoints)));
    }

    #[test]
    fn test_reject_bad_first_point() {
        assert!(matches!(
            LinearCurve::new(vec![[0.1, 0.0], [1.0, 1.0]]),
            Err(CurveError::BadEndpoints)
        ));
    }

    #[test]
    fn test_reject_empty_points() {
        assert!(matches!(LinearCurve::new(vec![]), Err(CurveError::BadEndpoints)));
    }

    #[test]
    fn test_reject_non_ascending() {
        let result =
            Curve::from_json(r#"{"type": "linear", "points": [[0, 0], [0.5, 0.3], [0.4, 0.6], [1, 1]]}"#);
        assert!(matches!(result, Err(CurveError::NotAscending)));
    }

    #[test]
    fn test_reject_unknown_type() {
        let result = Curve::from_json(r#"{"type": "cubic"}"#);
        assert!(matches!(result, Err(CurveError::UnknownType(t)) if t == "cubic"));
    }

    #[test]
    fn test_reject_missing_field() {
        let result = Curve::from_json(r#"{"type": "basic", "baseline": 78, "cutoff": 0.5}"#);
        assert!(matches!(
            result,
            Err(CurveError::MissingField {
                kind: CurveKind::Exponential,
                field: "exponential"
            })
        ));
    }

    #[test]
    fn test_reject_malformed_json() {
        assert!(matches!(Curve::from_json("{not json"), Err(CurveError::Parse(_))));
    }

    #[test]
    fn test_deserialize_validates() {
        let result: Result<Curve, serde_json::Error> = serde_json::from_str(r#"{"type": "basic", "baseline": 78, "cutoff": 0, "exponential": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_tags() {
        let tags = CurveKind::iter().map(|k| k.to_string()).collect::<Vec<_>>();
        assert_eq!(tags, vec!["basic", "linear"]);
        assert_eq!(exponential().kind(), CurveKind::Exponential);
        assert_eq!(linear().kind(), CurveKind::Linear);
    }
}
