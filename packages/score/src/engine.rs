//! Pure score computation.

use std::collections::BTreeSet;

use ecoscore_config::ScoreDeltas;
use ecoscore_home_models::{HomeRecord, Improvement, ImprovementCategory};

use crate::ScoreError;

/// Upper bound of the score scale.
pub const MAX_SCORE: u8 = 100;

/// Computes a home's score from its baseline efficiency and improvement
/// history.
///
/// Pure and deterministic: the same baseline and the same *set* of
/// improvement categories always produce the same score, regardless of
/// list order, duplicates, or wall-clock time. Each category's delta is
/// applied at most once, so repeated logs of the same measure never
/// double-count. The result is clamped to 0-100.
///
/// # Errors
///
/// Returns [`ScoreError::Validation`] when the baseline efficiency is
/// absent or above 100. Missing or empty improvement lists are not an
/// error (zero deltas).
pub fn compute_score(
    home: &HomeRecord,
    improvements: &[Improvement],
    deltas: &ScoreDeltas,
) -> Result<u8, ScoreError> {
    let baseline = home.baseline_efficiency.ok_or_else(|| ScoreError::Validation {
        message: format!("Home {} has no baseline efficiency rating", home.id),
    })?;
    if baseline > MAX_SCORE {
        return Err(ScoreError::Validation {
            message: format!("Baseline efficiency {baseline} is outside 0-100"),
        });
    }

    let categories: BTreeSet<ImprovementCategory> =
        improvements.iter().map(|i| i.category).collect();

    let delta_sum: u16 = categories
        .iter()
        .map(|category| u16::from(deltas.delta_for(*category)))
        .sum();

    let total = u16::from(baseline) + delta_sum;

    #[allow(clippy::cast_possible_truncation)]
    Ok(total.min(u16::from(MAX_SCORE)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use ecoscore_config::Calibration;
    use uuid::Uuid;

    fn home(baseline: Option<u8>) -> HomeRecord {
        HomeRecord {
            id: Uuid::new_v4(),
            address: "1 Example Street".to_string(),
            postcode: "TV1 2AB".to_string(),
            coordinate: None,
            total_floor_area_m2: Some(120.0),
            baseline_efficiency: baseline,
            current_score: baseline.unwrap_or(0),
            score_updated_at: Utc::now(),
        }
    }

    fn improvement(home_id: Uuid, category: ImprovementCategory) -> Improvement {
        Improvement {
            id: Uuid::new_v4(),
            home_id,
            logged_by: "homeowner".to_string(),
            category,
            cost: 5000.0,
            grant_amount: None,
            estimated_annual_saving: 300.0,
            before_score: 62,
            after_score: 72,
            completed_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn deltas() -> ScoreDeltas {
        Calibration::embedded_default().score_deltas
    }

    #[test]
    fn no_improvements_returns_baseline() {
        let home = home(Some(62));
        assert_eq!(compute_score(&home, &[], &deltas()).unwrap(), 62);
    }

    #[test]
    fn applies_one_delta_per_distinct_category() {
        let home = home(Some(62));
        let deltas = deltas();
        let improvements = vec![
            improvement(home.id, ImprovementCategory::HeatPump),
            improvement(home.id, ImprovementCategory::Glazing),
        ];
        let expected = 62 + deltas.heat_pump + deltas.glazing;
        assert_eq!(
            compute_score(&home, &improvements, &deltas).unwrap(),
            expected
        );
    }

    #[test]
    fn repeated_categories_never_double_count() {
        let home = home(Some(62));
        let deltas = deltas();
        let improvements = vec![
            improvement(home.id, ImprovementCategory::HeatPump),
            improvement(home.id, ImprovementCategory::HeatPump),
            improvement(home.id, ImprovementCategory::HeatPump),
        ];
        assert_eq!(
            compute_score(&home, &improvements, &deltas).unwrap(),
            62 + deltas.heat_pump
        );
    }

    #[test]
    fn order_independent() {
        let home = home(Some(55));
        let deltas = deltas();
        let mut improvements = vec![
            improvement(home.id, ImprovementCategory::SolarPv),
            improvement(home.id, ImprovementCategory::LoftInsulation),
            improvement(home.id, ImprovementCategory::Glazing),
        ];
        let reference = compute_score(&home, &improvements, &deltas).unwrap();
        for _ in 0..improvements.len() {
            improvements.rotate_left(1);
            assert_eq!(
                compute_score(&home, &improvements, &deltas).unwrap(),
                reference
            );
        }
        improvements.reverse();
        assert_eq!(
            compute_score(&home, &improvements, &deltas).unwrap(),
            reference
        );
    }

    #[test]
    fn idempotent() {
        let home = home(Some(70));
        let improvements = vec![improvement(home.id, ImprovementCategory::HeatPump)];
        let deltas = deltas();
        let first = compute_score(&home, &improvements, &deltas).unwrap();
        let second = compute_score(&home, &improvements, &deltas).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn clamps_to_one_hundred() {
        let home = home(Some(95));
        let improvements: Vec<Improvement> = ImprovementCategory::all()
            .iter()
            .map(|category| improvement(home.id, *category))
            .collect();
        assert_eq!(compute_score(&home, &improvements, &deltas()).unwrap(), 100);
    }

    #[test]
    fn always_in_range_for_every_baseline() {
        let deltas = deltas();
        let improvements_template: Vec<ImprovementCategory> =
            ImprovementCategory::all().to_vec();
        for baseline in (0..=100).step_by(10) {
            let home = home(Some(baseline));
            let improvements: Vec<Improvement> = improvements_template
                .iter()
                .map(|category| improvement(home.id, *category))
                .collect();
            let score = compute_score(&home, &improvements, &deltas).unwrap();
            assert!(score <= 100, "Score {score} out of range");
        }
    }

    #[test]
    fn missing_baseline_is_a_validation_error() {
        let home = home(None);
        assert!(matches!(
            compute_score(&home, &[], &deltas()),
            Err(ScoreError::Validation { .. })
        ));
    }

    #[test]
    fn out_of_range_baseline_is_a_validation_error() {
        let home = home(Some(101));
        assert!(matches!(
            compute_score(&home, &[], &deltas()),
            Err(ScoreError::Validation { .. })
        ));
    }
}
