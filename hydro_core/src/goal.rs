//! Daily water goal calculation.
//!
//! The goal is built from a weight-based base intake followed by ordered
//! multiplicative adjustments:
//! - Height: taller people need more water (170cm baseline, clamped 0.9..1.2)
//! - Age: younger adults get a bump, older adults a small reduction
//! - Activity level
//! - Ambient temperature: +2% per degree above 25°C, -1% per degree below
//!   15°C (never below 80%)
//!
//! The result is rounded to the nearest 50ml.

use crate::{ActivityLevel, CalculationMode, Environment, PersonalFactors, Sex, UserSettings};
use serde::{Deserialize, Serialize};

const MALE_ML_PER_KG: f64 = 35.0;
const FEMALE_ML_PER_KG: f64 = 31.0;

const BASELINE_HEIGHT_CM: f64 = 170.0;
const MIN_HEIGHT_FACTOR: f64 = 0.9;
const MAX_HEIGHT_FACTOR: f64 = 1.2;

const WARM_THRESHOLD_C: f64 = 25.0;
const COOL_THRESHOLD_C: f64 = 15.0;
const MIN_COLD_FACTOR: f64 = 0.8;

const ROUNDING_STEP_ML: f64 = 50.0;

/// Relative change above which a new goal is worth suggesting
pub const RECALCULATION_THRESHOLD: f64 = 0.10;

fn base_ml_per_kg(sex: Sex) -> f64 {
    match sex {
        Sex::Male => MALE_ML_PER_KG,
        Sex::Female => FEMALE_ML_PER_KG,
    }
}

fn height_factor(height_cm: f64) -> f64 {
    (height_cm / BASELINE_HEIGHT_CM).clamp(MIN_HEIGHT_FACTOR, MAX_HEIGHT_FACTOR)
}

fn age_factor(age: u32) -> f64 {
    if age < 30 {
        1.1
    } else if age > 55 {
        0.95
    } else {
        1.0
    }
}

fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 0.9,
        ActivityLevel::Light => 1.0,
        ActivityLevel::Moderate => 1.2,
        ActivityLevel::Intense => 1.5,
    }
}

fn temperature_factor(temperature_celsius: f64) -> f64 {
    if temperature_celsius > WARM_THRESHOLD_C {
        1.0 + (temperature_celsius - WARM_THRESHOLD_C) * 0.02
    } else if temperature_celsius < COOL_THRESHOLD_C {
        (1.0 - (COOL_THRESHOLD_C - temperature_celsius) * 0.01).max(MIN_COLD_FACTOR)
    } else {
        1.0
    }
}

/// Calculate the recommended daily water intake in milliliters
///
/// Inputs are not validated here (see [`PersonalFactors::validate`]). Any
/// finite input produces a value; results below zero saturate to 0.
pub fn calculate_optimal_intake(factors: &PersonalFactors, environment: &Environment) -> u32 {
    let intake = factors.weight_kg
        * base_ml_per_kg(factors.sex)
        * height_factor(factors.height_cm)
        * age_factor(factors.age)
        * activity_factor(factors.activity_level)
        * temperature_factor(environment.temperature_celsius);

    ((intake / ROUNDING_STEP_ML).round() * ROUNDING_STEP_ML) as u32
}

/// Outcome of comparing a freshly computed goal against the stored one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationAdvice {
    pub should_recalculate: bool,
    /// Computed goal, absent when recalculation is not applicable
    pub new_goal: Option<u32>,
}

impl RecalculationAdvice {
    fn not_applicable() -> Self {
        Self {
            should_recalculate: false,
            new_goal: None,
        }
    }
}

/// Decide whether the stored goal should be replaced
///
/// Only applies in automatic mode with a complete profile; otherwise no
/// goal is computed. A new goal is suggested when it differs from the
/// current one by more than 10%.
pub fn should_recalculate_goal(
    settings: &UserSettings,
    environment: &Environment,
) -> RecalculationAdvice {
    if settings.calculation_mode != CalculationMode::Automatic {
        return RecalculationAdvice::not_applicable();
    }
    let Some(factors) = settings.profile.factors() else {
        tracing::debug!("Profile incomplete, skipping goal recalculation");
        return RecalculationAdvice::not_applicable();
    };

    let new_goal = calculate_optimal_intake(&factors, environment);
    let should_recalculate = exceeds_threshold(settings.daily_goal, new_goal);

    tracing::debug!(
        "Recalculated goal {}ml vs current {}ml at {}°C (suggest: {})",
        new_goal,
        settings.daily_goal,
        environment.temperature_celsius,
        should_recalculate
    );

    RecalculationAdvice {
        should_recalculate,
        new_goal: Some(new_goal),
    }
}

fn exceeds_threshold(current: u32, new_goal: u32) -> bool {
    if current == 0 {
        return new_goal != 0;
    }
    let difference = (f64::from(new_goal) - f64::from(current)).abs() / f64::from(current);
    difference > RECALCULATION_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Profile;

    fn reference_factors() -> PersonalFactors {
        PersonalFactors {
            age: 25,
            sex: Sex::Male,
            weight_kg: 70.0,
            height_cm: 170.0,
            activity_level: ActivityLevel::Moderate,
        }
    }

    fn automatic_settings(daily_goal: u32) -> UserSettings {
        UserSettings {
            daily_goal,
            calculation_mode: CalculationMode::Automatic,
            profile: Profile::from(&reference_factors()),
            ..UserSettings::default()
        }
    }

    #[test]
    fn test_reference_calculation() {
        // 70 * 35 = 2450; * 1.1 (age) * 1.2 (moderate) = 3234 -> 3250
        let goal = calculate_optimal_intake(&reference_factors(), &Environment::default());
        assert_eq!(goal, 3250);
    }

    #[test]
    fn test_female_base_rate() {
        let mut factors = reference_factors();
        factors.sex = Sex::Female;
        factors.age = 40;
        factors.activity_level = ActivityLevel::Light;
        // 70 * 31 = 2170 -> 2150
        assert_eq!(calculate_optimal_intake(&factors, &Environment::default()), 2150);
    }

    #[test]
    fn test_height_factor_is_clamped() {
        let mut tall = reference_factors();
        tall.height_cm = 250.0;
        let mut taller = reference_factors();
        taller.height_cm = 240.0;
        let env = Environment::default();
        assert_eq!(
            calculate_optimal_intake(&tall, &env),
            calculate_optimal_intake(&taller, &env)
        );

        let mut short = reference_factors();
        short.height_cm = 100.0;
        // 2450 * 0.9 * 1.1 * 1.2 = 2910.6 -> 2900
        assert_eq!(calculate_optimal_intake(&short, &env), 2900);
    }

    #[test]
    fn test_age_brackets() {
        let env = Environment::default();
        let mut factors = reference_factors();
        factors.activity_level = ActivityLevel::Light;

        factors.age = 30;
        assert_eq!(calculate_optimal_intake(&factors, &env), 2450);
        factors.age = 55;
        assert_eq!(calculate_optimal_intake(&factors, &env), 2450);
        factors.age = 56;
        // 2450 * 0.95 = 2327.5 -> 2350
        assert_eq!(calculate_optimal_intake(&factors, &env), 2350);
    }

    #[test]
    fn test_hot_weather_increases_goal() {
        // 3234 * 1.1 = 3557.4 -> 3550
        let goal = calculate_optimal_intake(&reference_factors(), &Environment::new(30.0));
        assert_eq!(goal, 3550);
    }

    #[test]
    fn test_cold_weather_floor() {
        let factors = reference_factors();
        let freezing = calculate_optimal_intake(&factors, &Environment::new(-40.0));
        let floor = calculate_optimal_intake(&factors, &Environment::new(-5.0));
        // Both hit the 0.8 floor: 3234 * 0.8 = 2587.2 -> 2600
        assert_eq!(freezing, 2600);
        assert_eq!(floor, 2600);

        // 10°C: 3234 * 0.95 = 3072.3 -> 3050
        assert_eq!(calculate_optimal_intake(&factors, &Environment::new(10.0)), 3050);
    }

    #[test]
    fn test_temperate_band_is_neutral() {
        let factors = reference_factors();
        for t in [15.0, 20.0, 25.0] {
            assert_eq!(calculate_optimal_intake(&factors, &Environment::new(t)), 3250);
        }
    }

    #[test]
    fn test_output_is_multiple_of_50() {
        let env = Environment::new(28.5);
        for weight in [45.0, 58.3, 77.7, 91.2, 130.0] {
            for level in ActivityLevel::ALL {
                let factors = PersonalFactors {
                    weight_kg: weight,
                    activity_level: level,
                    ..reference_factors()
                };
                assert_eq!(calculate_optimal_intake(&factors, &env) % 50, 0);
            }
        }
    }

    #[test]
    fn test_activity_monotonic() {
        let env = Environment::default();
        let goals: Vec<u32> = ActivityLevel::ALL
            .iter()
            .map(|level| {
                let factors = PersonalFactors {
                    activity_level: *level,
                    ..reference_factors()
                };
                calculate_optimal_intake(&factors, &env)
            })
            .collect();
        assert!(goals.windows(2).all(|w| w[0] <= w[1]), "{:?}", goals);
    }

    #[test]
    fn test_deterministic() {
        let factors = reference_factors();
        let env = Environment::new(27.0);
        let first = calculate_optimal_intake(&factors, &env);
        for _ in 0..10 {
            assert_eq!(calculate_optimal_intake(&factors, &env), first);
        }
    }

    #[test]
    fn test_does_not_panic_on_odd_inputs() {
        let factors = PersonalFactors {
            age: 0,
            sex: Sex::Female,
            weight_kg: -10.0,
            height_cm: 0.0,
            activity_level: ActivityLevel::Sedentary,
        };
        assert_eq!(calculate_optimal_intake(&factors, &Environment::new(1e6)), 0);
    }

    #[test]
    fn test_recalculate_within_threshold() {
        // 3250 vs 3000 is 8.3%
        let advice = should_recalculate_goal(&automatic_settings(3000), &Environment::default());
        assert!(!advice.should_recalculate);
        assert_eq!(advice.new_goal, Some(3250));
    }

    #[test]
    fn test_recalculate_beyond_threshold() {
        let advice = should_recalculate_goal(&automatic_settings(2000), &Environment::default());
        assert!(advice.should_recalculate);
        assert_eq!(advice.new_goal, Some(3250));
    }

    #[test]
    fn test_recalculate_requires_automatic_mode() {
        let mut settings = automatic_settings(1000);
        settings.calculation_mode = CalculationMode::Manual;
        let advice = should_recalculate_goal(&settings, &Environment::default());
        assert_eq!(
            advice,
            RecalculationAdvice {
                should_recalculate: false,
                new_goal: None
            }
        );
    }

    #[test]
    fn test_recalculate_requires_complete_profile() {
        let mut settings = automatic_settings(1000);
        settings.profile.activity_level = None;
        let advice = should_recalculate_goal(&settings, &Environment::default());
        assert!(!advice.should_recalculate);
        assert!(advice.new_goal.is_none());
    }

    #[test]
    fn test_recalculate_uses_temperature() {
        // 3250 stored; at 35°C the goal is 3234 * 1.2 = 3880.8 -> 3900 (20%)
        let advice = should_recalculate_goal(&automatic_settings(3250), &Environment::new(35.0));
        assert!(advice.should_recalculate);
        assert_eq!(advice.new_goal, Some(3900));
    }
}
