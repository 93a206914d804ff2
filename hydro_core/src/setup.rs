//! First-run setup.
//!
//! Validates the answers collected during setup and turns them into
//! settings: an automatic goal derived from the personal factors and a
//! reminder cadence spread over the user's awake hours.

use crate::goal::calculate_optimal_intake;
use crate::reminder::{suggest_reminder_interval, SleepWindow};
use crate::{CalculationMode, CupSize, Environment, PersonalFactors, Profile, Result, UserSettings};

pub const DEFAULT_WAKE_TIME: &str = "08:00";
pub const DEFAULT_SLEEP_TIME: &str = "22:00";

/// Answers collected during setup
#[derive(Clone, Debug)]
pub struct SetupInput {
    pub cup_size: CupSize,
    pub factors: PersonalFactors,
    pub smart_scheduling: bool,
    pub wake_time: String,
    pub sleep_time: String,
}

impl SetupInput {
    pub fn new(factors: PersonalFactors) -> Self {
        Self {
            cup_size: CupSize::default(),
            factors,
            smart_scheduling: false,
            wake_time: DEFAULT_WAKE_TIME.into(),
            sleep_time: DEFAULT_SLEEP_TIME.into(),
        }
    }

    /// Validate the answers and merge them into `base`
    ///
    /// Theme and other unrelated preferences in `base` are preserved.
    pub fn apply(&self, base: UserSettings, environment: &Environment) -> Result<UserSettings> {
        self.factors.validate()?;
        let window = SleepWindow::parse(&self.wake_time, &self.sleep_time)?;

        let daily_goal = calculate_optimal_intake(&self.factors, environment);
        let reminder_interval = suggest_reminder_interval(
            daily_goal,
            self.cup_size,
            self.smart_scheduling.then_some(&window),
        );

        tracing::info!(
            "Setup complete: goal {}ml, reminders every {} minutes",
            daily_goal,
            reminder_interval
        );

        Ok(UserSettings {
            daily_goal,
            reminder_enabled: true,
            reminder_interval,
            setup_completed: true,
            calculation_mode: CalculationMode::Automatic,
            profile: Profile::from(&self.factors),
            cup_size: self.cup_size,
            smart_scheduling: self.smart_scheduling,
            wake_time: Some(self.wake_time.trim().to_string()),
            sleep_time: Some(self.sleep_time.trim().to_string()),
            ..base
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActivityLevel, Error, Sex, Theme};

    fn input() -> SetupInput {
        SetupInput::new(PersonalFactors {
            age: 25,
            sex: Sex::Male,
            weight_kg: 70.0,
            height_cm: 170.0,
            activity_level: ActivityLevel::Moderate,
        })
    }

    #[test]
    fn test_setup_without_smart_scheduling() {
        let settings = input()
            .apply(UserSettings::default(), &Environment::default())
            .unwrap();
        assert_eq!(settings.daily_goal, 3250);
        assert_eq!(settings.reminder_interval, 60);
        assert!(settings.setup_completed);
        assert_eq!(settings.calculation_mode, CalculationMode::Automatic);
        assert!(settings.profile.factors().is_some());
    }

    #[test]
    fn test_setup_with_smart_scheduling() {
        let mut answers = input();
        answers.smart_scheduling = true;
        let settings = answers
            .apply(UserSettings::default(), &Environment::default())
            .unwrap();
        assert_eq!(settings.reminder_interval, 76);
        assert!(settings.smart_scheduling);
        assert_eq!(settings.wake_time.as_deref(), Some("08:00"));
    }

    #[test]
    fn test_setup_preserves_unrelated_preferences() {
        let base = UserSettings {
            theme: Theme::Dark,
            ..UserSettings::default()
        };
        let settings = input().apply(base, &Environment::default()).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_setup_rejects_invalid_input() {
        let mut answers = input();
        answers.factors.age = 150;
        assert!(matches!(
            answers.apply(UserSettings::default(), &Environment::default()),
            Err(Error::Validation(_))
        ));

        let mut answers = input();
        answers.wake_time = "8am".into();
        assert!(matches!(
            answers.apply(UserSettings::default(), &Environment::default()),
            Err(Error::InvalidTimeFormat(_))
        ));
    }
}
