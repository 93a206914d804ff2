//! Weather-based goal adjustment.
//!
//! Given an observation supplied by the user (there is no weather service),
//! suggest a one-off additive adjustment to today's goal.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    Cloudy,
    Rainy,
    Hot,
}

impl FromStr for WeatherCondition {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clear" => Ok(WeatherCondition::Clear),
            "cloudy" => Ok(WeatherCondition::Cloudy),
            "rainy" => Ok(WeatherCondition::Rainy),
            "hot" => Ok(WeatherCondition::Hot),
            other => Err(Error::Validation(format!("unknown weather condition: {}", other))),
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Hot => "hot",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    pub temperature_celsius: f64,
    pub condition: WeatherCondition,
}

impl WeatherObservation {
    /// Hot enough that drinking more is worth suggesting
    pub fn is_hot(&self) -> bool {
        self.temperature_celsius > 25.0 || self.condition == WeatherCondition::Hot
    }

    /// Additive goal change in milliliters
    pub fn goal_adjustment(&self) -> i32 {
        let mut adjustment = 0;

        if self.temperature_celsius > 30.0 {
            adjustment += 500;
        } else if self.temperature_celsius > 25.0 {
            adjustment += 300;
        } else if self.temperature_celsius < 10.0 {
            adjustment -= 100;
        }

        match self.condition {
            WeatherCondition::Hot => adjustment += 200,
            WeatherCondition::Rainy => adjustment -= 100,
            WeatherCondition::Clear | WeatherCondition::Cloudy => {}
        }

        adjustment
    }

    /// Suggested goal, or None when no adjustment is warranted
    ///
    /// Adjustments are only offered in hot weather.
    pub fn suggested_goal(&self, current_goal: u32) -> Option<u32> {
        let adjustment = self.goal_adjustment();
        if !self.is_hot() || adjustment == 0 {
            return None;
        }
        let adjusted = i64::from(current_goal) + i64::from(adjustment);
        Some(u32::try_from(adjusted.max(0)).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(temperature_celsius: f64, condition: WeatherCondition) -> WeatherObservation {
        WeatherObservation {
            temperature_celsius,
            condition,
        }
    }

    #[test]
    fn test_adjustment_table() {
        assert_eq!(obs(32.0, WeatherCondition::Hot).goal_adjustment(), 700);
        assert_eq!(obs(27.0, WeatherCondition::Clear).goal_adjustment(), 300);
        assert_eq!(obs(20.0, WeatherCondition::Cloudy).goal_adjustment(), 0);
        assert_eq!(obs(5.0, WeatherCondition::Rainy).goal_adjustment(), -200);
    }

    #[test]
    fn test_suggestion_only_when_hot() {
        assert_eq!(obs(27.0, WeatherCondition::Clear).suggested_goal(2000), Some(2300));
        assert_eq!(obs(20.0, WeatherCondition::Hot).suggested_goal(2000), Some(2200));
        assert_eq!(obs(5.0, WeatherCondition::Rainy).suggested_goal(2000), None);
        assert_eq!(obs(20.0, WeatherCondition::Clear).suggested_goal(2000), None);
    }

    #[test]
    fn test_parse_condition() {
        assert_eq!("Rainy".parse::<WeatherCondition>().unwrap(), WeatherCondition::Rainy);
        assert!("foggy".parse::<WeatherCondition>().is_err());
    }
}
