//! Preset cup sizes used as one-tap logging shortcuts.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CupSize {
    Xs,
    S,
    #[default]
    M,
    L,
    Xl,
}

impl CupSize {
    pub const ALL: [CupSize; 5] = [CupSize::Xs, CupSize::S, CupSize::M, CupSize::L, CupSize::Xl];

    /// Volume of the cup in milliliters
    pub fn volume_ml(self) -> u32 {
        match self {
            CupSize::Xs => 120,
            CupSize::S => 240,
            CupSize::M => 355,
            CupSize::L => 470,
            CupSize::Xl => 590,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CupSize::Xs => "XS",
            CupSize::S => "S",
            CupSize::M => "M",
            CupSize::L => "L",
            CupSize::Xl => "XL",
        }
    }

    /// Number of cups needed to reach `goal_ml`, rounding up
    pub fn cups_for(self, goal_ml: u32) -> u32 {
        goal_ml.div_ceil(self.volume_ml())
    }
}

impl FromStr for CupSize {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        CupSize::ALL
            .into_iter()
            .find(|cup| cup.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("unknown cup size: {}", s)))
    }
}

impl fmt::Display for CupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ml)", self.label(), self.volume_ml())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volumes_increase_with_size() {
        let volumes: Vec<u32> = CupSize::ALL.iter().map(|c| c.volume_ml()).collect();
        assert_eq!(volumes, vec![120, 240, 355, 470, 590]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("xl".parse::<CupSize>().unwrap(), CupSize::Xl);
        assert_eq!(" M ".parse::<CupSize>().unwrap(), CupSize::M);
        assert!("xxl".parse::<CupSize>().is_err());
    }

    #[test]
    fn test_cups_for_rounds_up() {
        assert_eq!(CupSize::M.cups_for(3250), 10);
        assert_eq!(CupSize::S.cups_for(2400), 10);
        assert_eq!(CupSize::S.cups_for(2401), 11);
    }
}
