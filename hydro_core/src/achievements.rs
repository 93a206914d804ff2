//! Daily hydration milestones.

use serde::Serialize;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    /// Percent progress towards unlocking, for threshold badges
    pub progress: Option<u32>,
}

/// Percent of the goal reached today, capped at 100
pub fn goal_percentage(total_ml: u32, goal_ml: u32) -> u32 {
    if goal_ml == 0 {
        return if total_ml > 0 { 100 } else { 0 };
    }
    let percent = (u64::from(total_ml) * 100 / u64::from(goal_ml)).min(100);
    percent as u32
}

fn threshold_badge(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    percent: u32,
    threshold: u32,
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        unlocked: percent >= threshold,
        progress: Some((percent * 100 / threshold).min(100)),
    }
}

/// Evaluate today's achievements
pub fn evaluate(total_ml: u32, goal_ml: u32) -> Vec<Achievement> {
    let percent = goal_percentage(total_ml, goal_ml);

    vec![
        Achievement {
            id: "first-drink",
            title: "First Sip",
            description: "Record your first water intake",
            unlocked: total_ml > 0,
            progress: None,
        },
        threshold_badge(
            "quarter-goal",
            "Getting Started",
            "Reach 25% of your daily goal",
            percent,
            25,
        ),
        threshold_badge(
            "half-goal",
            "Halfway There",
            "Reach 50% of your daily goal",
            percent,
            50,
        ),
        threshold_badge(
            "goal-complete",
            "Goal Achieved",
            "Complete your daily water goal",
            percent,
            100,
        ),
    ]
}

/// Achievements unlocked by going from `before_ml` to `after_ml`
pub fn newly_unlocked(before_ml: u32, after_ml: u32, goal_ml: u32) -> Vec<Achievement> {
    let before = evaluate(before_ml, goal_ml);
    evaluate(after_ml, goal_ml)
        .into_iter()
        .zip(before)
        .filter(|(now, was)| now.unlocked && !was.unlocked)
        .map(|(now, _)| now)
        .collect()
}
