use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use hydro_core::achievements;
use hydro_core::history::{self, DailyTotal};
use hydro_core::reminder::parse_time_of_day;
use hydro_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hydro")]
#[command(about = "Personal water intake tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter personal factors and derive a daily goal
    Setup {
        #[arg(long)]
        age: u32,

        /// male or female
        #[arg(long)]
        sex: Sex,

        /// Body weight in kg
        #[arg(long)]
        weight: f64,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// sedentary, light, moderate or intense
        #[arg(long, default_value = "moderate")]
        activity: ActivityLevel,

        /// Cup you usually drink from (xs, s, m, l, xl)
        #[arg(long, default_value = "m")]
        cup: CupSize,

        /// Only remind during awake hours
        #[arg(long)]
        smart: bool,

        /// Wake time (HH:MM)
        #[arg(long, default_value = setup::DEFAULT_WAKE_TIME)]
        wake: String,

        /// Sleep time (HH:MM)
        #[arg(long, default_value = setup::DEFAULT_SLEEP_TIME)]
        sleep: String,

        /// Ambient temperature in °C
        #[arg(long, allow_negative_numbers = true)]
        temperature: Option<f64>,
    },

    /// Record a drink (defaults to one cup of your usual size)
    Drink {
        /// Amount in ml
        #[arg(
            long,
            conflicts_with = "cup",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DRINK_ML))
        )]
        amount: Option<u32>,

        /// Log one cup of this size instead
        #[arg(long)]
        cup: Option<CupSize>,
    },

    /// Show today's progress (default)
    Status,

    /// Show daily totals for recent days
    History {
        /// Number of days to show
        #[arg(
            long,
            default_value_t = history::WEEKLY_DAYS,
            conflicts_with = "monthly",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(history::MAX_HISTORY_DAYS))
        )]
        days: u32,

        /// Show the last 30 days
        #[arg(long)]
        monthly: bool,
    },

    /// Check whether a reminder is due right now
    Remind {
        /// Evaluate at this time of day instead of now (HH:MM)
        #[arg(long, value_parser = parse_at)]
        at: Option<NaiveTime>,
    },

    /// Run the reminder timer in the foreground
    Watch {
        /// Stop after this many polls
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Recompute the automatic goal for the current temperature
    Recalc {
        /// Ambient temperature in °C
        #[arg(long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        /// Store the new goal if a change is suggested
        #[arg(long)]
        apply: bool,
    },

    /// Suggest a goal adjustment for today's weather
    Weather {
        /// Temperature in °C
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        /// clear, cloudy, rainy or hot
        #[arg(long, default_value = "clear")]
        condition: WeatherCondition,

        /// Store the adjusted goal
        #[arg(long)]
        apply: bool,
    },

    /// Set the daily goal manually or switch back to automatic
    Goal {
        /// Fixed goal in ml
        #[arg(long, conflicts_with = "auto")]
        set: Option<u32>,

        /// Derive the goal from personal factors
        #[arg(long)]
        auto: bool,
    },

    /// Show or change preferences
    Settings {
        /// Minutes between reminders
        #[arg(long)]
        interval: Option<u32>,

        /// Turn reminders on or off
        #[arg(long, value_parser = parse_switch)]
        reminders: Option<bool>,

        /// Only remind during awake hours (on/off)
        #[arg(long, value_parser = parse_switch)]
        smart: Option<bool>,

        /// Wake time (HH:MM)
        #[arg(long, value_parser = parse_at)]
        wake: Option<NaiveTime>,

        /// Sleep time (HH:MM)
        #[arg(long, value_parser = parse_at)]
        sleep: Option<NaiveTime>,

        /// Usual cup size
        #[arg(long)]
        cup: Option<CupSize>,

        /// light or dark
        #[arg(long, conflicts_with = "toggle_theme")]
        theme: Option<Theme>,

        /// Switch between light and dark
        #[arg(long)]
        toggle_theme: bool,

        /// default, ocean, forest, sunset or lavender
        #[arg(long)]
        color_theme: Option<ColorTheme>,
    },

    /// Roll up the intake journal into the CSV archive
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// File layout under the data directory
struct DataPaths {
    journal_dir: PathBuf,
    journal: PathBuf,
    archive: PathBuf,
    settings: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let journal_dir = data_dir.join("journal");
        Self {
            journal: journal_dir.join("intake.jsonl"),
            journal_dir,
            archive: data_dir.join("intake.csv"),
            settings: data_dir.join("settings.json"),
        }
    }
}

fn parse_at(text: &str) -> std::result::Result<NaiveTime, String> {
    parse_time_of_day(text).map_err(|e| e.to_string())
}

fn parse_switch(text: &str) -> std::result::Result<bool, String> {
    match text.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on or off, got {}", other)),
    }
}

fn main() -> Result<()> {
    hydro_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Setup {
            age,
            sex,
            weight,
            height,
            activity,
            cup,
            smart,
            wake,
            sleep,
            temperature,
        }) => {
            let input = SetupInput {
                cup_size: cup,
                factors: PersonalFactors {
                    age,
                    sex,
                    weight_kg: weight,
                    height_cm: height,
                    activity_level: activity,
                },
                smart_scheduling: smart,
                wake_time: wake,
                sleep_time: sleep,
            };
            cmd_setup(&paths, &input, config.environment(temperature))
        }
        Some(Commands::Drink { amount, cup }) => cmd_drink(&paths, amount, cup),
        Some(Commands::Status) | None => cmd_status(&paths, &config),
        Some(Commands::History { days, monthly }) => {
            let days = if monthly { history::MONTHLY_DAYS } else { days };
            cmd_history(&paths, days)
        }
        Some(Commands::Remind { at }) => cmd_remind(&paths, at),
        Some(Commands::Watch { ticks }) => cmd_watch(&paths, &config, ticks),
        Some(Commands::Recalc { temperature, apply }) => {
            cmd_recalc(&paths, config.environment(temperature), apply)
        }
        Some(Commands::Weather {
            temperature,
            condition,
            apply,
        }) => cmd_weather(
            &paths,
            WeatherObservation {
                temperature_celsius: temperature,
                condition,
            },
            apply,
        ),
        Some(Commands::Goal { set, auto }) => cmd_goal(&paths, &config, set, auto),
        Some(Commands::Settings {
            interval,
            reminders,
            smart,
            wake,
            sleep,
            cup,
            theme,
            toggle_theme,
            color_theme,
        }) => {
            let changes = SettingsChanges {
                interval,
                reminders,
                smart,
                wake,
                sleep,
                cup,
                theme,
                toggle_theme,
                color_theme,
            };
            cmd_settings(&paths, changes)
        }
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
    }
}

fn cmd_setup(paths: &DataPaths, input: &SetupInput, environment: Environment) -> Result<()> {
    let settings = UserSettings::update(&paths.settings, |settings| {
        *settings = input.apply(settings.clone(), &environment)?;
        Ok(())
    })?;

    println!("✓ Setup complete!");
    println!("  Daily goal: {} ml", settings.daily_goal);
    println!(
        "  That's about {} cups of {}",
        settings.cup_size.cups_for(settings.daily_goal),
        settings.cup_size
    );
    println!("  Reminders every {} minutes", settings.reminder_interval);
    if settings.smart_scheduling {
        println!(
            "  Only between {} and {}",
            settings.wake_time.as_deref().unwrap_or("?"),
            settings.sleep_time.as_deref().unwrap_or("?")
        );
    }
    Ok(())
}

fn todays_total(paths: &DataPaths) -> Result<u32> {
    let entries = history::load_entries(&paths.journal, &paths.archive)?;
    Ok(history::total_on(&entries, Local::now().date_naive(), &Local))
}

fn cmd_drink(paths: &DataPaths, amount: Option<u32>, cup: Option<CupSize>) -> Result<()> {
    let settings = UserSettings::load(&paths.settings)?;
    let amount = match (amount, cup) {
        (Some(ml), _) => ml,
        (None, Some(cup)) => cup.volume_ml(),
        (None, None) => settings.cup_size.volume_ml(),
    };
    let before = todays_total(paths)?;

    let entry = IntakeEntry::now(amount);
    let mut journal = JsonlJournal::new(&paths.journal);
    journal.append(&entry)?;

    let after = before.saturating_add(amount);
    println!("✓ Logged {} ml", amount);
    println!(
        "  Today: {} / {} ml ({}%)",
        after,
        settings.daily_goal,
        achievements::goal_percentage(after, settings.daily_goal)
    );

    for achievement in achievements::newly_unlocked(before, after, settings.daily_goal) {
        println!("  🏅 Achievement unlocked: {}", achievement.title);
    }
    Ok(())
}

fn cmd_status(paths: &DataPaths, config: &Config) -> Result<()> {
    let settings = UserSettings::load(&paths.settings)?;
    let total = todays_total(paths)?;
    let percent = achievements::goal_percentage(total, settings.daily_goal);

    if !settings.setup_completed {
        println!("Tip: run `hydro setup` to personalise your daily goal.\n");
    }

    println!("Today: {} / {} ml ({}%)", total, settings.daily_goal, percent);
    println!("  {}", progress_bar(total, settings.daily_goal, 30));
    let remaining = settings.daily_goal.saturating_sub(total);
    if remaining > 0 {
        println!(
            "  {} ml to go (~{} × {})",
            remaining,
            settings.cup_size.cups_for(remaining),
            settings.cup_size
        );
    } else {
        println!("  Goal reached!");
    }

    println!();
    println!("Achievements:");
    for achievement in achievements::evaluate(total, settings.daily_goal) {
        let mark = if achievement.unlocked { "✓" } else { " " };
        match achievement.progress {
            Some(progress) if !achievement.unlocked => println!(
                "  [{}] {} - {} ({}%)",
                mark, achievement.title, achievement.description, progress
            ),
            _ => println!(
                "  [{}] {} - {}",
                mark, achievement.title, achievement.description
            ),
        }
    }

    println!();
    if settings.reminder_enabled {
        println!("Reminders: every {} minutes", settings.reminder_interval);
        if let Some(next) = next_reminder_time(&settings, Local::now().naive_local())? {
            println!("  Next wake-time reminder: {}", next.format("%Y-%m-%d %H:%M"));
        }
    } else {
        println!("Reminders: off");
    }

    let advice = should_recalculate_goal(&settings, &config.environment(None));
    if let (true, Some(new_goal)) = (advice.should_recalculate, advice.new_goal) {
        println!();
        println!(
            "Your recommended goal is now {} ml. Run `hydro recalc --apply` to update.",
            new_goal
        );
    }
    Ok(())
}

fn progress_bar(amount: u32, goal: u32, width: usize) -> String {
    let filled = if goal == 0 {
        width
    } else {
        ((amount as usize) * width / goal as usize).min(width)
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn cmd_history(paths: &DataPaths, days: u32) -> Result<()> {
    let settings = UserSettings::load(&paths.settings)?;
    let entries = history::load_entries(&paths.journal, &paths.archive)?;
    let totals = history::daily_totals(&entries, Local::now().date_naive(), days, &Local);

    println!("Last {} days (goal {} ml):", days, settings.daily_goal);
    for DailyTotal { date, amount_ml } in &totals {
        println!(
            "  {}  {}  {:>5} ml",
            date.format("%a %m-%d"),
            progress_bar(*amount_ml, settings.daily_goal, 20),
            amount_ml
        );
    }

    let sum: u64 = totals.iter().map(|t| u64::from(t.amount_ml)).sum();
    let days_met = totals
        .iter()
        .filter(|t| t.amount_ml >= settings.daily_goal)
        .count();
    if !totals.is_empty() {
        println!();
        println!(
            "Average: {} ml/day, goal met on {} of {} days",
            sum / totals.len() as u64,
            days_met,
            totals.len()
        );
    }
    Ok(())
}

fn cmd_remind(paths: &DataPaths, at: Option<NaiveTime>) -> Result<()> {
    let settings = UserSettings::load(&paths.settings)?;
    if !settings.reminder_enabled {
        println!("Reminders are disabled.");
        return Ok(());
    }

    let now = at.unwrap_or_else(|| Local::now().time());
    if should_show_reminder(&settings, now)? {
        print_reminder(paths, &settings)?;
    } else {
        println!(
            "Outside your awake hours ({}) - reminder suppressed.",
            now.format("%H:%M")
        );
    }
    Ok(())
}

fn print_reminder(paths: &DataPaths, settings: &UserSettings) -> Result<()> {
    let total = todays_total(paths)?;
    println!("💧 Time to drink some water!");
    println!(
        "  Today: {} / {} ml ({}%)",
        total,
        settings.daily_goal,
        achievements::goal_percentage(total, settings.daily_goal)
    );
    Ok(())
}

fn cmd_watch(paths: &DataPaths, config: &Config, ticks: Option<u64>) -> Result<()> {
    let mut settings = UserSettings::load(&paths.settings)?;
    if !settings.reminder_enabled {
        println!("Reminders are disabled.");
        return Ok(());
    }

    let tick = std::time::Duration::from_secs(config.reminders.watch_tick_seconds);
    let mut timer = ReminderTimer::start(settings.reminder_interval, Local::now().naive_local());
    println!(
        "Watching: reminders every {} minutes (Ctrl+C to stop)",
        settings.reminder_interval
    );

    let mut polls = 0;
    while ticks.map_or(true, |limit| polls < limit) {
        std::thread::sleep(tick);
        polls += 1;

        // Pick up changes made by other commands while we run
        let latest = UserSettings::load(&paths.settings)?;
        if latest.reminder_interval != settings.reminder_interval {
            tracing::info!(
                "Reminder interval changed to {} minutes, restarting timer",
                latest.reminder_interval
            );
            timer = ReminderTimer::start(latest.reminder_interval, Local::now().naive_local());
        }
        settings = latest;
        if !settings.reminder_enabled {
            println!("Reminders were turned off.");
            break;
        }

        match timer.poll(&settings, Local::now().naive_local())? {
            ReminderTick::Fire => print_reminder(paths, &settings)?,
            ReminderTick::Suppressed | ReminderTick::Waiting => {}
        }
    }
    Ok(())
}

fn cmd_recalc(paths: &DataPaths, environment: Environment, apply: bool) -> Result<()> {
    let settings = UserSettings::load(&paths.settings)?;
    let advice = should_recalculate_goal(&settings, &environment);

    let Some(new_goal) = advice.new_goal else {
        println!("Automatic goal calculation is not active.");
        println!("  Run `hydro setup` or `hydro goal --auto` to enable it.");
        return Ok(());
    };

    println!(
        "Recommended goal at {}°C: {} ml (current {} ml)",
        environment.temperature_celsius, new_goal, settings.daily_goal
    );

    if !advice.should_recalculate {
        println!("  Within 10% of your current goal - no change needed.");
        return Ok(());
    }

    if apply {
        UserSettings::update(&paths.settings, |s| {
            s.daily_goal = new_goal;
            Ok(())
        })?;
        println!("✓ Daily goal updated to {} ml", new_goal);
    } else {
        println!("  Run with --apply to update your goal.");
    }
    Ok(())
}

fn cmd_weather(paths: &DataPaths, observation: WeatherObservation, apply: bool) -> Result<()> {
    let settings = UserSettings::load(&paths.settings)?;

    if observation.is_hot() {
        println!(
            "It's {}°C ({}) today! Consider drinking more water.",
            observation.temperature_celsius, observation.condition
        );
    } else {
        println!(
            "The temperature is {}°C ({}) today.",
            observation.temperature_celsius, observation.condition
        );
    }

    let Some(suggested) = observation.suggested_goal(settings.daily_goal) else {
        println!("  No goal adjustment suggested.");
        return Ok(());
    };

    println!(
        "  Suggested goal: {} ml ({:+} ml)",
        suggested,
        observation.goal_adjustment()
    );
    if apply {
        UserSettings::update(&paths.settings, |s| {
            s.daily_goal = suggested;
            Ok(())
        })?;
        println!("✓ Daily goal updated to {} ml", suggested);
    }
    Ok(())
}

fn cmd_goal(paths: &DataPaths, config: &Config, set: Option<u32>, auto: bool) -> Result<()> {
    if let Some(goal) = set {
        if goal == 0 {
            return Err(Error::Validation("goal must be greater than 0 ml".into()));
        }
        UserSettings::update(&paths.settings, |s| {
            s.daily_goal = goal;
            s.calculation_mode = CalculationMode::Manual;
            Ok(())
        })?;
        println!("✓ Daily goal set to {} ml (manual)", goal);
        return Ok(());
    }

    if auto {
        let environment = config.environment(None);
        let settings = UserSettings::update(&paths.settings, |s| {
            let factors = s.profile.factors().ok_or_else(|| {
                Error::Validation("personal factors missing - run `hydro setup` first".into())
            })?;
            s.calculation_mode = CalculationMode::Automatic;
            s.daily_goal = calculate_optimal_intake(&factors, &environment);
            Ok(())
        })?;
        println!("✓ Daily goal set to {} ml (automatic)", settings.daily_goal);
        return Ok(());
    }

    let settings = UserSettings::load(&paths.settings)?;
    let mode = settings.calculation_mode;
    println!("Daily goal: {} ml ({})", settings.daily_goal, mode);
    Ok(())
}

struct SettingsChanges {
    interval: Option<u32>,
    reminders: Option<bool>,
    smart: Option<bool>,
    wake: Option<NaiveTime>,
    sleep: Option<NaiveTime>,
    cup: Option<CupSize>,
    theme: Option<Theme>,
    toggle_theme: bool,
    color_theme: Option<ColorTheme>,
}

fn cmd_settings(paths: &DataPaths, changes: SettingsChanges) -> Result<()> {
    let settings = UserSettings::update(&paths.settings, |s| {
        if let Some(interval) = changes.interval {
            if interval == 0 {
                return Err(Error::Validation(
                    "reminder interval must be at least 1 minute".into(),
                ));
            }
            s.reminder_interval = interval;
        }
        if let Some(enabled) = changes.reminders {
            s.reminder_enabled = enabled;
        }
        if let Some(smart) = changes.smart {
            s.smart_scheduling = smart;
        }
        if let Some(wake) = changes.wake {
            s.wake_time = Some(wake.format("%H:%M").to_string());
        }
        if let Some(sleep) = changes.sleep {
            s.sleep_time = Some(sleep.format("%H:%M").to_string());
        }
        if s.smart_scheduling && (s.wake_time.is_none() || s.sleep_time.is_none()) {
            s.wake_time.get_or_insert_with(|| setup::DEFAULT_WAKE_TIME.into());
            s.sleep_time.get_or_insert_with(|| setup::DEFAULT_SLEEP_TIME.into());
        }
        if let Some(cup) = changes.cup {
            s.cup_size = cup;
        }
        if let Some(theme) = changes.theme {
            s.theme = theme;
        }
        if changes.toggle_theme {
            s.theme = s.theme.toggled();
        }
        if let Some(color_theme) = changes.color_theme {
            s.color_theme = color_theme;
        }
        Ok(())
    })?;

    println!("Daily goal:      {} ml ({})", settings.daily_goal, settings.calculation_mode);
    println!(
        "Reminders:       {}",
        if settings.reminder_enabled {
            format!("every {} minutes", settings.reminder_interval)
        } else {
            "off".to_string()
        }
    );
    match (&settings.wake_time, &settings.sleep_time) {
        (Some(wake), Some(sleep)) if settings.smart_scheduling => {
            println!("Smart schedule:  {} - {}", wake, sleep)
        }
        _ => println!("Smart schedule:  off"),
    }
    println!("Cup size:        {}", settings.cup_size);
    println!("Theme:           {} / {}", settings.theme, settings.color_theme);
    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.journal.exists() {
        println!("No journal found - nothing to roll up.");
        return Ok(());
    }

    let count = hydro_core::csv_rollup::journal_to_csv_and_archive(&paths.journal, &paths.archive)?;

    println!("✓ Rolled up {} entries to CSV", count);
    println!("  CSV: {}", paths.archive.display());

    if cleanup {
        let cleaned = hydro_core::csv_rollup::cleanup_processed_journals(&paths.journal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}
