use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use circa_core::{Macros, MealDetails, MealLogId, UserProfile};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use circa_cli::commands::util::{Now, effective_preferences, parse_date, resolve_date};
use circa_cli::commands::{curve, eat, export, import, prefs, profile, sleep, status};
use circa_cli::{Cli, Commands, Config, EatAction, PrefsAction, ProfileAction, SleepAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(circa_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = circa_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let now = Now::system();
    let mut out = io::stdout().lock();

    match command {
        Commands::Profile(ProfileAction::Set {
            wake,
            sleep,
            chronotype,
            goal,
            work_schedule,
            window_hours,
        }) => {
            let user_profile = UserProfile {
                wake_time: wake,
                sleep_time: sleep,
                chronotype,
                goal,
                work_schedule,
                target_window_hours: window_hours,
            };
            profile::set(&mut out, &mut db, &user_profile)?;
        }
        Commands::Profile(ProfileAction::Show { json }) => profile::show(&mut out, &db, json)?,
        Commands::Prefs(PrefsAction::Set { ideal_sleep }) => prefs::set(&mut out, &mut db, ideal_sleep)?,
        Commands::Prefs(PrefsAction::Show) => prefs::show(&mut out, &db, &config)?,
        Commands::Sleep(SleepAction::Log {
            bedtime,
            wake,
            date,
        }) => {
            let date = resolve_date(date.as_deref(), now.today())?;
            sleep::log(&mut out, &mut db, bedtime, wake, date, &now)?;
        }
        Commands::Sleep(SleepAction::Debt { days }) => {
            let prefs = effective_preferences(&db, &config)?;
            sleep::debt(&mut out, &db, &prefs, days.unwrap_or(config.debt_window_days))?;
        }
        Commands::Sleep(SleepAction::History { json }) => {
            let prefs = effective_preferences(&db, &config)?;
            sleep::history(&mut out, &db, &prefs, json)?;
        }
        Commands::Curve {
            date,
            now: at,
            json,
        } => {
            let prefs = effective_preferences(&db, &config)?;
            let date = date.as_deref().map(|d| parse_date(d, now.today())).transpose()?;
            curve::run(
                &mut out,
                &db,
                &prefs,
                config.debt_window_days,
                date,
                at.unwrap_or_else(|| now.time_of_day()),
                json,
            )?;
        }
        Commands::Eat(EatAction::Plan { json }) => eat::plan(&mut out, &db, json)?,
        Commands::Eat(EatAction::Status { now: at }) => {
            eat::status(&mut out, &db, at.unwrap_or_else(|| now.time_of_day()))?;
        }
        Commands::Eat(EatAction::Log {
            meal,
            at,
            date,
            size,
            protein,
            carbs,
            fat,
            energy_before,
            energy_after,
            notes,
        }) => {
            let macros = if protein.is_some() || carbs.is_some() || fat.is_some() {
                Some(Macros {
                    protein_g: protein.unwrap_or(0),
                    carbs_g: carbs.unwrap_or(0),
                    fat_g: fat.unwrap_or(0),
                })
            } else {
                None
            };
            let entry = eat::MealEntry {
                id: MealLogId::new(uuid::Uuid::new_v4().to_string())?,
                meal,
                at,
                date: resolve_date(date.as_deref(), now.today())?,
                details: MealDetails {
                    size,
                    macros,
                    energy_before,
                    energy_after,
                    notes: notes.filter(|n| !n.trim().is_empty()),
                },
            };
            eat::log(&mut out, &mut db, entry, &now)?;
        }
        Commands::Eat(EatAction::Note { id, notes }) => eat::note(&mut out, &mut db, &id, notes, &now)?,
        Commands::Eat(EatAction::Adherence { json }) => eat::adherence(&mut out, &db, json)?,
        Commands::Export => export::run(&mut out, &db, now.utc)?,
        Commands::Import => {
            let stats = import::run(io::stdin().lock(), &mut out, &mut db)?;
            tracing::debug!(?stats, "import finished");
        }
        Commands::Status => status::run(&mut out, &db, &config)?,
    }

    Ok(())
}
