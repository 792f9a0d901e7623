//! stronglog - StrongLifts 5x5 tracker with progression coaching

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stronglog::alerts::{analyze_all_exercises_sandbagging, analyze_all_exercises_stagnation};
use stronglog::db::{Database, Exercise};
use stronglog::exercises::RirResponse;
use stronglog::progression::{
    format_rep_prediction, generate_weekly_volume_report, get_best_prs, get_last_weight, predict_reps,
    suggest_next_weight,
};
use stronglog::session::WorkoutSession;

#[derive(Parser)]
#[command(name = "stronglog")]
#[command(author, version, about = "StrongLifts 5x5 tracker with progression coaching")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "STRONGLOG_DB", default_value = "stronglog.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exercise library
    Exercises,

    /// Suggest the working weight for the next session
    Suggest {
        /// Exercise name (e.g., "Barbell Back Squat")
        exercise: String,
    },

    /// Predict reps for a later set from Set 1
    Predict {
        /// Reps completed on Set 1
        #[arg(short, long)]
        reps: i32,

        /// Set 1 RIR answer: yes_maybe, yes_easily or no_way
        #[arg(long)]
        rir: RirResponse,

        /// Set number to predict
        #[arg(short, long, default_value = "2")]
        set: u32,
    },

    /// Run a workout session, reading sets from stdin
    Train {
        /// Exercises in order; defaults to the main lifts
        exercises: Vec<String>,

        /// Workout label (e.g., "A" or "B")
        #[arg(short = 't', long)]
        workout_type: Option<String>,

        /// Target reps per set
        #[arg(long, default_value = "5")]
        target: i32,
    },

    /// Show personal records for an exercise, or the latest across all lifts
    Prs {
        exercise: Option<String>,

        /// Rows to show when no exercise is given
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show active alerts
    Alerts {
        /// Also run the detectors without saving anything
        #[arg(long)]
        scan: bool,

        /// Delete dismissed alerts older than this many days
        #[arg(long, value_name = "DAYS")]
        purge: Option<i64>,
    },

    /// Dismiss an alert
    Dismiss {
        id: i64,
    },

    /// Weekly volume per muscle group
    Volume {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn resolve_exercise(db: &Database, name: &str) -> Result<Exercise> {
    db.find_exercise_by_name(name)?
        .ok_or_else(|| anyhow!("unknown exercise '{}' (see `stronglog exercises`)", name))
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db).with_context(|| format!("opening database {}", cli.db))?;

    match cli.command {
        Commands::Exercises => {
            println!("{:<4} {:<28} {:<10} {:<10}", "ID", "Name", "Category", "Muscles");
            println!("{:-<56}", "");
            for e in db.get_exercises()? {
                let category = e.category.map_or("?", |c| c.as_str());
                let marker = if e.is_default { "*" } else { "" };
                println!("{:<4} {:<28} {:<10} {:<10}{}", e.id, e.name, category, e.muscle_group.as_str(), marker);
            }
        }

        Commands::Suggest { exercise } => {
            let exercise = resolve_exercise(&db, &exercise)?;
            let suggested = suggest_next_weight(&db, exercise.id);
            match get_last_weight(&db, exercise.id)? {
                Some(last) => println!("{}: last {} lbs -> next {} lbs", exercise.name, last, suggested),
                None => println!("{}: first session, start at {} lbs", exercise.name, suggested),
            }
        }

        Commands::Predict { reps, rir, set } => {
            let prediction = predict_reps(reps, rir, set);
            println!("Set {}: {}", set, format_rep_prediction(&prediction));
        }

        Commands::Train { exercises, workout_type, target } => {
            let exercises = if exercises.is_empty() {
                db.get_default_exercises()?
            } else {
                exercises
                    .iter()
                    .map(|name| resolve_exercise(&db, name))
                    .collect::<Result<Vec<_>>>()?
            };
            run_session(&db, exercises, workout_type.as_deref(), target, io::stdin().lock())?;
        }

        Commands::Prs { exercise: None, limit } => {
            println!("{:<20} {:<28} {:<10} {:>8} {:>5}", "Date", "Exercise", "Type", "Weight", "Reps");
            println!("{:-<75}", "");
            for pr in db.get_all_personal_records(limit)? {
                let name = db.get_exercise(pr.exercise_id)?.map_or_else(|| "?".to_string(), |e| e.name);
                println!(
                    "{:<20} {:<28} {:<10} {:>8} {:>5}",
                    pr.date.format("%Y-%m-%d %H:%M").to_string(),
                    name,
                    pr.pr_type.as_str(),
                    pr.weight,
                    pr.reps
                );
            }
        }

        Commands::Prs { exercise: Some(exercise), .. } => {
            let exercise = resolve_exercise(&db, &exercise)?;
            let best = get_best_prs(&db, exercise.id)?;
            println!("Personal records: {}", exercise.name);
            println!("{:-<40}", "");
            match best.weight {
                Some(pr) => println!("Heaviest: {} lbs x {}", pr.weight, pr.reps),
                None => println!("Heaviest: -"),
            }
            match best.volume {
                Some(pr) => println!("Volume:   {} ({} x {})", pr.volume.unwrap_or(0.0), pr.weight, pr.reps),
                None => println!("Volume:   -"),
            }
            match best.reps {
                Some(pr) => println!("Reps:     {} @ {} lbs", pr.reps, pr.weight),
                None => println!("Reps:     -"),
            }
        }

        Commands::Alerts { scan, purge } => {
            if let Some(days) = purge {
                let removed = db.cleanup_dismissed_alerts(days)?;
                println!("Removed {} dismissed alert(s)", removed);
            }

            let alerts = db.get_active_alerts()?;
            if alerts.is_empty() {
                println!("No active alerts");
            }
            for a in &alerts {
                println!(
                    "#{} [{}] {} {}: {}",
                    a.id,
                    a.severity.as_str(),
                    a.alert_type.as_str(),
                    a.exercise_name.as_deref().unwrap_or("?"),
                    a.message
                );
            }

            if scan {
                println!("\nScan:");
                for alert in analyze_all_exercises_stagnation(&db)? {
                    println!("  {}", alert.message);
                    for step in &alert.interventions {
                        println!("    - {}", step);
                    }
                    if let Some(date) = alert.last_weight_increase {
                        println!("    last lighter session: {}", date);
                    }
                }
                for alert in analyze_all_exercises_sandbagging(&db)? {
                    println!("  {}", alert.message);
                    println!("    - {}", alert.suggestion);
                }
            }
        }

        Commands::Dismiss { id } => {
            if db.dismiss_alert(id)? {
                println!("Dismissed alert #{}", id);
            } else {
                println!("No active alert #{}", id);
            }
        }

        Commands::Volume { json } => {
            let report = generate_weekly_volume_report(&db, Local::now().date_naive())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Weekly volume {} .. {}", report.week_start, report.week_end);
                println!("{:-<40}", "");
                for g in &report.muscle_groups {
                    println!(
                        "{:<10} {:>3} sets {:>5.0}%  {}",
                        g.muscle_group.as_str(),
                        g.total_sets,
                        g.percentage,
                        g.status.label()
                    );
                }
                println!();
                for r in &report.recommendations {
                    println!("- {}", r);
                }
            }
        }
    }

    Ok(())
}

/// Parse "<weight> <reps> <rir>"
fn parse_set_line(line: &str) -> Result<(f64, i32, RirResponse)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [weight, reps, rir] = parts.as_slice() else {
        return Err(anyhow!("expected: <weight> <reps> <yes_maybe|yes_easily|no_way>"));
    };
    let weight = weight.parse::<f64>().with_context(|| format!("weight '{}'", weight))?;
    let reps = reps.parse::<i32>().with_context(|| format!("reps '{}'", reps))?;
    let rir = rir.parse::<RirResponse>().context("rir")?;
    Ok((weight, reps, rir))
}

/// Interactive session over `input`, one set per line. Returns the workout id.
fn run_session<R: BufRead>(
    db: &Database,
    exercises: Vec<Exercise>,
    workout_type: Option<&str>,
    target: i32,
    input: R,
) -> Result<i64> {
    let mut session = WorkoutSession::start(db, exercises, Local::now().date_naive(), workout_type)?;
    let mut lines = input.lines();

    loop {
        let exercise = session.current_exercise().clone();
        println!(
            "\n== {} == suggested {} lbs, {} reps",
            exercise.name,
            session.suggested_weight(db),
            target
        );

        loop {
            print!("Set {} (weight reps rir, blank = next exercise, q = quit): ", session.current_set_number());
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                // stdin closed, keep what was logged
                let summary = session.finish(db)?;
                println!("Workout {} saved ({} sets)", summary.workout_id, summary.sets_logged);
                return Ok(summary.workout_id);
            };
            let line = line.trim();

            if line == "q" {
                let id = session.discard();
                println!("Workout {} discarded", id);
                return Ok(id);
            }
            if line.is_empty() {
                break;
            }

            let (weight, reps, rir) = match parse_set_line(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    println!("  {:#}", e);
                    continue;
                }
            };

            let outcome = match session.complete_set(db, weight, reps, rir, target) {
                Ok(outcome) => outcome,
                Err(e) => {
                    println!("  Set not saved: {:#}", e);
                    continue;
                }
            };
            println!("  {}", outcome.feedback.message);
            for pr in &outcome.prs {
                println!("  New {} PR!", pr.as_str());
            }
            println!("  Next set: {}", format_rep_prediction(&outcome.next_set));
            session.end_rest();
        }

        if !session.next_exercise() {
            break;
        }
    }

    let summary = session.finish(db)?;
    println!(
        "\nWorkout {} complete: {} sets in {} min",
        summary.workout_id, summary.sets_logged, summary.duration_minutes
    );
    let new_alerts = summary.stagnation_alerts.len() + summary.sandbagging_alerts.len();
    if new_alerts > 0 {
        println!("{} new alert(s), see `stronglog alerts`", new_alerts);
    }
    Ok(summary.workout_id)
}
