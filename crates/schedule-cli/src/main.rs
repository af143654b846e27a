//! `schedule` CLI — inspect specialist timelines and utilization from the
//! schedule feeds on the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Timeline of one specialist on one day (feed file → stdout)
//! schedule timeline -i feeds.json --specialist 12 --date 2025-04-28
//!
//! # Same, as JSON
//! schedule timeline -i feeds.json --specialist 12 --date 2025-04-28 --json
//!
//! # Utilization per specialist and day over a range
//! cat feeds.json | schedule stats --from 2025-04-28 --to 2025-05-04
//!
//! # Check a day's working intervals for overlaps
//! echo '["1745820000000:1745829000000"]' | schedule validate
//!
//! # Repeat a day's working intervals weekly, skipping holidays
//! schedule repeat -i day.json --date 2025-04-28 --weeks 4 --exclude 2025-05-12
//! ```
//!
//! A feeds file holds the two bodies returned by the data-access layer:
//! `{"schedules": [...], "work_schedules": [...]}`. A missing feed counts as
//! not loaded yet.

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use log::{debug, info};
use schedule_engine::calendar;
use schedule_engine::codec::{self, ScheduleRow, WorkScheduleRow};
use schedule_engine::conflict;
use schedule_engine::day::{DaySchedule, SpecialistDays};
use schedule_engine::{
    Appointment, Interval, SegmentStatus, SpecialistId, TimelineSegment, UtilizationReport,
};
use serde::Deserialize;

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Specialist timeline and utilization tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// IANA timezone the clinic's calendar days are bucketed in
    #[arg(long, global = true, env = "SCHEDULE_TZ", default_value = codec::DEFAULT_TIMEZONE)]
    timezone: String,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reconciled timeline of one specialist on one day
    Timeline {
        /// Feeds file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Specialist id
        #[arg(long)]
        specialist: String,
        /// Day as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Emit JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Print utilization per specialist and per day
    Stats {
        /// Feeds file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// First day column (defaults to the earliest day in the feeds)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day column, inclusive
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Validate one day's working intervals (JSON array, packed or objects)
    Validate {
        /// Intervals file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Repeat one day's working intervals on the same weekday
    Repeat {
        /// Intervals file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Day the intervals were entered for
        #[arg(long)]
        date: NaiveDate,
        /// Number of weeks to generate, including the first
        #[arg(
            long,
            default_value_t = calendar::DEFAULT_REPEAT_WEEKS,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(calendar::MAX_REPEAT_WEEKS))
        )]
        weeks: u32,
        /// Days to skip (e.g. public holidays)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<NaiveDate>,
    },
}

/// Both feed bodies as returned by the data-access layer.
#[derive(Deserialize)]
struct Feeds {
    #[serde(default)]
    schedules: Option<Vec<ScheduleRow>>,
    #[serde(default)]
    work_schedules: Option<Vec<WorkScheduleRow>>,
}

struct DecodedFeeds {
    schedules: Option<SpecialistDays<Appointment>>,
    work_schedules: Option<SpecialistDays<Interval>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let tz = codec::parse_timezone(&cli.timezone)
        .with_context(|| format!("Invalid --timezone '{}'", cli.timezone))?;
    debug!("bucketing days in {}", tz);

    match cli.command {
        Commands::Timeline {
            input,
            specialist,
            date,
            json,
        } => {
            let feeds = read_feeds(input.as_deref(), &tz)?;
            let (Some(schedules), Some(work)) = (&feeds.schedules, &feeds.work_schedules) else {
                anyhow::bail!("Both 'schedules' and 'work_schedules' are required for a timeline");
            };
            let specialist = SpecialistId::from(specialist);
            let day = DaySchedule::from_feeds(work, schedules, &specialist, date);
            let segments = day.timeline();
            info!(
                "{} segments for specialist {} on {}",
                segments.len(),
                specialist,
                date
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&segments)?);
            } else if day.has_no_working_hours() {
                println!("No working hours on {}", date);
            } else {
                for segment in &segments {
                    println!("{}", format_segment(segment, &tz));
                }
            }
        }
        Commands::Stats { input, from, to } => {
            let feeds = read_feeds(input.as_deref(), &tz)?;
            let report =
                UtilizationReport::build(feeds.schedules.as_ref(), feeds.work_schedules.as_ref());
            if report.is_pending() {
                println!("Statistics pending: both feeds must be loaded");
                return Ok(());
            }

            let days = match (from, to) {
                (Some(from), Some(to)) => calendar::day_range(from, to),
                _ => feed_days(&feeds),
            };
            for (id, utilization) in report.specialists() {
                let total = utilization
                    .total_stat()
                    .label()
                    .unwrap_or_else(|| "no data".to_string());
                println!("{}\ttotal\t{}", id, total);
                for day in &days {
                    let label = utilization
                        .day_stat(*day)
                        .label()
                        .unwrap_or_else(|| "no data".to_string());
                    println!("{}\t{}\t{}", id, day, label);
                }
            }
        }
        Commands::Validate { input } => {
            let raw = read_input(input.as_deref())?;
            let intervals =
                codec::decode_interval_list(&raw).context("Failed to decode intervals")?;
            let verdicts = conflict::validate_working_intervals(&intervals);
            for (interval, ok) in intervals.iter().zip(&verdicts) {
                println!(
                    "{}\t{}",
                    format_range(interval.start, interval.end, &tz),
                    if *ok { "ok" } else { "invalid" }
                );
            }
            let rejected = verdicts.iter().filter(|ok| !**ok).count();
            if rejected > 0 {
                anyhow::bail!("{} of {} working intervals are invalid", rejected, verdicts.len());
            }
        }
        Commands::Repeat {
            input,
            date,
            weeks,
            exclude,
        } => {
            let raw = read_input(input.as_deref())?;
            let template = codec::decode_interval_list(&raw).context("Failed to decode intervals")?;
            let copies =
                calendar::repeat_weekly(&template, date, weeks, |day| exclude.contains(&day));
            let rows: Vec<serde_json::Value> = copies
                .iter()
                .map(|copy| {
                    serde_json::json!({
                        "date": copy.day,
                        "intervals": copy
                            .intervals
                            .iter()
                            .map(codec::encode_packed)
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn read_feeds(path: Option<&str>, tz: &Tz) -> Result<DecodedFeeds> {
    let raw = read_input(path)?;
    let feeds: Feeds = serde_json::from_str(&raw).context("Failed to parse feeds JSON")?;

    let schedules = feeds
        .schedules
        .map(|rows| codec::group_schedules(&rows, tz))
        .transpose()
        .context("Failed to decode schedules feed")?;
    let work_schedules = feeds
        .work_schedules
        .map(|rows| codec::group_work_schedules(&rows, tz))
        .transpose()
        .context("Failed to decode work schedules feed")?;

    Ok(DecodedFeeds {
        schedules,
        work_schedules,
    })
}

/// Every day present in either feed, ascending.
fn feed_days(feeds: &DecodedFeeds) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = feeds
        .schedules
        .iter()
        .flat_map(|all| all.values().flat_map(|days| days.keys().copied()))
        .chain(
            feeds
                .work_schedules
                .iter()
                .flat_map(|all| all.values().flat_map(|days| days.keys().copied())),
        )
        .collect();
    days.sort();
    days.dedup();
    days
}

fn format_range(start: chrono::DateTime<Utc>, end: chrono::DateTime<Utc>, tz: &Tz) -> String {
    format!(
        "{}-{}",
        start.with_timezone(tz).format("%H:%M"),
        end.with_timezone(tz).format("%H:%M")
    )
}

fn format_segment(segment: &TimelineSegment, tz: &Tz) -> String {
    let status = match segment.status {
        SegmentStatus::Booked => "booked",
        SegmentStatus::Confirmed => "confirmed",
        SegmentStatus::Free => "free",
        SegmentStatus::NotAvailable => "na",
    };
    let range = format_range(segment.start, segment.end, tz);
    match &segment.patient {
        Some(patient) => format!(
            "{}\t{}\tpatient {} ({})",
            range, status, patient.id, patient.kind
        ),
        None => format!("{}\t{}", range, status),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
