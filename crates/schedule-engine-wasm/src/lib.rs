//! WASM bindings for schedule-engine.
//!
//! Exposes timeline reconciliation, utilization statistics and working-interval
//! validation to the browser front end via `wasm-bindgen`. All complex types
//! cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p schedule-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir frontend/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/schedule_engine_wasm.wasm
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use schedule_engine::calendar;
use schedule_engine::codec;
use schedule_engine::{conflict, timeline, Stat, TimelineSegment, UtilizationReport, WorkingDay};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SegmentDto {
    #[serde(flatten)]
    segment: TimelineSegment,
    /// Height of the block as a percentage of the working day, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    share_percent: Option<f64>,
}

#[derive(Serialize)]
struct StatDto {
    #[serde(flatten)]
    stat: Stat,
    label: Option<String>,
}

impl From<Stat> for StatDto {
    fn from(stat: Stat) -> Self {
        Self {
            label: stat.label(),
            stat,
        }
    }
}

#[derive(Serialize)]
struct SpecialistStatsDto {
    total: StatDto,
    days: BTreeMap<NaiveDate, StatDto>,
}

#[derive(Serialize)]
struct ReportDto {
    pending: bool,
    specialists: BTreeMap<String, SpecialistStatsDto>,
}

#[derive(Serialize)]
struct WeeklyCopyDto {
    day: NaiveDate,
    intervals: Vec<String>,
}

/// Working-day span passed from JavaScript as `"HH:MM"` strings (`"24:00"`
/// allowed as the end).
#[derive(Deserialize)]
struct WorkingDayInput {
    start: String,
    end: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_tz(timezone: Option<String>) -> Result<Tz, JsValue> {
    codec::parse_timezone(timezone.as_deref().unwrap_or(codec::DEFAULT_TIMEZONE)).map_err(js_error)
}

fn parse_date(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", value, e)))
}

fn parse_working_day(json: &str) -> Result<WorkingDay, JsValue> {
    let input: WorkingDayInput = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid working day JSON: {}", e)))?;
    WorkingDay::parse(&input.start, &input.end).ok_or_else(|| {
        JsValue::from_str(&format!(
            "Invalid working day '{}'-'{}'",
            input.start, input.end
        ))
    })
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Reconcile one specialist's day into timeline segments.
///
/// `appointments_json` is an array of `{id, start, end, patient: {id, type},
/// status}`; `working_json` an array of packed `"startMs:endMs"` strings or
/// `{start, end}` objects. When `working_day_json` (`{"start": "09:00",
/// "end": "19:00"}`) is given, every segment carries its `share_percent`.
#[wasm_bindgen(js_name = "reconcileDay")]
pub fn reconcile_day(
    appointments_json: &str,
    working_json: &str,
    working_day_json: Option<String>,
) -> Result<String, JsValue> {
    let appointments = codec::decode_appointment_list(appointments_json).map_err(js_error)?;
    let working = codec::decode_interval_list(working_json).map_err(js_error)?;
    let working_day = working_day_json.as_deref().map(parse_working_day).transpose()?;

    let dtos: Vec<SegmentDto> = timeline::reconcile(&appointments, &working)
        .into_iter()
        .map(|segment| SegmentDto {
            share_percent: working_day.map(|day| day.share_percent(&segment)),
            segment,
        })
        .collect();

    to_json(&dtos)
}

/// Compute the working-day span from the work-schedules feed.
///
/// Returns `{"start_minute": 540, "end_minute": 1140}` (minutes since local
/// midnight, a shift ending at midnight ends at `1440`) or `null` when no
/// working hours are declared.
#[wasm_bindgen(js_name = "workingDaySpan")]
pub fn working_day_span(
    work_schedules_json: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let tz = parse_tz(timezone)?;
    let work = codec::decode_work_schedules(work_schedules_json, &tz).map_err(js_error)?;
    let all = work.values().flat_map(|days| days.values()).flatten();

    to_json(&WorkingDay::from_intervals(all, &tz))
}

/// Build utilization statistics for every specialist.
///
/// Either feed may be `undefined` while it is still loading; the report is
/// then `{"pending": true}`. Each statistic has a `state` (`pending`,
/// `no_data`, `computed`) and, when computed, a `label` such as `"85.3%"`.
/// `from`/`to` (ISO dates) list the day columns to report on; without them
/// only days present in the feeds are reported.
#[wasm_bindgen(js_name = "utilizationReport")]
pub fn utilization_report(
    schedules_json: Option<String>,
    work_schedules_json: Option<String>,
    from: Option<String>,
    to: Option<String>,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    let tz = parse_tz(timezone)?;
    let schedules = schedules_json
        .as_deref()
        .map(|json| codec::decode_schedules(json, &tz))
        .transpose()
        .map_err(js_error)?;
    let work = work_schedules_json
        .as_deref()
        .map(|json| codec::decode_work_schedules(json, &tz))
        .transpose()
        .map_err(js_error)?;
    let columns = match (from, to) {
        (Some(from), Some(to)) => Some(calendar::day_range(parse_date(&from)?, parse_date(&to)?)),
        _ => None,
    };

    let report = UtilizationReport::build(schedules.as_ref(), work.as_ref());
    let specialists = report
        .specialists()
        .map(|(id, utilization)| {
            let days = match &columns {
                Some(columns) => columns
                    .iter()
                    .map(|day| (*day, StatDto::from(utilization.day_stat(*day))))
                    .collect(),
                None => utilization
                    .per_day
                    .keys()
                    .map(|day| (*day, StatDto::from(utilization.day_stat(*day))))
                    .collect(),
            };
            let stats = SpecialistStatsDto {
                total: StatDto::from(utilization.total_stat()),
                days,
            };
            (id.to_string(), stats)
        })
        .collect();

    to_json(&ReportDto {
        pending: report.is_pending(),
        specialists,
    })
}

/// Validate the working intervals entered for one day.
///
/// Returns a JSON array of booleans, one per input entry.
#[wasm_bindgen(js_name = "validateWorkingIntervals")]
pub fn validate_working_intervals(intervals_json: &str) -> Result<String, JsValue> {
    let intervals = codec::decode_interval_list(intervals_json).map_err(js_error)?;
    to_json(&conflict::validate_working_intervals(&intervals))
}

/// Repeat a day's working intervals weekly, skipping `excluded_json` days.
///
/// Returns `[{day, intervals: ["startMs:endMs", ...]}]`.
#[wasm_bindgen(js_name = "repeatWeekly")]
pub fn repeat_weekly(
    intervals_json: &str,
    first_day: &str,
    weeks: Option<u32>,
    excluded_json: Option<String>,
) -> Result<String, JsValue> {
    let template = codec::decode_interval_list(intervals_json).map_err(js_error)?;
    let first_day = parse_date(first_day)?;
    let weeks = weeks.unwrap_or(calendar::DEFAULT_REPEAT_WEEKS);
    if weeks > calendar::MAX_REPEAT_WEEKS {
        return Err(JsValue::from_str(&format!(
            "Cannot repeat for {} weeks (at most {})",
            weeks,
            calendar::MAX_REPEAT_WEEKS
        )));
    }
    let excluded: Vec<NaiveDate> = match excluded_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("Invalid excluded days JSON: {}", e)))?,
        None => Vec::new(),
    };

    let copies: Vec<WeeklyCopyDto> =
        calendar::repeat_weekly(&template, first_day, weeks, |day| excluded.contains(&day))
            .into_iter()
            .map(|copy| WeeklyCopyDto {
                day: copy.day,
                intervals: copy.intervals.iter().map(codec::encode_packed).collect(),
            })
            .collect();

    to_json(&copies)
}

/// Decode a packed `"startMs:endMs"` interval into `{start, end}`.
#[wasm_bindgen(js_name = "decodePackedInterval")]
pub fn decode_packed_interval(raw: &str) -> Result<String, JsValue> {
    let interval = codec::decode_packed(raw).map_err(js_error)?;
    to_json(&interval)
}
