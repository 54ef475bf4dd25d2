use chrono::{Duration, NaiveTime};
use serde::Serialize;

pub const PERIOD_MINUTES: u32 = 50;
pub const ROW_HEIGHT_PX: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: &'static str,
    pub end: &'static str,
    pub label: &'static str,
    pub is_break: bool,
}

const fn teaching(start: &'static str, end: &'static str, label: &'static str) -> Period {
    Period {
        start,
        end,
        label,
        is_break: false,
    }
}

const fn pause(start: &'static str, end: &'static str, label: &'static str) -> Period {
    Period {
        start,
        end,
        label,
        is_break: true,
    }
}

/// The school day: seven 50-minute periods and three fixed breaks.
pub const PERIODS: [Period; 10] = [
    teaching("08:00", "08:50", "Période 1"),
    teaching("08:50", "09:40", "Période 2"),
    teaching("09:40", "10:30", "Période 3"),
    pause("10:30", "11:00", "Récréation"),
    teaching("11:00", "11:50", "Période 4"),
    teaching("11:50", "12:40", "Période 5"),
    pause("12:40", "13:10", "Déjeuner"),
    teaching("13:10", "14:00", "Période 6"),
    teaching("14:00", "14:50", "Période 7"),
    pause("14:50", "15:00", "Fin"),
];

pub fn period_at(time: &str) -> Option<&'static Period> {
    PERIODS.iter().find(|p| p.start == time)
}

pub fn is_break(time: &str) -> bool {
    period_at(time).map(|p| p.is_break).unwrap_or(false)
}

/// A slot accepts clicks and drops only if it is a known, non-break row.
pub fn is_assignable(time: &str) -> bool {
    period_at(time).map(|p| !p.is_break).unwrap_or(false)
}

/// Canonical `HH:MM` form of a slot key, so `8:00` and `08:00` match.
pub fn normalize_time(raw: &str) -> Option<String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

/// Wall-clock end of a course; `None` for an unparseable start.
pub fn end_time(start: &str, duration_minutes: u32) -> Option<String> {
    let t = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
    let (end, _) = t.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
    Some(end.format("%H:%M").to_string())
}

pub fn is_valid_duration(duration_minutes: u32) -> bool {
    duration_minutes > 0 && duration_minutes % PERIOD_MINUTES == 0
}

/// End of the last row of the day.
pub fn day_end() -> &'static str {
    PERIODS[PERIODS.len() - 1].end
}

/// A course starting at `start` must be over by the end of the day.
pub fn fits_in_day(start: &str, duration_minutes: u32) -> bool {
    let (Ok(start), Ok(end)) = (
        NaiveTime::parse_from_str(start, "%H:%M"),
        NaiveTime::parse_from_str(day_end(), "%H:%M"),
    ) else {
        return false;
    };
    let available = (end - start).num_minutes();
    available >= 0 && i64::from(duration_minutes) <= available
}

/// Rendered height of a placed course. Multi-period courses grow downward
/// but the rows they cover stay independently assignable.
pub fn span_height_px(duration_minutes: u32) -> u32 {
    let px = u64::from(duration_minutes) * u64::from(ROW_HEIGHT_PX) / u64::from(PERIOD_MINUTES);
    u32::try_from(px).unwrap_or(u32::MAX)
}
