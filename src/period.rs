//! Leaderboard period computation.
//!
//! All API-facing arithmetic happens on UTC calendar days; both ends of a
//! period are inclusive. The weekly display range shown in page headers is
//! computed separately on the America/New_York calendar and is deliberately
//! NOT interchangeable with the UTC query range: unifying the two would
//! silently change displayed dates relative to the data actually queried.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::America::New_York;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodMode {
    /// Sunday through Saturday, rolling over Saturday night UTC.
    WeeklySaturdayNight,
    /// Monday through Sunday, rolling over Sunday night UTC.
    WeeklySundayNight,
    /// First through last calendar day of the current UTC month.
    Monthly,
    /// Fixed-start window of a configured day count. The window does not
    /// advance once it ends; operators move `start` explicitly.
    Custom,
}

/// Parses a mode selector. Unrecognized values fall back to the weekly
/// Saturday-night schedule rather than erroring.
pub fn parse_period_mode(raw: &str) -> PeriodMode {
    match raw.trim().to_ascii_lowercase().as_str() {
        "monthly" => PeriodMode::Monthly,
        "weeklysundaynight" => PeriodMode::WeeklySundayNight,
        "custom" => PeriodMode::Custom,
        _ => PeriodMode::WeeklySaturdayNight,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodConfig {
    pub mode: PeriodMode,
    /// Start date for [`PeriodMode::Custom`]; today when unset.
    pub custom_start: Option<NaiveDate>,
    /// Window length in days for [`PeriodMode::Custom`]; clamped to >= 1.
    pub custom_length_days: u32,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            mode: PeriodMode::Monthly,
            custom_start: None,
            custom_length_days: 7,
        }
    }
}

/// An inclusive UTC date range covering one leaderboard cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// `start_at` query value, `YYYY-MM-DD` UTC.
    pub fn start_at(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// `end_at` query value, `YYYY-MM-DD` UTC (inclusive).
    pub fn end_at(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    pub fn label(&self) -> String {
        format!("{} → {}", self.start_at(), self.end_at())
    }

    /// End-of-day instant of the last period day, 23:59:59.999 UTC. Used as
    /// the countdown target.
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end
            .and_hms_milli_opt(23, 59, 59, 999)
            .expect("valid end-of-day time expected")
            .and_utc()
    }

    /// The immediately preceding period of equal length: it ends the day
    /// before this one starts.
    pub fn previous(&self) -> Period {
        let length = self.length_days();
        let prev_end = self
            .start
            .pred_opt()
            .expect("previous date should exist");
        let prev_start = prev_end
            .checked_sub_days(Days::new(length as u64 - 1))
            .expect("previous period start should exist");
        Period {
            start: prev_start,
            end: prev_end,
        }
    }
}

/// Computes the active period for `now` under the configured mode. Never
/// fails: every instant belongs to exactly one period per mode.
pub fn compute_period(cfg: &PeriodConfig, now: DateTime<Utc>) -> Period {
    let today = now.date_naive();

    match cfg.mode {
        PeriodMode::WeeklySaturdayNight => {
            let dow = today.weekday().num_days_from_sunday();
            let sunday = today
                .checked_sub_days(Days::new(dow as u64))
                .expect("week start should exist");
            week_from(sunday)
        }
        PeriodMode::WeeklySundayNight => {
            let dow = today.weekday().num_days_from_sunday();
            // On a Sunday the week started six days ago, not today.
            let back = if dow == 0 { 6 } else { dow - 1 };
            let monday = today
                .checked_sub_days(Days::new(back as u64))
                .expect("week start should exist");
            week_from(monday)
        }
        PeriodMode::Monthly => {
            let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
                .expect("valid month start expected");
            let end = first_of_next_month(start)
                .pred_opt()
                .expect("valid month end expected");
            Period { start, end }
        }
        PeriodMode::Custom => {
            let start = cfg.custom_start.unwrap_or(today);
            let length = cfg.custom_length_days.max(1);
            let end = start
                .checked_add_days(Days::new(length as u64 - 1))
                .expect("custom period end should exist");
            Period { start, end }
        }
    }
}

/// Human wording for the configured cycle, used in header copy.
pub fn human_period_label(mode: PeriodMode) -> &'static str {
    match mode {
        PeriodMode::Monthly => "Month",
        PeriodMode::WeeklySaturdayNight | PeriodMode::WeeklySundayNight => "Week",
        PeriodMode::Custom => "Period",
    }
}

/// Sunday-through-Saturday week containing `now` on the America/New_York
/// calendar. Display only; the API range always comes from
/// [`compute_period`].
pub fn ny_display_week(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let ny_today = now.with_timezone(&New_York).date_naive();
    let dow = ny_today.weekday().num_days_from_sunday();
    let sunday = ny_today
        .checked_sub_days(Days::new(dow as u64))
        .expect("week start should exist");
    let saturday = sunday
        .checked_add_days(Days::new(6))
        .expect("week end should exist");
    (sunday, saturday)
}

/// Previous New York display week, for the last-week results header.
pub fn ny_previous_display_week(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let (sunday, _) = ny_display_week(now);
    let prev_sunday = sunday
        .checked_sub_days(Days::new(7))
        .expect("previous week start should exist");
    let prev_saturday = prev_sunday
        .checked_add_days(Days::new(6))
        .expect("previous week end should exist");
    (prev_sunday, prev_saturday)
}

fn week_from(start: NaiveDate) -> Period {
    Period {
        start,
        end: start
            .checked_add_days(Days::new(6))
            .expect("week end should exist"),
    }
}

fn first_of_next_month(month_start: NaiveDate) -> NaiveDate {
    if month_start.month() == 12 {
        NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1).expect("valid next month expected")
    } else {
        NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
            .expect("valid next month expected")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cfg(mode: PeriodMode) -> PeriodConfig {
        PeriodConfig {
            mode,
            ..PeriodConfig::default()
        }
    }

    #[test]
    fn monthly_covers_leap_february() {
        let period = compute_period(&cfg(PeriodMode::Monthly), at_utc(2024, 2, 15, 0, 0));
        assert_eq!(period.start, date(2024, 2, 1));
        assert_eq!(period.end, date(2024, 2, 29));
        assert_eq!(period.length_days(), 29);
    }

    #[test]
    fn monthly_rolls_over_december() {
        let period = compute_period(&cfg(PeriodMode::Monthly), at_utc(2024, 12, 31, 23, 59));
        assert_eq!(period.start, date(2024, 12, 1));
        assert_eq!(period.end, date(2024, 12, 31));
    }

    #[test]
    fn weekly_saturday_night_anchors_on_sunday() {
        // 2024-03-14 is a Thursday.
        let period = compute_period(
            &cfg(PeriodMode::WeeklySaturdayNight),
            at_utc(2024, 3, 14, 12, 0),
        );
        assert_eq!(period.start, date(2024, 3, 10));
        assert_eq!(period.end, date(2024, 3, 16));
        assert_eq!(period.start_at(), "2024-03-10");
        assert_eq!(period.end_at(), "2024-03-16");
    }

    #[test]
    fn weekly_saturday_night_on_a_sunday_starts_today() {
        let period = compute_period(
            &cfg(PeriodMode::WeeklySaturdayNight),
            at_utc(2024, 3, 10, 0, 0),
        );
        assert_eq!(period.start, date(2024, 3, 10));
        assert_eq!(period.end, date(2024, 3, 16));
    }

    #[test]
    fn weekly_sunday_night_on_a_sunday_goes_back_six_days() {
        // 2024-03-10 is a Sunday: the Monday-anchored week began 2024-03-04.
        let period = compute_period(
            &cfg(PeriodMode::WeeklySundayNight),
            at_utc(2024, 3, 10, 8, 0),
        );
        assert_eq!(period.start, date(2024, 3, 4));
        assert_eq!(period.end, date(2024, 3, 10));
    }

    #[test]
    fn weekly_sunday_night_midweek() {
        let period = compute_period(
            &cfg(PeriodMode::WeeklySundayNight),
            at_utc(2024, 3, 14, 12, 0),
        );
        assert_eq!(period.start, date(2024, 3, 11));
        assert_eq!(period.end, date(2024, 3, 17));
    }

    #[test]
    fn custom_window_is_static_and_defaults_to_seven_days() {
        let config = PeriodConfig {
            mode: PeriodMode::Custom,
            custom_start: Some(date(2024, 1, 1)),
            custom_length_days: 7,
        };
        // Far past the window end: the window does not advance.
        let period = compute_period(&config, at_utc(2024, 6, 1, 0, 0));
        assert_eq!(period.start, date(2024, 1, 1));
        assert_eq!(period.end, date(2024, 1, 7));
    }

    #[test]
    fn custom_window_without_start_begins_today_and_clamps_length() {
        let config = PeriodConfig {
            mode: PeriodMode::Custom,
            custom_start: None,
            custom_length_days: 0,
        };
        let period = compute_period(&config, at_utc(2024, 5, 20, 10, 0));
        assert_eq!(period.start, date(2024, 5, 20));
        assert_eq!(period.end, date(2024, 5, 20));
        assert_eq!(period.length_days(), 1);
    }

    #[test]
    fn previous_period_has_equal_length_and_ends_the_day_before() {
        let period = compute_period(&cfg(PeriodMode::Monthly), at_utc(2024, 3, 15, 0, 0));
        let previous = period.previous();
        assert_eq!(previous.end, date(2024, 2, 29));
        assert_eq!(previous.length_days(), period.length_days());
        assert_eq!(previous.start, date(2024, 1, 30));

        let week = compute_period(
            &cfg(PeriodMode::WeeklySaturdayNight),
            at_utc(2024, 3, 14, 0, 0),
        );
        let prev_week = week.previous();
        assert_eq!(prev_week.start, date(2024, 3, 3));
        assert_eq!(prev_week.end, date(2024, 3, 9));
    }

    #[test]
    fn end_utc_is_end_of_day() {
        let period = compute_period(&cfg(PeriodMode::Monthly), at_utc(2024, 2, 15, 0, 0));
        assert_eq!(
            period.end_utc().to_rfc3339(),
            "2024-02-29T23:59:59.999+00:00"
        );
    }

    #[test]
    fn recomputation_within_the_same_day_is_idempotent() {
        for mode in [
            PeriodMode::WeeklySaturdayNight,
            PeriodMode::WeeklySundayNight,
            PeriodMode::Monthly,
            PeriodMode::Custom,
        ] {
            let config = cfg(mode);
            let morning = compute_period(&config, at_utc(2024, 7, 9, 0, 1));
            let night = compute_period(&config, at_utc(2024, 7, 9, 23, 58));
            assert_eq!(morning, night, "mode {mode:?} drifted within one day");
        }
    }

    #[test]
    fn unknown_mode_falls_back_to_weekly_saturday_night() {
        assert_eq!(parse_period_mode("monthly"), PeriodMode::Monthly);
        assert_eq!(parse_period_mode("WEEKLYSUNDAYNIGHT"), PeriodMode::WeeklySundayNight);
        assert_eq!(parse_period_mode("custom"), PeriodMode::Custom);
        assert_eq!(parse_period_mode("fortnightly"), PeriodMode::WeeklySaturdayNight);
        assert_eq!(parse_period_mode(""), PeriodMode::WeeklySaturdayNight);
    }

    #[test]
    fn ny_display_week_can_differ_from_the_utc_week() {
        // 2024-03-10 01:00 UTC is still Saturday 2024-03-09 in New York, so
        // the NY display week is the one before the UTC query week.
        let now = at_utc(2024, 3, 10, 1, 0);
        let utc_week = compute_period(&cfg(PeriodMode::WeeklySaturdayNight), now);
        assert_eq!(utc_week.start, date(2024, 3, 10));

        let (ny_sunday, ny_saturday) = ny_display_week(now);
        assert_eq!(ny_sunday, date(2024, 3, 3));
        assert_eq!(ny_saturday, date(2024, 3, 9));
    }

    #[test]
    fn ny_previous_display_week_steps_back_seven_days() {
        let now = at_utc(2024, 3, 14, 12, 0);
        let (sunday, saturday) = ny_display_week(now);
        assert_eq!(sunday, date(2024, 3, 10));
        assert_eq!(saturday, date(2024, 3, 16));

        let (prev_sunday, prev_saturday) = ny_previous_display_week(now);
        assert_eq!(prev_sunday, date(2024, 3, 3));
        assert_eq!(prev_saturday, date(2024, 3, 9));
    }

    #[test]
    fn human_labels_match_modes() {
        assert_eq!(human_period_label(PeriodMode::Monthly), "Month");
        assert_eq!(human_period_label(PeriodMode::WeeklySaturdayNight), "Week");
        assert_eq!(human_period_label(PeriodMode::WeeklySundayNight), "Week");
        assert_eq!(human_period_label(PeriodMode::Custom), "Period");
    }
}
