//! Weekly time model.
//!
//! A [`TimeSlot`] is a half-open interval `[start, end)` on one weekday.
//! Slots are parsed from the textual form used by timetable exports:
//!
//! ```text
//! SEG - 08:00 às 10:00, QUA - 08:00 às 10:00
//! ```
//!
//! Day codes are accepted in Portuguese (`SEG`..`DOM`) or English
//! (`MON`..`SUN`); `as` is accepted in place of `às`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Looks up a three-letter day code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Weekday> {
        match code.trim().to_uppercase().as_str() {
            "SEG" | "MON" => Some(Weekday::Monday),
            "TER" | "TUE" => Some(Weekday::Tuesday),
            "QUA" | "WED" => Some(Weekday::Wednesday),
            "QUI" | "THU" => Some(Weekday::Thursday),
            "SEX" | "FRI" => Some(Weekday::Friday),
            "SAB" | "SÁB" | "SAT" => Some(Weekday::Saturday),
            "DOM" | "SUN" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Part of the day a class starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
    Undefined,
}

impl Shift {
    /// Classifies a start time. Bounds are inclusive:
    /// morning 07:00-12:00, afternoon 12:01-18:00, evening 18:01-23:00.
    pub fn of(start: NaiveTime) -> Shift {
        let minutes = start.hour() * 60 + start.minute();
        match minutes {
            420..=720 => Shift::Morning,
            721..=1080 => Shift::Afternoon,
            1081..=1380 => Shift::Evening,
            _ => Shift::Undefined,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Evening => "evening",
            Shift::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSlot")]
pub struct TimeSlot {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Deserialize)]
struct RawSlot {
    day: Weekday,
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<RawSlot> for TimeSlot {
    type Error = ParseError;

    fn try_from(raw: RawSlot) -> Result<Self, Self::Error> {
        TimeSlot::new(raw.day, raw.start, raw.end)
    }
}

impl TimeSlot {
    /// Builds a slot, rejecting empty or inverted intervals.
    pub fn new(day: Weekday, start: NaiveTime, end: NaiveTime) -> Result<Self, ParseError> {
        if end <= start {
            return Err(ParseError::EmptyInterval {
                fragment: format!("{day} {}-{}", start.format("%H:%M"), end.format("%H:%M")),
            });
        }
        Ok(TimeSlot { day, start, end })
    }

    pub fn shift(&self) -> Shift {
        Shift::of(self.start)
    }

    /// Same-day half-open overlap. Back-to-back slots do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.day,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for TimeSlot {
    type Err = ParseError;

    fn from_str(fragment: &str) -> Result<Self, Self::Err> {
        parse_fragment(fragment)
    }
}

pub fn overlaps(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.overlaps(b)
}

/// Parses a comma-separated slot specification.
///
/// A blank specification yields an empty list, which is not an error.
pub fn parse_slots(raw: &str) -> Result<Vec<TimeSlot>, ParseError> {
    raw.split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(parse_fragment)
        .collect()
}

fn parse_fragment(fragment: &str) -> Result<TimeSlot, ParseError> {
    let fragment = fragment.trim();
    let malformed = || ParseError::Malformed {
        fragment: fragment.to_string(),
    };

    let (day_code, range) = fragment.split_once('-').ok_or_else(malformed)?;
    let day = Weekday::from_code(day_code).ok_or_else(|| ParseError::UnknownDay {
        code: day_code.trim().to_string(),
        fragment: fragment.to_string(),
    })?;

    let range = range.replace(" as ", " às ");
    let (start, end) = range.split_once("às").ok_or_else(malformed)?;
    let start = parse_time(start, fragment)?;
    let end = parse_time(end, fragment)?;

    TimeSlot::new(day, start, end).map_err(|_| ParseError::EmptyInterval {
        fragment: fragment.to_string(),
    })
}

fn parse_time(value: &str, fragment: &str) -> Result<NaiveTime, ParseError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ParseError::InvalidTime {
        value: value.to_string(),
        fragment: fragment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(day: Weekday, start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot::new(day, t(start.0, start.1), t(end.0, end.1)).unwrap()
    }

    #[test]
    fn test_parse_two_fragments() {
        let slots = parse_slots("SEG - 08:00 às 10:00, QUA - 14:00 às 15:40").unwrap();
        assert_eq!(
            slots,
            vec![
                slot(Weekday::Monday, (8, 0), (10, 0)),
                slot(Weekday::Wednesday, (14, 0), (15, 40)),
            ]
        );
    }

    #[test]
    fn test_parse_ascii_separator_and_lowercase_day() {
        let slots = parse_slots("qui - 19:00 as 22:30").unwrap();
        assert_eq!(slots, vec![slot(Weekday::Thursday, (19, 0), (22, 30))]);
    }

    #[test]
    fn test_parse_english_day_codes() {
        let slots = parse_slots("FRI - 07:30 às 09:10").unwrap();
        assert_eq!(slots[0].day, Weekday::Friday);
    }

    #[test]
    fn test_blank_spec_is_empty_not_error() {
        assert_eq!(parse_slots("").unwrap(), vec![]);
        assert_eq!(parse_slots(" , ").unwrap(), vec![]);
    }

    #[test]
    fn test_unknown_day_rejected() {
        let err = parse_slots("XYZ - 08:00 às 10:00").unwrap_err();
        assert!(matches!(err, ParseError::UnknownDay { ref code, .. } if code == "XYZ"));
    }

    #[test]
    fn test_missing_range_separator_rejected() {
        let err = parse_slots("SEG - 08:00 10:00").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn test_bad_time_rejected() {
        let err = parse_slots("SEG - 8h às 10:00").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTime { ref value, .. } if value == "8h"));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err = parse_slots("TER - 10:00 às 10:00").unwrap_err();
        assert!(matches!(err, ParseError::EmptyInterval { .. }));
        assert!(parse_slots("TER - 11:00 às 10:00").is_err());
    }

    #[test]
    fn test_one_bad_fragment_fails_whole_spec() {
        assert!(parse_slots("SEG - 08:00 às 10:00, QQ - 08:00 às 10:00").is_err());
    }

    #[test]
    fn test_shift_boundaries() {
        assert_eq!(Shift::of(t(7, 0)), Shift::Morning);
        assert_eq!(Shift::of(t(12, 0)), Shift::Morning);
        assert_eq!(Shift::of(t(12, 1)), Shift::Afternoon);
        assert_eq!(Shift::of(t(18, 0)), Shift::Afternoon);
        assert_eq!(Shift::of(t(18, 1)), Shift::Evening);
        assert_eq!(Shift::of(t(23, 0)), Shift::Evening);
        assert_eq!(Shift::of(t(6, 59)), Shift::Undefined);
        assert_eq!(Shift::of(t(23, 1)), Shift::Undefined);
    }

    #[test]
    fn test_overlap_cases() {
        let a = slot(Weekday::Monday, (8, 0), (10, 0));
        let b = slot(Weekday::Monday, (9, 0), (11, 0));
        let c = slot(Weekday::Monday, (10, 0), (12, 0));
        let d = slot(Weekday::Tuesday, (8, 0), (10, 0));
        assert!(overlaps(&a, &b));
        assert!(!overlaps(&a, &c), "back-to-back slots must not conflict");
        assert!(!overlaps(&a, &d), "different days never conflict");
        assert!(overlaps(&a, &a));
    }

    #[test]
    fn test_deserialize_rejects_inverted_slot() {
        let json = r#"{"day":"monday","start":"10:00:00","end":"08:00:00"}"#;
        assert!(serde_json::from_str::<TimeSlot>(json).is_err());
        let json = r#"{"day":"monday","start":"08:00:00","end":"10:00:00"}"#;
        let parsed: TimeSlot = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, slot(Weekday::Monday, (8, 0), (10, 0)));
    }

    #[test]
    fn test_display() {
        let s = slot(Weekday::Saturday, (8, 5), (9, 45));
        assert_eq!(s.to_string(), "Saturday 08:05-09:45");
    }

    fn arb_slot() -> impl Strategy<Value = TimeSlot> {
        (0usize..7, 0u32..1439, 1u32..240).prop_map(|(d, start, len)| {
            let end = (start + len).min(1439);
            TimeSlot::new(
                Weekday::ALL[d],
                NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap(),
                NaiveTime::from_hms_opt(end / 60, end % 60, 0).unwrap(),
            )
            .unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in arb_slot(), b in arb_slot()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_back_to_back_never_overlaps(a in arb_slot(), len in 1u32..120) {
            let start = a.end.hour() * 60 + a.end.minute();
            prop_assume!(start + len < 1440);
            let end = start + len;
            let next = TimeSlot::new(
                a.day,
                a.end,
                NaiveTime::from_hms_opt(end / 60, end % 60, 0).unwrap(),
            ).unwrap();
            prop_assert!(!a.overlaps(&next));
            prop_assert!(!next.overlaps(&a));
        }
    }
}
