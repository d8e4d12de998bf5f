use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DELIVERY_HORIZON_DAYS: u32 = 30;

/// A weekday on which the dispensary delivers, and the hours it does so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    pub day: Weekday,
    #[serde(with = "hh_mm")]
    pub start: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end: NaiveTime,
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A selectable half-hour delivery slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    /// 24-hour `HH:MM`.
    pub value: String,
    /// 12-hour `h:MM AM`.
    pub display: String,
}

/// Dates within `horizon_days` of `today` (today included) that fall on a
/// scheduled delivery day.
pub fn available_delivery_dates(
    today: NaiveDate,
    schedule: &[DeliveryWindow],
    horizon_days: u32,
) -> Vec<NaiveDate> {
    (0..u64::from(horizon_days))
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter(|date| schedule.iter().any(|w| w.day == date.weekday()))
        .collect()
}

/// Half-hour slots starting inside the window; the end time is exclusive.
pub fn time_slots(window: &DeliveryWindow) -> Vec<TimeSlot> {
    let start = window.start.hour() * 60 + window.start.minute();
    let end = window.end.hour() * 60 + window.end.minute();

    let mut slots = Vec::new();
    for hour in window.start.hour()..=window.end.hour() {
        for minute in [0, 30] {
            let at = hour * 60 + minute;
            if at < start || at >= end {
                continue;
            }
            let display_hour = if hour % 12 == 0 { 12 } else { hour % 12 };
            let meridiem = if hour < 12 { "AM" } else { "PM" };
            slots.push(TimeSlot {
                value: format!("{hour:02}:{minute:02}"),
                display: format!("{display_hour}:{minute:02} {meridiem}"),
            });
        }
    }
    slots
}

/// Slots for the scheduled window covering `date`, if any.
pub fn slots_for_date(date: NaiveDate, schedule: &[DeliveryWindow]) -> Vec<TimeSlot> {
    schedule
        .iter()
        .find(|w| w.day == date.weekday())
        .map(time_slots)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    #[serde(default)]
    pub apt: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl DeliveryAddress {
    /// Enough of an address to ask the delivery-zone service about.
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
            && self.zip.trim().len() >= 5
    }

    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street.trim(),
            self.city.trim(),
            self.state.trim(),
            self.zip.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(day: Weekday, start: &str, end: &str) -> DeliveryWindow {
        DeliveryWindow {
            day,
            start: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        }
    }

    #[test]
    fn test_available_dates_follow_schedule() {
        // 2026-10-17 is a Saturday
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let schedule = [window(Weekday::Sat, "10:00", "18:00"), window(Weekday::Mon, "12:00", "16:00")];

        let dates = available_delivery_dates(today, &schedule, 10);
        let expected: Vec<NaiveDate> = [17, 19, 24, 26]
            .iter()
            .map(|d| NaiveDate::from_ymd_opt(2026, 10, *d).unwrap())
            .collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_available_dates_empty_schedule() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(available_delivery_dates(today, &[], DEFAULT_DELIVERY_HORIZON_DAYS).is_empty());
    }

    #[test]
    fn test_time_slots_half_hours_end_exclusive() {
        let slots = time_slots(&window(Weekday::Fri, "11:00", "13:00"));
        let values: Vec<&str> = slots.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["11:00", "11:30", "12:00", "12:30"]);
        assert_eq!(slots[0].display, "11:00 AM");
        assert_eq!(slots[2].display, "12:00 PM");
    }

    #[test]
    fn test_time_slots_partial_hours() {
        let slots = time_slots(&window(Weekday::Fri, "09:30", "10:45"));
        let values: Vec<&str> = slots.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["09:30", "10:00", "10:30"]);
        assert_eq!(slots[0].display, "9:30 AM");
    }

    #[test]
    fn test_slots_for_unscheduled_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(slots_for_date(date, &[window(Weekday::Sat, "10:00", "12:00")]).is_empty());
    }

    #[test]
    fn test_window_deserializes_from_hh_mm() {
        let json = r#"{"day":"Tuesday","start":"08:00","end":"20:30"}"#;
        let parsed: DeliveryWindow = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, window(Weekday::Tue, "08:00", "20:30"));
    }

    #[test]
    fn test_address_completeness() {
        let mut address = DeliveryAddress {
            street: "12 Main St".to_string(),
            apt: None,
            city: "Albany".to_string(),
            state: "NY".to_string(),
            zip: "12207".to_string(),
        };
        assert!(address.is_complete());
        assert_eq!(address.one_line(), "12 Main St, Albany, NY 12207");

        address.zip = "122".to_string();
        assert!(!address.is_complete());
        address.zip = "12207".to_string();
        address.city = "  ".to_string();
        assert!(!address.is_complete());
    }
}
