use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

/// Whole milliseconds between two instants, clamped at zero.
pub fn elapsed_ms(start: OffsetDateTime, end: OffsetDateTime) -> i64 {
    (end - start).whole_milliseconds().max(0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Month, Time};

    fn instant(hour: u8, minute: u8, second: u8) -> OffsetDateTime {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        time::PrimitiveDateTime::new(date, Time::from_hms(hour, minute, second).unwrap())
            .assume_utc()
    }

    #[test]
    fn format_timestamp_outputs_utc_z() {
        assert_eq!(format_timestamp(instant(10, 20, 30)), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn elapsed_ms_never_negative() {
        let start = instant(10, 0, 0);
        assert_eq!(elapsed_ms(start, start + Duration::seconds(90)), 90_000);
        assert_eq!(elapsed_ms(start, start - Duration::seconds(5)), 0);
    }
}
