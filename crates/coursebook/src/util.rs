use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Asia::Taipei;

/// Current time in Taipei, formatted the way the spreadsheet has always stored it.
pub fn now_string() -> String {
    taipei_timestamp(Utc::now())
}

/// Formats `at` as a zh-TW locale string, e.g. `2024/1/5 下午3:04:05`.
pub fn taipei_timestamp(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Taipei);
    let (is_pm, hour) = local.hour12();

    format!(
        "{}/{}/{} {}{}:{:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        if is_pm { "下午" } else { "上午" },
        hour,
        local.minute(),
        local.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_afternoon() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 7, 4, 5).unwrap();
        assert_eq!(taipei_timestamp(at), "2024/1/5 下午3:04:05");
    }

    #[test]
    fn test_just_after_midnight_rolls_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 16, 30, 0).unwrap();
        assert_eq!(taipei_timestamp(at), "2024/3/2 上午12:30:00");
    }
}
