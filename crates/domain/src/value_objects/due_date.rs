use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 期限日
///
/// 時刻は持たず、ローカルタイムゾーンの暦日単位で比較する。
/// デシリアライズ時は過去日付チェックを行わない（保存済みデータの復元用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DueDate(NaiveDate);

/// ローカルタイムゾーンでの今日
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl DueDate {
    /// 暦日から期限日を作成
    ///
    /// `allow_past` が false の場合、昨日より前の日付は拒否する。
    pub fn new(date: NaiveDate, allow_past: bool) -> DomainResult<Self> {
        Self::new_with_today(date, allow_past, local_today())
    }

    /// 基準日を明示して期限日を作成
    pub fn new_with_today(date: NaiveDate, allow_past: bool, today: NaiveDate) -> DomainResult<Self> {
        if !allow_past && date < today - Duration::days(1) {
            return Err(DomainError::InvalidDueDate(format!(
                "Due date cannot be in the past: {date}"
            )));
        }
        Ok(Self(date))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32, allow_past: bool) -> DomainResult<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            DomainError::InvalidDueDate(format!("Invalid date: {year}-{month}-{day}"))
        })?;
        Self::new(date, allow_past)
    }

    pub fn from_datetime(datetime: DateTime<Utc>, allow_past: bool) -> DomainResult<Self> {
        Self::new(datetime.with_timezone(&Local).date_naive(), allow_past)
    }

    /// `YYYY-MM-DD` または RFC 3339 形式の文字列から作成
    pub fn parse(value: &str, allow_past: bool) -> DomainResult<Self> {
        let value = value.trim();
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Self::new(date, allow_past);
        }
        let datetime = DateTime::parse_from_rfc3339(value)
            .map_err(|_| DomainError::InvalidDueDate(format!("Invalid date format: {value}")))?;
        Self::from_datetime(datetime.with_timezone(&Utc), allow_past)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn days_until_due(&self) -> i64 {
        self.days_until_due_from(local_today())
    }

    pub fn days_until_due_from(&self, today: NaiveDate) -> i64 {
        (self.0 - today).num_days()
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_from(local_today())
    }

    pub fn is_overdue_from(&self, today: NaiveDate) -> bool {
        self.days_until_due_from(today) < 0
    }

    pub fn is_today(&self) -> bool {
        self.is_today_from(local_today())
    }

    pub fn is_today_from(&self, today: NaiveDate) -> bool {
        self.days_until_due_from(today) == 0
    }

    pub fn is_tomorrow(&self) -> bool {
        self.is_tomorrow_from(local_today())
    }

    pub fn is_tomorrow_from(&self, today: NaiveDate) -> bool {
        self.days_until_due_from(today) == 1
    }

    pub fn is_within_days(&self, days: u32) -> bool {
        self.is_within_days_from(days, local_today())
    }

    pub fn is_within_days_from(&self, days: u32, today: NaiveDate) -> bool {
        let remaining = self.days_until_due_from(today);
        (0..=i64::from(days)).contains(&remaining)
    }

    /// 相対表記（今日 / 明日 / N日後 / N日遅れ）
    pub fn format_relative(&self) -> String {
        self.format_relative_from(local_today())
    }

    pub fn format_relative_from(&self, today: NaiveDate) -> String {
        match self.days_until_due_from(today) {
            0 => "今日".to_string(),
            1 => "明日".to_string(),
            days if days > 1 => format!("{days}日後"),
            days => format!("{}日遅れ", -days),
        }
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_past_dates_rejected_unless_allowed() {
        let today = date(2024, 6, 10);

        assert!(DueDate::new_with_today(date(2024, 6, 9), false, today).is_ok());
        assert!(DueDate::new_with_today(date(2024, 6, 8), false, today).is_err());
        assert!(DueDate::new_with_today(date(2020, 1, 1), true, today).is_ok());
    }

    #[test]
    fn test_days_until_due() {
        let today = date(2024, 6, 10);
        let due = DueDate::new_with_today(date(2024, 6, 15), false, today).unwrap();
        assert_eq!(due.days_until_due_from(today), 5);
        assert!(!due.is_overdue_from(today));
        assert!(due.is_within_days_from(5, today));
        assert!(!due.is_within_days_from(4, today));
    }

    #[test]
    fn test_overdue_today_tomorrow() {
        let today = date(2024, 6, 10);
        let yesterday = DueDate::new_with_today(date(2024, 6, 9), true, today).unwrap();
        let same_day = DueDate::new_with_today(today, false, today).unwrap();
        let tomorrow = DueDate::new_with_today(date(2024, 6, 11), false, today).unwrap();

        assert!(yesterday.is_overdue_from(today));
        assert!(!yesterday.is_within_days_from(3, today));
        assert!(same_day.is_today_from(today));
        assert!(same_day.is_within_days_from(0, today));
        assert!(tomorrow.is_tomorrow_from(today));
    }

    #[test]
    fn test_format_relative() {
        let today = date(2024, 6, 10);
        let at = |d| DueDate::new_with_today(d, true, today).unwrap();

        assert_eq!(at(date(2024, 6, 10)).format_relative_from(today), "今日");
        assert_eq!(at(date(2024, 6, 11)).format_relative_from(today), "明日");
        assert_eq!(at(date(2024, 6, 13)).format_relative_from(today), "3日後");
        assert_eq!(at(date(2024, 6, 7)).format_relative_from(today), "3日遅れ");
    }

    #[test]
    fn test_parse_formats() {
        let due = DueDate::parse("2099-12-31", false).unwrap();
        assert_eq!(due.to_string(), "2099-12-31");

        let due = DueDate::parse("2099-06-15T12:00:00Z", false).unwrap();
        assert_eq!(due.date().year(), 2099);
        assert_eq!(due.date().month(), 6);

        assert!(DueDate::parse("31/12/2099", false).is_err());
        assert!(DueDate::from_ymd(2099, 2, 30, false).is_err());
    }

    #[test]
    fn test_current_day_helpers() {
        let today = DueDate::new(local_today(), false).unwrap();
        assert_eq!(today.days_until_due(), 0);
        assert!(today.is_today());
        assert_eq!(today.format_relative(), "今日");
    }
}
