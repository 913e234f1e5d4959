// ==========================================
// 供货合同系统 - 领域类型定义
// ==========================================
// 日期在系统边界上统一为 `YYYY-MM-DD` 文本，只有日历日，不带时间
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 边界日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析调用方提交的日历日期
///
/// 首尾空白忽略；带时间分量、缺字段、非法日历日（如 2024-02-30）均返回错误
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

/// 按边界格式输出日期
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ==========================================
// ValidityInterval - 合同有效期
// ==========================================
// 闭区间 [start, end]，start <= end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ValidityInterval {
    /// 构造有效期；start 晚于 end 时返回 None
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// 日期是否落在有效期内（两端都包含）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for ValidityInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", format_date(self.start), format_date(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2024-06-15").unwrap(), d(2024, 6, 15));
        assert_eq!(parse_calendar_date(" 2024-06-15 ").unwrap(), d(2024, 6, 15));
        assert!(parse_calendar_date("2024-02-30").is_err());
        assert!(parse_calendar_date("15.06.2024").is_err());
        assert!(parse_calendar_date("2024-06-15 10:00:00").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn test_interval_bounds_inclusive() {
        let interval = ValidityInterval::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();

        assert!(interval.contains(d(2024, 1, 1)));
        assert!(interval.contains(d(2024, 12, 31)));
        assert!(!interval.contains(d(2023, 12, 31)));
        assert!(!interval.contains(d(2025, 1, 1)));
        assert_eq!(interval.to_string(), "[2024-01-01, 2024-12-31]");
    }

    #[test]
    fn test_interval_rejects_inverted_bounds() {
        assert!(ValidityInterval::new(d(2024, 2, 1), d(2024, 1, 1)).is_none());
        assert!(ValidityInterval::new(d(2024, 1, 1), d(2024, 1, 1)).is_some());
    }
}
