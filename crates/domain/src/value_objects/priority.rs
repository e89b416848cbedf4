use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Todo の優先度
///
/// 数値は重要度の昇順に 1〜4 を割り当て、その数値で全順序を定義する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low = 1,
    #[default]
    Normal = 2,
    High = 3,
    Urgent = 4,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Urgent,
    ];

    /// 数値（1〜4）から優先度を作成
    pub fn from_numeric(value: i64) -> DomainResult<Self> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Normal),
            3 => Ok(Priority::High),
            4 => Ok(Priority::Urgent),
            _ => Err(DomainError::InvalidPriority(format!(
                "Invalid priority value: {value} (expected 1-4)"
            ))),
        }
    }

    pub fn numeric_value(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// 表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "低",
            Priority::Normal => "通常",
            Priority::High => "高",
            Priority::Urgent => "緊急",
        }
    }

    /// 表示色（16進カラーコード）
    pub fn color(&self) -> &'static str {
        match self {
            Priority::Low => "#6B7280",
            Priority::Normal => "#3B82F6",
            Priority::High => "#F59E0B",
            Priority::Urgent => "#EF4444",
        }
    }

    pub fn compare_to(&self, other: &Priority) -> Ordering {
        self.numeric_value().cmp(&other.numeric_value())
    }

    pub fn is_higher_than(&self, other: &Priority) -> bool {
        self.compare_to(other) == Ordering::Greater
    }

    pub fn is_lower_than(&self, other: &Priority) -> bool {
        self.compare_to(other) == Ordering::Less
    }

    /// HIGH 以上か
    pub fn is_high(&self) -> bool {
        self.numeric_value() >= Priority::High.numeric_value()
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::Urgent)
    }

    pub fn sort_ascending(priorities: &mut [Priority]) {
        priorities.sort_by(|a, b| a.compare_to(b));
    }

    pub fn sort_descending(priorities: &mut [Priority]) {
        priorities.sort_by(|a, b| b.compare_to(a));
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "NORMAL" => Ok(Priority::Normal),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            _ => Err(DomainError::InvalidPriority(format!(
                "Invalid priority: {s}"
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
