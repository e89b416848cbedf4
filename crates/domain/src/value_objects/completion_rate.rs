use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN: f64 = 0.0;
const MAX: f64 = 100.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 完了率（0〜100%、小数点以下2桁に丸める）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct CompletionRate(f64);

impl CompletionRate {
    /// パーセンテージから作成（範囲外や非有限値はエラー）
    pub fn new(percentage: f64) -> DomainResult<Self> {
        if !percentage.is_finite() {
            return Err(DomainError::InvalidCompletionRate(format!(
                "Completion rate must be a finite number: {percentage}"
            )));
        }
        if !(MIN..=MAX).contains(&percentage) {
            return Err(DomainError::InvalidCompletionRate(format!(
                "Completion rate must be between 0 and 100: {percentage}"
            )));
        }
        Ok(Self(round2(percentage)))
    }

    /// 範囲外の値を 0〜100 に丸めて作成（NaN は 0 とみなす）
    pub fn clamped(percentage: f64) -> Self {
        if percentage.is_nan() {
            return Self::zero();
        }
        Self(round2(percentage.clamp(MIN, MAX)))
    }

    /// 完了数と総数から作成（総数 0 の場合は 0%）
    pub fn from_counts(completed: i64, total: i64) -> DomainResult<Self> {
        if completed < 0 || total < 0 {
            return Err(DomainError::InvalidCompletionRate(format!(
                "Counts must be non-negative: completed={completed}, total={total}"
            )));
        }
        if completed > total {
            return Err(DomainError::InvalidCompletionRate(format!(
                "Completed count ({completed}) cannot exceed total count ({total})"
            )));
        }
        if total == 0 {
            return Ok(Self::zero());
        }
        Ok(Self::clamped(completed as f64 / total as f64 * 100.0))
    }

    pub fn zero() -> Self {
        Self(MIN)
    }

    pub fn complete() -> Self {
        Self(MAX)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn add(&self, other: CompletionRate) -> Self {
        Self::clamped(self.0 + other.0)
    }

    pub fn subtract(&self, other: CompletionRate) -> Self {
        Self::clamped(self.0 - other.0)
    }

    /// 平均値（空の場合は 0%）
    pub fn average(rates: &[CompletionRate]) -> Self {
        if rates.is_empty() {
            return Self::zero();
        }
        let sum: f64 = rates.iter().map(|r| r.0).sum();
        Self::clamped(sum / rates.len() as f64)
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= MAX
    }

    pub fn is_not_started(&self) -> bool {
        self.0 <= MIN
    }

    /// 進捗の説明文
    pub fn description(&self) -> &'static str {
        match self.0 {
            v if v <= MIN => "未着手",
            v if v <= 25.0 => "着手",
            v if v < 80.0 => "進行中",
            v if v < MAX => "もうすぐ完了",
            _ => "完了",
        }
    }
}

impl TryFrom<f64> for CompletionRate {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompletionRate> for f64 {
    fn from(rate: CompletionRate) -> Self {
        rate.0
    }
}

impl fmt::Display for CompletionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}
