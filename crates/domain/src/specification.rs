//! 合成可能な仕様（Specification パターン）
//!
//! 仕様は `Leaf / And / Or / Not` の木として表現し、[`Specification::is_satisfied_by`] が
//! 木を評価する。葉の条件は [`Criterion`] を実装した任意の型で、評価は副作用を持たない。

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 仕様の葉となる条件
pub trait Criterion {
    type Candidate;

    fn is_satisfied_by(&self, candidate: &Self::Candidate) -> bool;

    fn description(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Specification<C> {
    Leaf(C),
    And(Box<Specification<C>>, Box<Specification<C>>),
    Or(Box<Specification<C>>, Box<Specification<C>>),
    Not(Box<Specification<C>>),
}

impl<C: Criterion> Specification<C> {
    pub fn leaf(criterion: C) -> Self {
        Specification::Leaf(criterion)
    }

    pub fn and(self, other: Self) -> Self {
        Specification::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        Specification::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Specification::Not(Box::new(self))
    }

    pub fn is_satisfied_by(&self, candidate: &C::Candidate) -> bool {
        match self {
            Specification::Leaf(criterion) => criterion.is_satisfied_by(candidate),
            Specification::And(left, right) => {
                left.is_satisfied_by(candidate) && right.is_satisfied_by(candidate)
            }
            Specification::Or(left, right) => {
                left.is_satisfied_by(candidate) || right.is_satisfied_by(candidate)
            }
            Specification::Not(inner) => !inner.is_satisfied_by(candidate),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Specification::Leaf(criterion) => criterion.description(),
            Specification::And(left, right) => {
                format!("({} AND {})", left.description(), right.description())
            }
            Specification::Or(left, right) => {
                format!("({} OR {})", left.description(), right.description())
            }
            Specification::Not(inner) => format!("NOT {}", inner.description()),
        }
    }

    /// 条件を満たす要素だけを返す
    pub fn filter<'a>(&self, candidates: &'a [C::Candidate]) -> Vec<&'a C::Candidate> {
        candidates
            .iter()
            .filter(|candidate| self.is_satisfied_by(candidate))
            .collect()
    }

    pub fn count(&self, candidates: &[C::Candidate]) -> usize {
        candidates
            .iter()
            .filter(|candidate| self.is_satisfied_by(candidate))
            .count()
    }
}

impl<C: Criterion> From<C> for Specification<C> {
    fn from(criterion: C) -> Self {
        Specification::Leaf(criterion)
    }
}

/// 任意のクロージャを名前付きの条件として扱う
pub struct Predicate<T> {
    description: String,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Predicate<T> {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T> Criterion for Predicate<T> {
    type Candidate = T;

    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
