use crate::errors::{DomainError, DomainResult};
use crate::events::DomainEvent;
use crate::todo::TodoEntity;
use crate::todo_specification::TodoSpecification;
use crate::value_objects::{TodoId, UserId};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// ページング指定（page は 1 始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationOptions {
    page: u32,
    limit: u32,
    offset: Option<u64>,
}

impl PaginationOptions {
    pub fn new(page: u32, limit: u32) -> DomainResult<Self> {
        Self::with_max_limit(page, limit, MAX_PAGE_SIZE)
    }

    pub fn with_max_limit(page: u32, limit: u32, max_limit: u32) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::Validation(
                "Page must be greater than or equal to 1".to_string(),
            ));
        }
        if limit == 0 || limit > max_limit {
            return Err(DomainError::Validation(format!(
                "Limit must be between 1 and {max_limit}: {limit}"
            )));
        }
        Ok(Self {
            page,
            limit,
            offset: None,
        })
    }

    /// 明示的なオフセットを指定する（page からの計算より優先される）
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 上限を差し替えて再検証する（明示オフセットは保持）
    pub fn revalidate(&self, max_limit: u32) -> DomainResult<Self> {
        let validated = Self::with_max_limit(self.page, self.limit, max_limit)?;
        Ok(Self {
            offset: self.offset,
            ..validated
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
            .unwrap_or_else(|| u64::from(self.page.saturating_sub(1)) * u64::from(self.limit))
    }
}

#[derive(Deserialize)]
struct RawPaginationOptions {
    page: u32,
    limit: u32,
    #[serde(default)]
    offset: Option<u64>,
}

// 上限はリポジトリ側の設定で再検証する
impl<'de> Deserialize<'de> for PaginationOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawPaginationOptions::deserialize(deserializer)?;
        let validated = Self::with_max_limit(raw.page, raw.limit, u32::MAX)
            .map_err(de::Error::custom)?;
        Ok(Self {
            offset: raw.offset,
            ..validated
        })
    }
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            offset: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoSortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub field: TodoSortField,
    pub direction: SortDirection,
}

impl SortOption {
    pub fn asc(field: TodoSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: TodoSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// 検索オプション（ソートは先頭から順に優先される）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    pub pagination: Option<PaginationOptions>,
    pub sort: Vec<SortOption>,
}

impl FindOptions {
    pub fn paginated(pagination: PaginationOptions) -> Self {
        Self {
            pagination: Some(pagination),
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, sort: SortOption) -> Self {
        self.sort.push(sort);
        self
    }
}

#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PaginatedResult<T> {
    /// 前後ページの有無は実際のオフセットと件数から求める
    pub fn new(items: Vec<T>, pagination: PaginationOptions, total_count: u64) -> Self {
        let limit = u64::from(pagination.limit().max(1));
        let offset = pagination.offset();
        let total_pages = total_count.div_ceil(limit);
        let page = u32::try_from(offset / limit + 1).unwrap_or(u32::MAX);
        let has_next = offset.saturating_add(items.len() as u64) < total_count;

        Self {
            items,
            page,
            limit: pagination.limit(),
            total_count,
            total_pages,
            has_next,
            has_previous: offset > 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Todo not found: {0}")]
    NotFound(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// 永続化層が実装する Todo リポジトリの境界
pub trait TodoRepository: Send + Sync {
    /// 集約を保存し、保存できた未コミットイベントを返す
    fn save(&self, todo: &mut TodoEntity) -> RepositoryResult<Vec<DomainEvent>>;

    fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<TodoEntity>>;

    fn exists(&self, id: &TodoId) -> RepositoryResult<bool>;

    fn find_by_user_id(
        &self,
        user_id: &UserId,
        options: &FindOptions,
    ) -> RepositoryResult<Vec<TodoEntity>>;

    fn find_by_specification(
        &self,
        specification: &TodoSpecification,
        options: &FindOptions,
    ) -> RepositoryResult<Vec<TodoEntity>>;

    fn count_by_specification(&self, specification: &TodoSpecification) -> RepositoryResult<u64>;

    fn count_by_user_id(
        &self,
        user_id: &UserId,
        specification: Option<&TodoSpecification>,
    ) -> RepositoryResult<u64>;

    fn find_with_pagination(
        &self,
        options: &FindOptions,
        specification: Option<&TodoSpecification>,
    ) -> RepositoryResult<PaginatedResult<TodoEntity>>;

    /// 削除できた場合は true
    fn delete(&self, id: &TodoId) -> RepositoryResult<bool>;

    /// 削除した件数を返す
    fn delete_many(&self, ids: &[TodoId]) -> RepositoryResult<usize>;

    fn delete_all_by_user_id(&self, user_id: &UserId) -> RepositoryResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_validation() {
        assert!(PaginationOptions::new(0, 10).is_err());
        assert!(PaginationOptions::new(1, 0).is_err());
        assert!(PaginationOptions::new(1, MAX_PAGE_SIZE + 1).is_err());
        assert!(PaginationOptions::with_max_limit(1, 50, 25).is_err());

        let options = PaginationOptions::new(3, 10).unwrap();
        assert_eq!(options.offset(), 20);
        assert_eq!(options.with_offset(5).offset(), 5);

        let revalidated = options.with_offset(5).revalidate(50).unwrap();
        assert_eq!(revalidated.offset(), 5);
        assert!(options.revalidate(5).is_err());
    }

    #[test]
    fn test_paginated_result_metadata() {
        let pagination = PaginationOptions::new(2, 10).unwrap();
        let result = PaginatedResult::new(vec![1; 10], pagination, 25);
        assert_eq!(result.total_pages, 3);
        assert!(result.has_next);
        assert!(result.has_previous);

        let last = PaginatedResult::new(vec![1; 5], PaginationOptions::new(3, 10).unwrap(), 25);
        assert!(!last.has_next);

        let empty: PaginatedResult<i32> = PaginatedResult::new(vec![], PaginationOptions::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_previous);
    }

    #[test]
    fn test_paginated_result_follows_explicit_offset() {
        let pagination = PaginationOptions::new(1, 2).unwrap().with_offset(3);
        let result = PaginatedResult::new(vec![4], pagination, 4);
        assert_eq!(result.page, 2);
        assert!(!result.has_next);
        assert!(result.has_previous);

        let pagination = PaginationOptions::new(1, 2).unwrap().with_offset(1);
        let result = PaginatedResult::new(vec![2, 3], pagination, 4);
        assert!(result.has_next);
        assert!(result.has_previous);
    }

    #[test]
    fn test_paginated_result_with_zero_limit() {
        let pagination = PaginationOptions {
            page: 1,
            limit: 0,
            offset: None,
        };
        let result = PaginatedResult::new(Vec::<i32>::new(), pagination, 5);
        assert_eq!(result.total_pages, 5);
        assert!(result.has_next);
    }

    #[test]
    fn test_deserialize_validates_pagination() {
        let options: PaginationOptions =
            serde_json::from_str(r#"{"page":2,"limit":10,"offset":null}"#).unwrap();
        assert_eq!(options.offset(), 10);

        let options: PaginationOptions =
            serde_json::from_str(r#"{"page":1,"limit":10,"offset":7}"#).unwrap();
        assert_eq!(options.offset(), 7);

        assert!(serde_json::from_str::<PaginationOptions>(r#"{"page":1,"limit":0,"offset":null}"#).is_err());
        assert!(serde_json::from_str::<PaginationOptions>(r#"{"page":0,"limit":10}"#).is_err());
    }
}
