use std::collections::HashMap;

use serde_json::Value;
use sqlx::{PgPool, Row};

use super::error::QueryError;
use super::fields;
use super::order;
use super::types::{bind_query, bind_query_as, OrderInfo, PageLink, Pagination};
use super::where_clause::WhereBuilder;
use crate::config::PaginationConfig;
use crate::models::Property;

/// One parsed listing query: filters, sort, projection, and the pagination
/// window, built from the raw query-string map.
#[derive(Debug)]
pub struct PropertyQuery {
    where_builder: WhereBuilder,
    order: Vec<OrderInfo>,
    select: Option<Vec<String>>,
    page: i64,
    limit: i64,
}

impl PropertyQuery {
    pub fn from_params(
        params: &HashMap<String, String>,
        defaults: &PaginationConfig,
    ) -> Result<Self, QueryError> {
        let where_builder = WhereBuilder::from_params(params)?;

        let order = match params.get("sort") {
            Some(sort) => order::parse_sort(sort)?,
            None => Vec::new(),
        };

        let select = match params.get("select") {
            Some(raw) => Some(parse_select(raw)?),
            None => None,
        };

        // Unparseable page/limit fall back to defaults rather than erroring
        let page = params
            .get("page")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = params
            .get("limit")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.default_limit)
            .clamp(1, defaults.max_limit);

        Ok(Self { where_builder, order, select, page, limit })
    }

    pub fn to_sql(&self) -> String {
        [
            "SELECT * FROM properties".to_string(),
            self.where_builder.clause(),
            order::order_clause(&self.order),
            format!("LIMIT {} OFFSET {}", self.limit, self.start_index()),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn to_count_sql(&self) -> String {
        [
            "SELECT COUNT(*) AS count FROM properties".to_string(),
            self.where_builder.clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn start_index(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn end_index(&self) -> i64 {
        self.page * self.limit
    }

    /// next/prev against the unpaginated total
    pub fn pagination(&self, total: i64) -> Pagination {
        let mut pagination = Pagination::default();
        if self.end_index() < total {
            pagination.next = Some(PageLink { page: self.page + 1, limit: self.limit });
        }
        if self.start_index() > 0 {
            pagination.prev = Some(PageLink { page: self.page - 1, limit: self.limit });
        }
        pagination
    }

    pub async fn fetch(&self, pool: &PgPool) -> Result<Vec<Property>, sqlx::Error> {
        let sql = self.to_sql();
        let mut q = sqlx::query_as::<_, Property>(&sql);
        for value in self.where_builder.binds() {
            q = bind_query_as(q, value);
        }
        q.fetch_all(pool).await
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let sql = self.to_count_sql();
        let mut q = sqlx::query(&sql);
        for value in self.where_builder.binds() {
            q = bind_query(q, value);
        }
        let row = q.fetch_one(pool).await?;
        row.try_get("count")
    }

    /// Restrict a serialized row to the selected fields. `_id` always stays.
    pub fn apply_select(&self, item: Value) -> Value {
        let Some(selected) = &self.select else {
            return item;
        };
        let Value::Object(map) = item else {
            return item;
        };
        let filtered = map
            .into_iter()
            .filter(|(key, _)| key == "_id" || selected.iter().any(|s| s == key))
            .collect();
        Value::Object(filtered)
    }
}

fn parse_select(raw: &str) -> Result<Vec<String>, QueryError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            if fields::SELECTABLE.contains(&name) {
                Ok(name.to_string())
            } else {
                Err(QueryError::UnknownSelectField(name.to_string()))
            }
        })
        .collect()
}
