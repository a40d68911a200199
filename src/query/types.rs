use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::Postgres;
use uuid::Uuid;

/// A typed bind parameter. Filter values are parsed into one of these before
/// any SQL is built; raw strings never reach the query text.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i64),
    Float(f64),
    Money(Decimal),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

pub fn bind_query<'q>(
    q: Query<'q, Postgres, PgArguments>,
    value: &BindValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        BindValue::Text(v) => q.bind(v.clone()),
        BindValue::Int(v) => q.bind(*v),
        BindValue::Float(v) => q.bind(*v),
        BindValue::Money(v) => q.bind(*v),
        BindValue::Bool(v) => q.bind(*v),
        BindValue::Uuid(v) => q.bind(*v),
        BindValue::Timestamp(v) => q.bind(*v),
    }
}

pub fn bind_query_as<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    value: &BindValue,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        BindValue::Text(v) => q.bind(v.clone()),
        BindValue::Int(v) => q.bind(*v),
        BindValue::Float(v) => q.bind(*v),
        BindValue::Money(v) => q.bind(*v),
        BindValue::Bool(v) => q.bind(*v),
        BindValue::Uuid(v) => q.bind(*v),
        BindValue::Timestamp(v) => q.bind(*v),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// Pagination block of a list response. Keys are omitted (not null) when
/// there is no adjacent page, so a single page renders as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageLink {
    pub page: i64,
    pub limit: i64,
}
