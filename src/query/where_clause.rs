use std::collections::HashMap;

use super::error::QueryError;
use super::fields::{self, FieldSpec};
use super::types::BindValue;

/// Query-string keys that are never filters
pub const RESERVED_KEYS: &[&str] = &["select", "sort", "page", "limit"];

/// The closed comparison-operator set callers may use as `field[op]=value`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn from_key(op: &str) -> Result<Self, QueryError> {
        Ok(match op {
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            "in" => FilterOp::In,
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        })
    }

    fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }
}

/// Builds the WHERE clause from non-reserved query parameters. Conditions
/// are ANDed; placeholders are numbered in bind order.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl WhereBuilder {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, QueryError> {
        let mut builder = WhereBuilder::default();

        // Deterministic clause order regardless of map iteration
        let mut keys: Vec<&String> = params
            .keys()
            .filter(|k| !RESERVED_KEYS.contains(&k.as_str()))
            .collect();
        keys.sort();

        for key in keys {
            let (field_name, op) = parse_key(key)?;
            let spec = fields::filter_field(field_name)
                .ok_or_else(|| QueryError::UnknownFilterField(field_name.to_string()))?;
            builder.push(spec, op, &params[key])?;
        }

        Ok(builder)
    }

    fn push(&mut self, spec: &FieldSpec, op: FilterOp, raw: &str) -> Result<(), QueryError> {
        match op {
            FilterOp::In => {
                let mut placeholders = Vec::new();
                for part in raw.split(',') {
                    self.binds.push(fields::parse_value(spec, part.trim())?);
                    placeholders.push(format!("${}", self.binds.len()));
                }
                self.conditions
                    .push(format!("\"{}\" IN ({})", spec.column, placeholders.join(", ")));
            }
            _ => {
                self.binds.push(fields::parse_value(spec, raw)?);
                self.conditions.push(format!(
                    "\"{}\" {} ${}",
                    spec.column,
                    op.sql(),
                    self.binds.len()
                ));
            }
        }
        Ok(())
    }

    /// Full `WHERE ...` clause, or empty when unfiltered
    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }
}

/// Split `price[gte]` into ("price", Gte); a bare key means equality
fn parse_key(key: &str) -> Result<(&str, FilterOp), QueryError> {
    match key.find('[') {
        Some(open) if key.ends_with(']') && open > 0 => {
            let field = &key[..open];
            let op = &key[open + 1..key.len() - 1];
            Ok((field, FilterOp::from_key(op)?))
        }
        Some(_) => Err(QueryError::MalformedKey(key.to_string())),
        None => Ok((key, FilterOp::Eq)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn equality_filter() {
        let builder = WhereBuilder::from_params(&params(&[("type", "house")])).unwrap();
        assert_eq!(builder.clause(), "WHERE \"property_type\" = $1");
        assert_eq!(builder.binds(), &[BindValue::Text("house".to_string())]);
    }

    #[test]
    fn range_operators_rewrite_to_sql() {
        let builder =
            WhereBuilder::from_params(&params(&[("price[gte]", "100000"), ("price[lt]", "500000")]))
                .unwrap();
        let clause = builder.clause();
        assert!(clause.contains("\"price\" >= $"));
        assert!(clause.contains("\"price\" < $"));
        assert_eq!(builder.binds().len(), 2);
    }

    #[test]
    fn in_operator_expands_placeholders() {
        let builder =
            WhereBuilder::from_params(&params(&[("type[in]", "house,condo,land")])).unwrap();
        assert_eq!(builder.clause(), "WHERE \"property_type\" IN ($1, $2, $3)");
        assert_eq!(builder.binds().len(), 3);
    }

    #[test]
    fn reserved_keys_are_not_filters() {
        let builder = WhereBuilder::from_params(&params(&[
            ("select", "title"),
            ("sort", "-price"),
            ("page", "2"),
            ("limit", "5"),
        ]))
        .unwrap();
        assert_eq!(builder.clause(), "");
        assert!(builder.binds().is_empty());
    }

    #[test]
    fn unknown_field_is_an_error() {
        let err = WhereBuilder::from_params(&params(&[("owner", "x")])).unwrap_err();
        assert_eq!(err.to_string(), "Cannot filter on field `owner`");
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let err = WhereBuilder::from_params(&params(&[("price[between]", "1,2")])).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported filter operator `between`");
    }

    #[test]
    fn malformed_key_is_an_error() {
        assert!(WhereBuilder::from_params(&params(&[("price[gte", "1")])).is_err());
    }

    #[test]
    fn clause_order_is_deterministic() {
        let p = params(&[("type", "house"), ("bedrooms", "3"), ("featured", "true")]);
        let a = WhereBuilder::from_params(&p).unwrap().clause();
        let b = WhereBuilder::from_params(&p).unwrap().clause();
        assert_eq!(a, b);
        assert_eq!(a, "WHERE \"bedrooms\" = $1 AND \"featured\" = $2 AND \"property_type\" = $3");
    }
}
