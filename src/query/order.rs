use super::error::QueryError;
use super::fields;
use super::types::{OrderInfo, SortDirection};

/// Parse `sort=-price,createdAt` style input: comma-separated API field
/// names, `-` prefix for descending.
pub fn parse_sort(sort: &str) -> Result<Vec<OrderInfo>, QueryError> {
    let mut out = Vec::new();
    for part in sort.split(',') {
        let token = part.trim();
        if token.is_empty() {
            continue;
        }
        let (name, direction) = match token.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (token, SortDirection::Asc),
        };
        let spec = fields::sort_field(name)
            .ok_or_else(|| QueryError::UnknownSortField(name.to_string()))?;
        out.push(OrderInfo { column: spec.column, sort: direction });
    }
    Ok(out)
}

/// Default sort is newest first
pub fn order_clause(infos: &[OrderInfo]) -> String {
    if infos.is_empty() {
        return "ORDER BY \"created_at\" DESC".to_string();
    }
    let parts: Vec<String> = infos
        .iter()
        .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
        .collect();
    format!("ORDER BY {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_prefix_means_descending() {
        let infos = parse_sort("-price,createdAt").unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].column, "price");
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].column, "created_at");
        assert_eq!(infos[1].sort, SortDirection::Asc);
        assert_eq!(order_clause(&infos), "ORDER BY \"price\" DESC, \"created_at\" ASC");
    }

    #[test]
    fn empty_sort_falls_back_to_created_at_desc() {
        assert_eq!(order_clause(&[]), "ORDER BY \"created_at\" DESC");
    }

    #[test]
    fn unknown_sort_field_is_an_error() {
        let err = parse_sort("-favorites").unwrap_err();
        assert_eq!(err.to_string(), "Cannot sort on field `favorites`");
    }
}
