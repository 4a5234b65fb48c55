use crate::domain::GroupRecord;

pub const MAX_RESULTS: usize = 10;

/// Case-insensitive substring match over name, id and category.
///
/// An empty query matches nothing. Matches come back in catalog order,
/// capped at [`MAX_RESULTS`]; the scan stops as soon as the cap is hit.
pub fn filter<'a>(catalog: &'a [GroupRecord], query: &str) -> Vec<&'a GroupRecord> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|record| matches(record, &needle))
        .take(MAX_RESULTS)
        .collect()
}

fn matches(record: &GroupRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.id.to_lowercase().contains(needle)
        || record.parent_category.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_match_ignores_case() {
        let catalog = vec![GroupRecord::new("Lab", "AbC12", "Misc")];
        assert_eq!(filter(&catalog, "abc").len(), 1);
        assert_eq!(filter(&catalog, "ABC").len(), 1);
    }

    #[test]
    fn whitespace_query_is_a_real_query() {
        let catalog = vec![
            GroupRecord::new("Ekonomia", "1", "Ekonomia, I stopień"),
            GroupRecord::new("Lab", "2", "Misc"),
        ];
        let result = filter(&catalog, " ");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }
}
