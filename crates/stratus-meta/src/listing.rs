//! The delimiter fold of the `ListObjects` algorithm.
//!
//! The SQL side produces up to `max_keys + 1` rows in strict key order; this
//! fold walks them, routing rows under a delimiter boundary into the
//! deduplicated `CommonPrefixes` set and the rest into `Contents`, and
//! decides truncation from the overflow row.

use std::collections::HashSet;

use crate::models::{Listing, ObjectRecord};

/// Fold a key-ordered row page into a [`Listing`].
///
/// Rules (each consumed row counts toward `max_keys`, whether it becomes a
/// content entry or collapses into a common prefix):
///
/// - with both `delimiter` and `prefix` set, a key whose post-prefix tail
///   contains the delimiter contributes `prefix + tail[..=delimiter]` to
///   `CommonPrefixes` instead of appearing in `Contents`;
/// - `next_marker` tracks the last key appended to `Contents`;
/// - the `max_keys + 1`-th row only proves truncation and is dropped.
#[must_use]
pub fn fold_listing(
    rows: Vec<ObjectRecord>,
    prefix: &str,
    delimiter: &str,
    max_keys: i64,
) -> Listing {
    let mut listing = Listing::default();
    let mut seen_prefixes: HashSet<String> = HashSet::new();
    let mut count: i64 = 0;

    for row in rows {
        count += 1;
        if count > max_keys {
            listing.is_truncated = true;
            break;
        }

        if !delimiter.is_empty() && !prefix.is_empty() {
            let tail = row.key.strip_prefix(prefix).unwrap_or(&row.key);
            if let Some(idx) = tail.find(delimiter) {
                let common = format!("{prefix}{}", &tail[..idx + delimiter.len()]);
                if seen_prefixes.insert(common.clone()) {
                    listing.common_prefixes.push(common);
                }
                continue;
            }
        }

        listing.next_marker = Some(row.key.clone());
        listing.objects.push(row);
    }

    listing
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;

    use super::*;

    fn row(key: &str) -> ObjectRecord {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        ObjectRecord {
            id: 0,
            bucket_id: 1,
            key: key.to_owned(),
            version_id: "null".to_owned(),
            size: 1,
            etag: "e".to_owned(),
            content_type: "application/octet-stream".to_owned(),
            storage_class: "STANDARD".to_owned(),
            storage_path: key.to_owned(),
            metadata: Json(HashMap::new()),
            is_delete_marker: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn keys(listing: &Listing) -> Vec<&str> {
        listing.objects.iter().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn test_should_list_plain_page_without_delimiter() {
        let listing = fold_listing(vec![row("a"), row("b"), row("c")], "", "", 1000);
        assert_eq!(keys(&listing), vec!["a", "b", "c"]);
        assert!(listing.common_prefixes.is_empty());
        assert!(!listing.is_truncated);
        assert_eq!(listing.next_marker.as_deref(), Some("c"));
    }

    #[test]
    fn test_should_truncate_and_drop_overflow_row() {
        let listing = fold_listing(vec![row("a"), row("b"), row("c")], "", "", 2);
        assert_eq!(keys(&listing), vec!["a", "b"]);
        assert!(listing.is_truncated);
        assert_eq!(listing.next_marker.as_deref(), Some("b"));
    }

    #[test]
    fn test_should_group_delimited_keys_into_common_prefixes() {
        let rows = vec![
            row("photos/2025/a.jpg"),
            row("photos/2025/b.jpg"),
            row("photos/2026/c.jpg"),
            row("photos/readme.txt"),
        ];
        let listing = fold_listing(rows, "photos/", "/", 1000);
        assert_eq!(
            listing.common_prefixes,
            vec!["photos/2025/", "photos/2026/"]
        );
        assert_eq!(keys(&listing), vec!["photos/readme.txt"]);
        assert!(!listing.is_truncated);
    }

    #[test]
    fn test_should_keep_contents_and_prefixes_disjoint() {
        let rows = vec![row("p/x/1"), row("p/x/2"), row("p/y")];
        let listing = fold_listing(rows, "p/", "/", 1000);
        assert_eq!(listing.common_prefixes, vec!["p/x/"]);
        assert_eq!(keys(&listing), vec!["p/y"]);
        for key in keys(&listing) {
            assert!(!listing.common_prefixes.iter().any(|p| p == key));
        }
    }

    #[test]
    fn test_should_not_group_without_prefix() {
        // Delimiter grouping requires both prefix and delimiter.
        let listing = fold_listing(vec![row("a/b"), row("c/d")], "", "/", 1000);
        assert_eq!(keys(&listing), vec!["a/b", "c/d"]);
        assert!(listing.common_prefixes.is_empty());
    }

    #[test]
    fn test_should_count_prefix_rows_toward_max_keys() {
        let rows = vec![row("p/x/1"), row("p/x/2"), row("p/y")];
        // Two rows fit the page; both collapse into one common prefix, and
        // the third row flips the truncation flag.
        let listing = fold_listing(rows, "p/", "/", 2);
        assert_eq!(listing.common_prefixes, vec!["p/x/"]);
        assert!(keys(&listing).is_empty());
        assert!(listing.is_truncated);
    }

    #[test]
    fn test_should_handle_multibyte_delimiter() {
        let rows = vec![row("logs::2026::jan"), row("logs::feb")];
        let listing = fold_listing(rows, "logs::", "::", 1000);
        assert_eq!(listing.common_prefixes, vec!["logs::2026::"]);
        assert_eq!(keys(&listing), vec!["logs::feb"]);
    }
}
