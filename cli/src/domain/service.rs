//! Subdomain-keyed service maps.

use hoster_common::ServiceRecord;
use indexmap::IndexMap;

/// Services keyed by subdomain, in insertion order.
pub type ServiceMap = IndexMap<String, ServiceRecord>;

/// Build a [`ServiceMap`] from records.
///
/// A repeated subdomain keeps its first position but takes the last record.
#[must_use]
pub fn service_map(records: impl IntoIterator<Item = ServiceRecord>) -> ServiceMap {
    let mut map = ServiceMap::new();
    for record in records {
        map.insert(record.subdomain.clone(), record);
    }
    map
}

/// Returns `true` if `id` is a full 40-character hex commit id.
#[must_use]
pub fn is_commit_id(id: &str) -> bool {
    id.len() == 40 && id.chars().all(|c| c.is_ascii_hexdigit())
}
