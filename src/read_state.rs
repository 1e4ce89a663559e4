use crate::models::{DiscountRecord, ReadSet};

pub fn is_unread(record: &DiscountRecord, read_set: &ReadSet) -> bool {
    !read_set.contains(&record.id)
}

/// Drives the dot on the notification bell.
pub fn has_any_unread(records: &[DiscountRecord], read_set: &ReadSet) -> bool {
    records.iter().any(|record| is_unread(record, read_set))
}

pub fn unread_count(records: &[DiscountRecord], read_set: &ReadSet) -> usize {
    records
        .iter()
        .filter(|record| is_unread(record, read_set))
        .count()
}

/// Returns `true` when `id` was not already marked.
pub fn mark_read(read_set: &mut ReadSet, id: &str) -> bool {
    if read_set.contains(id) {
        return false;
    }
    read_set.insert(id.to_string())
}
