use crate::images;
use crate::models::{
    CalendarDay, CalendarView, DiscountRecord, EditChip, HomeView, NotificationEntry, ReadSet,
    StoreChip, Weekday,
};
use crate::read_state::{has_any_unread, is_unread, unread_count};
use std::collections::HashSet;

pub const MAX_STORE_CHIPS: usize = 12;

/// One chip per distinct trimmed store name, first record wins.
pub fn store_chips(records: &[DiscountRecord]) -> Vec<StoreChip> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| {
            let name = record.store_name.trim();
            if name.is_empty() || !seen.insert(name) {
                return None;
            }
            Some(StoreChip {
                store_name: name.to_string(),
                image: Some(record.image.clone()).filter(|image| !image.is_empty()),
            })
        })
        .take(MAX_STORE_CHIPS)
        .collect()
}

/// Newest first; ties keep stored order.
pub fn feed(records: &[DiscountRecord]) -> Vec<DiscountRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// A record shows up under every day it applies to.
pub fn calendar(records: &[DiscountRecord]) -> CalendarView {
    let sorted = feed(records);
    let days = Weekday::ALL
        .into_iter()
        .map(|day| CalendarDay {
            day,
            records: sorted
                .iter()
                .filter(|record| record.days.contains(&day))
                .cloned()
                .collect(),
        })
        .collect();

    CalendarView { days }
}

pub fn notification_feed(records: &[DiscountRecord], read_set: &ReadSet) -> Vec<NotificationEntry> {
    feed(records)
        .into_iter()
        .map(|record| NotificationEntry {
            unread: is_unread(&record, read_set),
            record,
        })
        .collect()
}

pub fn home(records: &[DiscountRecord], read_set: &ReadSet) -> HomeView {
    HomeView {
        stores: store_chips(records),
        feed: feed(records),
        has_unread: has_any_unread(records, read_set),
        unread_count: unread_count(records, read_set),
    }
}

pub fn edit_row(records: &[DiscountRecord]) -> Vec<EditChip> {
    feed(records)
        .into_iter()
        .map(|record| EditChip {
            store_name: if record.store_name.trim().is_empty() {
                "Tienda".to_string()
            } else {
                record.store_name
            },
            image: if record.image.is_empty() {
                images::default_image()
            } else {
                record.image
            },
            id: record.id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_state::mark_read;

    fn record(id: &str, store: &str, created_at: i64, days: &[Weekday]) -> DiscountRecord {
        DiscountRecord {
            id: id.to_string(),
            store_name: store.to_string(),
            description: String::new(),
            discount_value: "30%".to_string(),
            entity: "OCA".to_string(),
            repeat: "weekly".to_string(),
            days: days.iter().copied().collect(),
            image: format!("img-{id}"),
            created_at,
            updated_at: None,
        }
    }

    fn ids(records: &[DiscountRecord]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn empty_records_give_empty_views() {
        let read_set = ReadSet::new();
        assert!(store_chips(&[]).is_empty());
        assert!(feed(&[]).is_empty());
        assert!(notification_feed(&[], &read_set).is_empty());
        assert!(edit_row(&[]).is_empty());
        let view = calendar(&[]);
        assert_eq!(view.days.len(), 7);
        assert!(view.days.iter().all(|day| day.records.is_empty()));
        assert!(!home(&[], &read_set).has_unread);
    }

    #[test]
    fn store_chips_dedupe_trimmed_names_first_wins() {
        let records = vec![
            record("a", "Kiosco", 1, &[Weekday::Monday]),
            record("b", "  Kiosco ", 2, &[Weekday::Monday]),
            record("c", "kiosco", 3, &[Weekday::Monday]),
            record("d", "   ", 4, &[Weekday::Monday]),
        ];
        let chips = store_chips(&records);
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].store_name, "Kiosco");
        assert_eq!(chips[0].image.as_deref(), Some("img-a"));
        assert_eq!(chips[1].store_name, "kiosco");
    }

    #[test]
    fn store_chips_cap_at_twelve() {
        let records: Vec<_> = (0..20)
            .map(|n| record(&n.to_string(), &format!("Tienda {n}"), n, &[Weekday::Friday]))
            .collect();
        let chips = store_chips(&records);
        assert_eq!(chips.len(), MAX_STORE_CHIPS);
        assert_eq!(chips[11].store_name, "Tienda 11");
    }

    #[test]
    fn feed_sorts_newest_first_and_keeps_ties_stable() {
        let records = vec![
            record("a", "A", 10, &[Weekday::Monday]),
            record("b", "B", 30, &[Weekday::Monday]),
            record("c", "C", 10, &[Weekday::Monday]),
            record("d", "D", 20, &[Weekday::Monday]),
        ];
        assert_eq!(ids(&feed(&records)), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn calendar_fans_out_multi_day_records() {
        let records = vec![
            record("old", "A", 1, &[Weekday::Monday, Weekday::Wednesday]),
            record("new", "B", 2, &[Weekday::Wednesday]),
            record("sun", "C", 3, &[Weekday::Sunday]),
        ];
        let view = calendar(&records);
        assert_eq!(ids(view.bucket(Weekday::Monday)), vec!["old"]);
        assert_eq!(ids(view.bucket(Weekday::Wednesday)), vec!["new", "old"]);
        assert_eq!(ids(view.bucket(Weekday::Sunday)), vec!["sun"]);
        assert!(view.bucket(Weekday::Tuesday).is_empty());
        assert_eq!(
            view.days.iter().map(|day| day.day).collect::<Vec<_>>(),
            Weekday::ALL.to_vec()
        );
    }

    #[test]
    fn reading_an_entry_keeps_its_position() {
        let records = vec![
            record("a", "A", 1, &[Weekday::Monday]),
            record("b", "B", 2, &[Weekday::Monday]),
        ];
        let mut read_set = ReadSet::new();
        let before = notification_feed(&records, &read_set);
        assert!(before.iter().all(|entry| entry.unread));

        mark_read(&mut read_set, "a");
        let after = notification_feed(&records, &read_set);
        assert_eq!(
            after.iter().map(|entry| entry.record.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
        assert!(after[0].unread);
        assert!(!after[1].unread);
        let view = home(&records, &read_set);
        assert!(view.has_unread);
        assert_eq!(view.unread_count, 1);
    }

    #[test]
    fn edit_row_fills_missing_image() {
        let mut blank = record("a", "Kiosco", 1, &[Weekday::Monday]);
        blank.image.clear();
        let row = edit_row(&[blank]);
        assert_eq!(row[0].image, images::default_image());
        assert_eq!(row[0].id, "a");
    }
}
