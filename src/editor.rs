//! Create/edit/delete form state machine. Every operation consumes the
//! current state and returns the next one with its outcome; on failure the
//! returned state is the one passed in.

use crate::errors::{EditError, ImageError};
use crate::images;
use crate::models::{DiscountRecord, ENTITIES, EditorView, FormFields, default_entity, default_repeat};
use crate::notify::Notification;
use crate::projections;
use crate::read_state;
use crate::storage::RecordStore;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type Step<T> = (EditorState, Result<T, EditError>);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Creating,
    Editing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    pub target: Target,
    pub fields: FormFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Created(DiscountRecord),
    Updated(DiscountRecord),
}

impl CommitOutcome {
    pub fn record(&self) -> &DiscountRecord {
        match self {
            CommitOutcome::Created(record) | CommitOutcome::Updated(record) => record,
        }
    }

    pub fn into_record(self) -> DiscountRecord {
        match self {
            CommitOutcome::Created(record) | CommitOutcome::Updated(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CommitOutcome::Created(_))
    }

    /// Only new discounts are announced.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            CommitOutcome::Created(record) => Some(Notification {
                title: "Nuevo descuento".to_string(),
                body: format!("{}: {}", record.store_name, record.discount_value),
            }),
            CommitOutcome::Updated(_) => None,
        }
    }
}

impl EditorState {
    pub fn start_create() -> Self {
        Self::default()
    }

    pub fn clear(self) -> Self {
        Self::start_create()
    }

    pub fn target_id(&self) -> Option<&str> {
        match &self.target {
            Target::Creating => None,
            Target::Editing(id) => Some(id),
        }
    }

    pub fn view(&self, store: &RecordStore) -> EditorView {
        EditorView {
            mode: match self.target {
                Target::Creating => "creating",
                Target::Editing(_) => "editing",
            },
            target: self.target_id().map(str::to_string),
            fields: self.fields.clone(),
            records: projections::edit_row(&store.load()),
        }
    }

    pub fn start_edit(self, store: &RecordStore, id: &str) -> Step<()> {
        let records = store.load();
        match records.iter().find(|record| record.id == id) {
            Some(record) => (
                Self {
                    target: Target::Editing(record.id.clone()),
                    fields: FormFields::from(record),
                },
                Ok(()),
            ),
            None => (self, Err(EditError::NotFound { id: id.to_string() })),
        }
    }

    pub fn commit(self, store: &RecordStore, fields: FormFields) -> Step<CommitOutcome> {
        self.commit_at(store, fields, Utc::now().timestamp_millis())
    }

    pub fn commit_at(self, store: &RecordStore, fields: FormFields, now: i64) -> Step<CommitOutcome> {
        let fields = match validate(fields) {
            Ok(fields) => fields,
            Err(err) => return (self, Err(err)),
        };

        let mut records = store.load();
        let outcome = match self.target.clone() {
            Target::Creating => {
                let record = DiscountRecord {
                    id: fresh_id(&records),
                    store_name: fields.store_name,
                    description: fields.description,
                    discount_value: fields.discount_value,
                    entity: fields.entity,
                    repeat: fields.repeat,
                    days: fields.days,
                    image: fields.image,
                    created_at: now,
                    updated_at: None,
                };
                records.push(record.clone());
                CommitOutcome::Created(record)
            }
            Target::Editing(id) => {
                let Some(existing) = records.iter_mut().find(|record| record.id == id) else {
                    return (self, Err(EditError::NotFound { id }));
                };
                existing.store_name = fields.store_name;
                existing.description = fields.description;
                existing.discount_value = fields.discount_value;
                existing.entity = fields.entity;
                existing.repeat = fields.repeat;
                existing.days = fields.days;
                existing.image = fields.image;
                existing.updated_at = Some(now);
                CommitOutcome::Updated(existing.clone())
            }
        };

        if let Err(err) = store.save(&records) {
            return (self, Err(err));
        }

        info!(
            id = %outcome.record().id,
            store = %outcome.record().store_name,
            created = outcome.is_created(),
            "discount committed"
        );
        (Self::start_create(), Ok(outcome))
    }

    /// Removes the selected record and marks its id read. A failed record
    /// write puts the previous read set back.
    pub fn commit_delete(self, store: &RecordStore) -> Step<DiscountRecord> {
        let Some(id) = self.target_id().map(str::to_string) else {
            return (self, Err(EditError::NoTarget));
        };

        let mut records = store.load();
        let Some(position) = records.iter().position(|record| record.id == id) else {
            return (self, Err(EditError::NotFound { id }));
        };
        let removed = records.remove(position);

        let previous = store.load_read_set();
        let mut read_set = previous.clone();
        read_state::mark_read(&mut read_set, &id);
        if let Err(err) = store.save_read_set(&read_set) {
            return (self, Err(err));
        }
        if let Err(err) = store.save(&records) {
            if let Err(restore) = store.save_read_set(&previous) {
                error!("failed to restore read set after aborted delete: {restore}");
            }
            return (self, Err(err));
        }

        info!(id = %removed.id, store = %removed.store_name, "discount deleted");
        (Self::start_create(), Ok(removed))
    }

    pub fn select_preset(mut self, index: usize) -> Step<()> {
        match images::preset_image(index) {
            Some(image) => {
                self.fields.image = image.to_string();
                (self, Ok(()))
            }
            None => (self, Err(EditError::Validation { field: "image" })),
        }
    }

    pub fn apply_image(mut self, result: &Result<String, ImageError>) -> Self {
        match result {
            Ok(image) => self.fields.image = image.clone(),
            Err(err) => warn!("keeping current image: {err}"),
        }
        self
    }
}

fn validate(fields: FormFields) -> Result<FormFields, EditError> {
    let store_name = fields.store_name.trim().to_string();
    if store_name.is_empty() {
        return Err(EditError::Validation { field: "storeName" });
    }
    let discount_value = fields.discount_value.trim().to_string();
    if discount_value.is_empty() {
        return Err(EditError::Validation { field: "discountValue" });
    }
    if fields.days.is_empty() {
        return Err(EditError::Validation { field: "days" });
    }

    let entity = match fields.entity.trim() {
        "" => default_entity(),
        entity if ENTITIES.contains(&entity) => entity.to_string(),
        _ => return Err(EditError::Validation { field: "entity" }),
    };
    let repeat = match fields.repeat.trim() {
        "" => default_repeat(),
        repeat => repeat.to_string(),
    };
    let image = if fields.image.trim().is_empty() {
        images::default_image()
    } else {
        fields.image
    };

    Ok(FormFields {
        store_name,
        description: fields.description.trim().to_string(),
        discount_value,
        entity,
        repeat,
        days: fields.days,
        image,
    })
}

fn fresh_id(records: &[DiscountRecord]) -> String {
    loop {
        let id = Uuid::new_v4().simple().to_string();
        if records.iter().all(|record| record.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReadSet, Weekday};
    use crate::storage::{DISCOUNTS_KEY, KeyValueStore, MemoryStore};
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FlakyDiscounts {
        inner: MemoryStore,
        fail_discounts: AtomicBool,
    }

    impl KeyValueStore for FlakyDiscounts {
        fn get(&self, key: &str) -> io::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> io::Result<()> {
            if key == DISCOUNTS_KEY && self.fail_discounts.load(Ordering::SeqCst) {
                return Err(io::Error::other("disk full"));
            }
            self.inner.set(key, value)
        }
    }

    fn fields(store: &str, value: &str, days: &[Weekday]) -> FormFields {
        FormFields {
            store_name: store.to_string(),
            discount_value: value.to_string(),
            days: days.iter().copied().collect(),
            ..FormFields::default()
        }
    }

    fn create(store: &RecordStore, name: &str, now: i64) -> DiscountRecord {
        let (_, outcome) =
            EditorState::start_create().commit_at(store, fields(name, "2x1", &[Weekday::Monday]), now);
        outcome.unwrap().into_record()
    }

    #[test]
    fn start_create_uses_form_defaults() {
        let state = EditorState::start_create();
        assert_eq!(state.target, Target::Creating);
        assert_eq!(state.fields.entity, "BROU RECOMPENSA");
        assert_eq!(state.fields.repeat, "weekly");
        assert!(state.fields.days.is_empty());
        assert_eq!(state.fields.image, images::default_image());
    }

    #[test]
    fn create_from_empty_store() {
        let store = RecordStore::in_memory();
        let (state, outcome) = EditorState::start_create().commit_at(
            &store,
            fields("Kiosco", "2x1", &[Weekday::Monday]),
            1_000,
        );

        let outcome = outcome.unwrap();
        assert!(outcome.is_created());
        assert_eq!(state, EditorState::start_create());

        let records = store.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].store_name, "Kiosco");
        assert_eq!(records[0].discount_value, "2x1");
        assert_eq!(records[0].days.iter().copied().collect::<Vec<_>>(), vec![Weekday::Monday]);
        assert_eq!(records[0].created_at, 1_000);
        assert!(records[0].updated_at.is_none());
        assert_eq!(&records[0], outcome.record());
    }

    #[test]
    fn created_ids_are_unique_and_announced() {
        let store = RecordStore::in_memory();
        let first = create(&store, "Kiosco", 1);
        let (_, outcome) = EditorState::start_create().commit_at(
            &store,
            fields(" Disco ", " 30% ", &[Weekday::Friday]),
            2,
        );
        let outcome = outcome.unwrap();
        assert_ne!(outcome.record().id, first.id);
        assert_eq!(store.load().len(), 2);

        let notification = outcome.notification().unwrap();
        assert_eq!(notification.title, "Nuevo descuento");
        assert_eq!(notification.body, "Disco: 30%");
    }

    #[test]
    fn validation_names_first_missing_field_and_keeps_state() {
        let store = RecordStore::in_memory();
        let existing = create(&store, "Kiosco", 1);
        let (state, _) = EditorState::start_create().start_edit(&store, &existing.id);

        let cases = [
            (fields("  ", "2x1", &[Weekday::Monday]), "storeName"),
            (fields("Disco", "", &[Weekday::Monday]), "discountValue"),
            (fields("Disco", "2x1", &[]), "days"),
            (
                FormFields {
                    entity: "BANCO FALSO".to_string(),
                    ..fields("Disco", "2x1", &[Weekday::Monday])
                },
                "entity",
            ),
        ];
        for (input, field) in cases {
            let (next, outcome) = state.clone().commit_at(&store, input, 5);
            assert_eq!(outcome, Err(EditError::Validation { field }));
            assert_eq!(next, state);
        }
        assert_eq!(store.load(), vec![existing]);
    }

    #[test]
    fn edit_merges_fields_and_sets_updated_at() {
        let store = RecordStore::in_memory();
        let original = create(&store, "Kiosco", 1);

        let (state, outcome) = EditorState::start_create().start_edit(&store, &original.id);
        outcome.unwrap();
        assert_eq!(state.target, Target::Editing(original.id.clone()));
        assert_eq!(state.fields, FormFields::from(&original));

        let mut input = state.fields.clone();
        input.discount_value = "3x2".to_string();
        input.days.insert(Weekday::Wednesday);
        let (state, outcome) = state.commit_at(&store, input, 99);

        assert_eq!(state, EditorState::start_create());
        let updated = outcome.unwrap();
        assert!(!updated.is_created());
        assert!(updated.notification().is_none());

        let records = store.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, original.id);
        assert_eq!(records[0].created_at, 1);
        assert_eq!(records[0].updated_at, Some(99));
        assert_eq!(records[0].discount_value, "3x2");
        assert_eq!(records[0].days.len(), 2);
    }

    #[test]
    fn edit_of_vanished_record_is_not_found() {
        let store = RecordStore::in_memory();
        let record = create(&store, "Kiosco", 1);
        let (state, _) = EditorState::start_create().start_edit(&store, &record.id);

        // Another writer removes the record behind the editor's back.
        store.save(&[]).unwrap();

        let (next, outcome) = state.clone().commit_at(&store, state.fields.clone(), 2);
        assert_eq!(outcome, Err(EditError::NotFound { id: record.id.clone() }));
        assert_eq!(next, state);
        assert!(store.load().is_empty());
    }

    #[test]
    fn delete_removes_record_and_marks_it_read() {
        let store = RecordStore::in_memory();
        let keep = create(&store, "Disco", 1);
        let gone = create(&store, "Kiosco", 2);

        let (state, _) = EditorState::start_create().start_edit(&store, &gone.id);
        let (state, outcome) = state.commit_delete(&store);

        assert_eq!(outcome.unwrap(), gone);
        assert_eq!(state, EditorState::start_create());
        assert_eq!(store.load(), vec![keep]);
        assert!(store.load_read_set().contains(&gone.id));
    }

    #[test]
    fn delete_without_target_fails() {
        let store = RecordStore::in_memory();
        create(&store, "Kiosco", 1);
        let (state, outcome) = EditorState::start_create().commit_delete(&store);
        assert_eq!(outcome, Err(EditError::NoTarget));
        assert_eq!(state, EditorState::start_create());
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn delete_of_vanished_record_is_not_found() {
        let store = RecordStore::in_memory();
        let record = create(&store, "Kiosco", 1);
        let (state, _) = EditorState::start_create().start_edit(&store, &record.id);
        store.save(&[]).unwrap();

        let (next, outcome) = state.clone().commit_delete(&store);
        assert_eq!(outcome, Err(EditError::NotFound { id: record.id }));
        assert_eq!(next, state);
        assert!(store.load_read_set().is_empty());
    }

    #[test]
    fn start_edit_on_deleted_id_fails() {
        let store = RecordStore::in_memory();
        let record = create(&store, "Kiosco", 1);
        let (state, _) = EditorState::start_create().start_edit(&store, &record.id);
        let (_, outcome) = state.commit_delete(&store);
        outcome.unwrap();

        let (state, outcome) = EditorState::start_create().start_edit(&store, &record.id);
        assert_eq!(outcome, Err(EditError::NotFound { id: record.id }));
        assert_eq!(state.target, Target::Creating);
    }

    #[test]
    fn clear_resets_any_state() {
        let store = RecordStore::in_memory();
        let record = create(&store, "Kiosco", 1);
        let (state, _) = EditorState::start_create().start_edit(&store, &record.id);
        assert_eq!(state.clear(), EditorState::start_create());
    }

    #[test]
    fn image_selection_and_failed_upload() {
        let (state, outcome) = EditorState::start_create().select_preset(2);
        outcome.unwrap();
        assert_eq!(state.fields.image, images::preset_images()[2]);

        let (state, outcome) = state.select_preset(9);
        assert_eq!(outcome, Err(EditError::Validation { field: "image" }));

        let state = state.apply_image(&Err(ImageError::Empty));
        assert_eq!(state.fields.image, images::preset_images()[2]);

        let state = state.apply_image(&Ok("data:image/png;base64,AAAA".to_string()));
        assert_eq!(state.fields.image, "data:image/png;base64,AAAA");
    }

    #[test]
    fn commit_stores_every_submitted_field() {
        let store = RecordStore::in_memory();
        let prior: Vec<String> = (0..3)
            .map(|n| create(&store, &format!("Tienda {n}"), n).id)
            .collect();

        let input = FormFields {
            store_name: "  Disco ".to_string(),
            description: " Solo con tarjeta ".to_string(),
            discount_value: "30%".to_string(),
            entity: "OCA".to_string(),
            repeat: "none".to_string(),
            days: [Weekday::Tuesday, Weekday::Saturday].into_iter().collect(),
            image: "data:image/png;base64,AAAA".to_string(),
        };
        let (_, outcome) = EditorState::start_create().commit_at(&store, input.clone(), 50);
        let created = outcome.unwrap().into_record();

        let records = store.load();
        assert_eq!(records.len(), 4);
        let stored = &records[3];
        assert_eq!(stored, &created);
        assert!(!prior.contains(&stored.id));
        assert_eq!(stored.created_at, 50);
        assert_eq!(
            FormFields::from(stored),
            FormFields {
                store_name: "Disco".to_string(),
                description: "Solo con tarjeta".to_string(),
                ..input
            }
        );
    }

    #[test]
    fn commit_keeps_records_loaded_with_null_fields() {
        let backend = Arc::new(MemoryStore::default());
        backend
            .set(
                DISCOUNTS_KEY,
                r#"[
                    {"id":"a","storeName":"Kiosco","discountValue":"2x1","days":["Lu"],"createdAt":1},
                    {"id":"b","storeName":"Disco","description":null,"discountValue":"30%","days":["Ma"],"createdAt":2}
                ]"#,
            )
            .unwrap();
        let store = RecordStore::new(backend);

        create(&store, "Tata", 3);

        let names: Vec<_> = store.load().into_iter().map(|record| record.store_name).collect();
        assert_eq!(names, vec!["Kiosco", "Disco", "Tata"]);
    }

    #[test]
    fn failed_delete_restores_read_set() {
        let backend = Arc::new(FlakyDiscounts::default());
        let store = RecordStore::new(backend.clone());
        let record = create(&store, "Kiosco", 1);
        store.mark_read("otro").unwrap();
        let (state, _) = EditorState::start_create().start_edit(&store, &record.id);

        backend.fail_discounts.store(true, Ordering::SeqCst);
        let (next, outcome) = state.clone().commit_delete(&store);

        assert!(matches!(outcome, Err(EditError::Storage { .. })));
        assert_eq!(next, state);
        assert_eq!(store.load(), vec![record]);
        assert_eq!(
            store.load_read_set(),
            ["otro".to_string()].into_iter().collect::<ReadSet>()
        );
    }
}
