use crate::images;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// The first entry is the form default.
pub const ENTITIES: [&str; 9] = [
    "BROU RECOMPENSA",
    "ITAU CREDITO",
    "ITAU VOLAR",
    "SANTANDER DEBITO",
    "SANTANDER CREDITO",
    "BBVA CREDITO",
    "OCA",
    "OCA BLUE",
    "SCOTIABANK",
];

pub const DEFAULT_REPEAT: &str = "weekly";

/// Ids the user has already seen in the notification feed.
pub type ReadSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "Lu")]
    Monday,
    #[serde(rename = "Ma")]
    Tuesday,
    #[serde(rename = "Mi")]
    Wednesday,
    #[serde(rename = "Ju")]
    Thursday,
    #[serde(rename = "Vi")]
    Friday,
    #[serde(rename = "Sa")]
    Saturday,
    #[serde(rename = "Do")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Weekday::Monday => "Lu",
            Weekday::Tuesday => "Ma",
            Weekday::Wednesday => "Mi",
            Weekday::Thursday => "Ju",
            Weekday::Friday => "Vi",
            Weekday::Saturday => "Sa",
            Weekday::Sunday => "Do",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Lunes",
            Weekday::Tuesday => "Martes",
            Weekday::Wednesday => "Miércoles",
            Weekday::Thursday => "Jueves",
            Weekday::Friday => "Viernes",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.code() == code.trim())
    }
}

/// A single logged discount offer, as persisted in the discounts document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_value: String,
    #[serde(default = "default_entity")]
    pub entity: String,
    #[serde(default = "default_repeat")]
    pub repeat: String,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: BTreeSet<Weekday>,
    #[serde(default = "images::default_image")]
    pub image: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl DiscountRecord {
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.store_name.trim().is_empty()
            && !self.discount_value.trim().is_empty()
            && !self.days.is_empty()
    }
}

/// Transient field buffer of the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_value: String,
    #[serde(default = "default_entity")]
    pub entity: String,
    #[serde(default = "default_repeat")]
    pub repeat: String,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: BTreeSet<Weekday>,
    #[serde(default = "images::default_image")]
    pub image: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            store_name: String::new(),
            description: String::new(),
            discount_value: String::new(),
            entity: default_entity(),
            repeat: default_repeat(),
            days: BTreeSet::new(),
            image: images::default_image(),
        }
    }
}

impl From<&DiscountRecord> for FormFields {
    fn from(record: &DiscountRecord) -> Self {
        Self {
            store_name: record.store_name.clone(),
            description: record.description.clone(),
            discount_value: record.discount_value.clone(),
            entity: record.entity.clone(),
            repeat: record.repeat.clone(),
            days: record.days.clone(),
            image: record.image.clone(),
        }
    }
}

/// Demo session document. Nothing in the core authenticates against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub email: String,
    pub logged_in: bool,
    pub at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreChip {
    pub store_name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEntry {
    #[serde(flatten)]
    pub record: DiscountRecord,
    pub unread: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: Weekday,
    pub records: Vec<DiscountRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub days: Vec<CalendarDay>,
}

impl CalendarView {
    pub fn bucket(&self, day: Weekday) -> &[DiscountRecord] {
        self.days
            .iter()
            .find(|bucket| bucket.day == day)
            .map(|bucket| bucket.records.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub stores: Vec<StoreChip>,
    pub feed: Vec<DiscountRecord>,
    pub has_unread: bool,
    pub unread_count: usize,
}

/// Selectable chip in the editor's record row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditChip {
    pub id: String,
    pub store_name: String,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct WeekdayOption {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub entities: Vec<&'static str>,
    pub discount_presets: Vec<&'static str>,
    pub preset_images: Vec<String>,
    pub weekdays: Vec<WeekdayOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub mode: &'static str,
    pub target: Option<String>,
    pub fields: FormFields,
    pub records: Vec<EditChip>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub record: DiscountRecord,
    pub created: bool,
    pub editor: EditorView,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub record: DiscountRecord,
    pub editor: EditorView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    pub id: String,
    pub changed: bool,
    pub has_unread: bool,
    pub unread_count: usize,
}

/// `image` falls back to the editor buffer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_value: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub repeat: Option<String>,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: BTreeSet<Weekday>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CommitRequest {
    pub fn into_fields(self, buffer: &FormFields) -> FormFields {
        FormFields {
            store_name: self.store_name,
            description: self.description,
            discount_value: self.discount_value,
            entity: self.entity.unwrap_or_else(default_entity),
            repeat: self.repeat.unwrap_or_else(default_repeat),
            days: self.days,
            image: self.image.unwrap_or_else(|| buffer.image.clone()),
        }
    }
}

pub fn default_entity() -> String {
    ENTITIES[0].to_string()
}

pub fn default_repeat() -> String {
    DEFAULT_REPEAT.to_string()
}

/// Reads a list of weekday codes, skipping codes it does not know and
/// treating `null` as no days.
fn deserialize_days<'de, D>(deserializer: D) -> Result<BTreeSet<Weekday>, D::Error>
where
    D: Deserializer<'de>,
{
    let codes = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(codes
        .unwrap_or_default()
        .iter()
        .filter_map(|code| Weekday::from_code(code))
        .collect())
}
