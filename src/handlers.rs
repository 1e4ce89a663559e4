use crate::editor::{EditorState, Step};
use crate::errors::{AppError, EditError};
use crate::images;
use crate::models::{
    CalendarView, CommitRequest, CommitResponse, DeleteResponse, ENTITIES, EditorView, HomeView,
    NotificationEntry, OptionsResponse, ReadResponse, Weekday, WeekdayOption,
};
use crate::notify;
use crate::projections;
use crate::read_state::{has_any_unread, unread_count};
use crate::state::AppState;
use crate::storage::RecordStore;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use tracing::info;

pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        entities: ENTITIES.to_vec(),
        discount_presets: images::DISCOUNT_PRESETS.to_vec(),
        preset_images: images::preset_images().to_vec(),
        weekdays: Weekday::ALL
            .into_iter()
            .map(|day| WeekdayOption {
                code: day.code(),
                label: day.label(),
            })
            .collect(),
    })
}

pub async fn home(State(state): State<AppState>) -> Result<Json<HomeView>, AppError> {
    let view = with_store(&state, |store| {
        projections::home(&store.load(), &store.load_read_set())
    })
    .await?;
    Ok(Json(view))
}

pub async fn calendar(State(state): State<AppState>) -> Result<Json<CalendarView>, AppError> {
    let view = with_store(&state, |store| projections::calendar(&store.load())).await?;
    Ok(Json(view))
}

pub async fn notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<NotificationEntry>>, AppError> {
    let feed = with_store(&state, |store| {
        projections::notification_feed(&store.load(), &store.load_read_set())
    })
    .await?;
    Ok(Json(feed))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReadResponse>, AppError> {
    let _writer = state.editor.lock().await;
    let target = id.clone();
    let (changed, has_unread, unread_count) = with_store(&state, move |store| {
        let changed = store.mark_read(&target)?;
        let records = store.load();
        let read_set = store.load_read_set();
        Ok::<_, EditError>((
            changed,
            has_any_unread(&records, &read_set),
            unread_count(&records, &read_set),
        ))
    })
    .await??;
    if changed {
        info!(%id, unread_count, "discount marked read");
    }

    Ok(Json(ReadResponse {
        id,
        changed,
        has_unread,
        unread_count,
    }))
}

pub async fn editor(State(state): State<AppState>) -> Result<Json<EditorView>, AppError> {
    let current = state.editor.lock().await.clone();
    let view = with_store(&state, move |store| current.view(store)).await?;
    Ok(Json(view))
}

pub async fn editor_new(State(state): State<AppState>) -> Result<Json<EditorView>, AppError> {
    let (_, view) = transition(&state, |_, _| (EditorState::start_create(), Ok(()))).await?;
    Ok(Json(view))
}

pub async fn editor_clear(State(state): State<AppState>) -> Result<Json<EditorView>, AppError> {
    let (_, view) = transition(&state, |editor, _| (editor.clear(), Ok(()))).await?;
    Ok(Json(view))
}

pub async fn editor_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EditorView>, AppError> {
    let (_, view) = transition(&state, move |editor, store| editor.start_edit(store, &id)).await?;
    Ok(Json(view))
}

pub async fn editor_commit(
    State(state): State<AppState>,
    Json(payload): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, AppError> {
    let (outcome, view) = transition(&state, move |editor, store| {
        let fields = payload.into_fields(&editor.fields);
        editor.commit(store, fields)
    })
    .await?;

    if let Some(notification) = outcome.notification() {
        notify::dispatch(state.notifier.clone(), notification);
    }

    Ok(Json(CommitResponse {
        created: outcome.is_created(),
        record: outcome.into_record(),
        editor: view,
    }))
}

pub async fn editor_delete(State(state): State<AppState>) -> Result<Json<DeleteResponse>, AppError> {
    let (record, view) = transition(&state, |editor, store| editor.commit_delete(store)).await?;
    Ok(Json(DeleteResponse {
        record,
        editor: view,
    }))
}

pub async fn editor_preset(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<EditorView>, AppError> {
    let (_, view) = transition(&state, move |editor, _| editor.select_preset(index)).await?;
    Ok(Json(view))
}

pub async fn editor_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EditorView>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = images::ingest(content_type, body.to_vec()).await;
    let (uploaded, view) = transition(&state, move |editor, _| {
        (editor.apply_image(&result), Ok(result))
    })
    .await?;
    uploaded?;
    Ok(Json(view))
}

/// Runs one editor operation under the writer lock and stores the next state,
/// whatever the outcome. Store I/O happens on the blocking pool.
async fn transition<T: Send + 'static>(
    state: &AppState,
    step: impl FnOnce(EditorState, &RecordStore) -> Step<T> + Send + 'static,
) -> Result<(T, EditorView), AppError> {
    let mut editor = state.editor.lock().await;
    let current = std::mem::take(&mut *editor);
    let store = state.store.clone();
    let (next, outcome) = tokio::task::spawn_blocking(move || {
        let (next, outcome) = step(current, &store);
        let outcome = outcome.map(|value| (value, next.view(&store)));
        (next, outcome)
    })
    .await
    .map_err(|err| AppError::internal(format!("editor task failed: {err}")))?;
    *editor = next;
    outcome.map_err(AppError::from)
}

async fn with_store<T: Send + 'static>(
    state: &AppState,
    read: impl FnOnce(&RecordStore) -> T + Send + 'static,
) -> Result<T, AppError> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || read(&store))
        .await
        .map_err(|err| AppError::internal(format!("store task failed: {err}")))
}
