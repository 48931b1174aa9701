use std::sync::Arc;

use tracing::debug;

use super::status_ok;
use crate::{
    handler::{ApiRequest, Context, HandlerResult},
    state::AppState,
    stores::{Note, NoteInput},
    Error,
};

fn note_id(request: &ApiRequest) -> Result<&str, Error> {
    request.path_parameter("id").ok_or(Error::MissingNoteId)
}

pub async fn create(state: Arc<AppState>, request: ApiRequest, context: Context) -> HandlerResult {
    let user_id = context.identity()?;
    let input: NoteInput = request.json_body()?;
    input.validate()?;

    let note = Note::new(user_id, input);
    let body = serde_json::to_string(&note)?;
    debug!(user_id, note_id = %note.note_id, "note created");
    state.notes.write().await.insert(note);
    Ok(body)
}

pub async fn get(state: Arc<AppState>, request: ApiRequest, context: Context) -> HandlerResult {
    let user_id = context.identity()?;
    let note_id = note_id(&request)?;

    let notes = state.notes.read().await;
    let note = notes.get(user_id, note_id)?;
    Ok(serde_json::to_string(note)?)
}

pub async fn list(state: Arc<AppState>, _request: ApiRequest, context: Context) -> HandlerResult {
    let user_id = context.identity()?;

    let notes = state.notes.read().await;
    Ok(serde_json::to_string(&notes.list(user_id))?)
}

pub async fn update(state: Arc<AppState>, request: ApiRequest, context: Context) -> HandlerResult {
    let user_id = context.identity()?;
    let note_id = note_id(&request)?;
    let input: NoteInput = request.json_body()?;
    input.validate()?;

    state.notes.write().await.update(user_id, note_id, input)?;
    debug!(user_id, note_id, "note updated");
    Ok(status_ok()?)
}

pub async fn delete(state: Arc<AppState>, request: ApiRequest, context: Context) -> HandlerResult {
    let user_id = context.identity()?;
    let note_id = note_id(&request)?;

    if state.notes.write().await.remove(user_id, note_id).is_some() {
        debug!(user_id, note_id, "note deleted");
    }
    Ok(status_ok()?)
}
