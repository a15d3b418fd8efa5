use crate::models::{Person, PersonUpdate};
use crate::services::people;
use crate::web::error::{ApiError, ApiResult};
use crate::web::extractors::ApiTokenAuth;
use crate::web::state::AppState;
use crate::web::validation::{parse_discord_id, parse_person_id, parse_person_update};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PersonList {
    pub items: Vec<Person>,
    pub count: usize,
}

/// GET /people/
pub async fn list_people(
    _auth: ApiTokenAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PersonList>> {
    let items = people::list_people(&state.db)?;
    let count = items.len();
    Ok(Json(PersonList { items, count }))
}

/// GET /people/:person_id
pub async fn get_person(
    _auth: ApiTokenAuth,
    State(state): State<Arc<AppState>>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<Person>> {
    let id = parse_person_id(&person_id)?;
    let person = people::get_person(&state.db, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(person))
}

/// GET /people/by-discord/:discord_id
pub async fn get_person_by_discord_id(
    _auth: ApiTokenAuth,
    State(state): State<Arc<AppState>>,
    Path(discord_id): Path<String>,
) -> ApiResult<Json<Person>> {
    let discord_id = parse_discord_id(&discord_id)?;
    let person =
        people::get_person_by_discord_id(&state.db, discord_id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(person))
}

/// PUT /people/:person_id
pub async fn update_person(
    ApiTokenAuth(caller): ApiTokenAuth,
    State(state): State<Arc<AppState>>,
    Path(person_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Person>> {
    let id = parse_person_id(&person_id)?;
    let payload = parse_person_update(&body)?;

    let update = PersonUpdate::resolve(payload.display_name, payload.discord_id);
    let person = people::update_person(&state.db, id, update)?.ok_or(ApiError::NotFound)?;

    tracing::info!(
        person_id = %person.id,
        user = %caller.username,
        "Person updated via API"
    );
    Ok(Json(person))
}
