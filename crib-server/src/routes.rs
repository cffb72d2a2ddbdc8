use axum::body::Bytes;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use crib_common::{Patch, Query, Snapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::state::{SessionBody, State};

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct Created {
    id: String,
}

#[derive(Serialize)]
struct Uploaded {
    url: crib_common::Url,
}

pub fn router(state: State) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/collections/:collection", post(add_document))
        .route(
            "/collections/:collection/:id",
            get(get_document).put(set_document).patch(update_document),
        )
        .route("/query", post(query))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/blobs/*path", get(get_blob).put(put_blob))
        .layer(Extension(state))
}

async fn root() -> &'static str {
    "crib backend"
}

async fn get_document(
    Extension(state): Extension<State>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Snapshot>> {
    let snapshot = state
        .document(&collection, &id)?
        .ok_or(StoreError::NotFound { collection, id })?;
    Ok(Json(snapshot))
}

async fn set_document(
    Extension(state): Extension<State>,
    Path((collection, id)): Path<(String, String)>,
    Json(fields): Json<Patch>,
) -> Result<impl IntoResponse> {
    state.set_document(&collection, &id, &fields)?;
    Ok(())
}

async fn update_document(
    Extension(state): Extension<State>,
    Path((collection, id)): Path<(String, String)>,
    Json(patch): Json<Patch>,
) -> Result<impl IntoResponse> {
    state.update_document(&collection, &id, &patch)?;
    Ok(())
}

async fn add_document(
    Extension(state): Extension<State>,
    Path(collection): Path<String>,
    Json(fields): Json<Patch>,
) -> Result<impl IntoResponse> {
    let id = state.add_document(&collection, &fields)?;
    Ok(Json(Created { id }))
}

async fn query(Extension(state): Extension<State>, Json(query): Json<Query>) -> Result<Json<Vec<Snapshot>>> {
    let hits = state.query(&query)?;
    debug!(collection = %query.collection, hits = hits.len(), "query");
    Ok(Json(hits))
}

async fn sign_up(
    Extension(state): Extension<State>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionBody>> {
    Ok(Json(state.sign_up(&credentials.email, &credentials.password)?))
}

async fn sign_in(
    Extension(state): Extension<State>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionBody>> {
    Ok(Json(state.sign_in(&credentials.email, &credentials.password)?))
}

async fn put_blob(
    Extension(state): Extension<State>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let url = state.put_blob(&path, &body)?;
    Ok(Json(Uploaded { url }))
}

async fn get_blob(Extension(state): Extension<State>, Path(path): Path<String>) -> Result<Vec<u8>> {
    Ok(state.blob(&path)?)
}
