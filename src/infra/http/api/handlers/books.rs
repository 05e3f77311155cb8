//! Book handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bookstore_api_types::{CreateBookRequest, UpdateBookRequest};
use serde::Deserialize;

use super::{book_to_api, books_to_api};
use crate::domain::entities::BookPatch;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;
use crate::infra::http::api::validation::validate_create;

#[derive(Debug, Deserialize)]
pub struct BookLookupQuery {
    pub name: Option<String>,
    pub author: Option<String>,
}

pub async fn get_book(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let book = state.books.find_by_id(id).await?;
    Ok(Json(book_to_api(book)))
}

pub async fn find_book(
    State(state): State<ApiState>,
    query: Result<Query<BookLookupQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let name = query
        .name
        .ok_or_else(|| ApiError::invalid_parameter("missing query parameter `name`"))?;
    let author = query
        .author
        .ok_or_else(|| ApiError::invalid_parameter("missing query parameter `author`"))?;

    let book = state.books.find_by_author_and_name(&name, &author).await?;
    Ok(Json(book_to_api(book)))
}

pub async fn list_category_books(
    State(state): State<ApiState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let books = state.books.find_by_category(&category).await?;
    Ok(Json(books_to_api(books)))
}

pub async fn create_book(
    State(state): State<ApiState>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let valid = validate_create(payload).map_err(ApiError::bad_request)?;

    let book = state.books.save(valid.book, &valid.category_name).await?;
    Ok((StatusCode::CREATED, Json(book_to_api(book))))
}

pub async fn update_book(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;

    let patch = BookPatch {
        name: payload.name,
        author: payload.author,
    };
    let book = state
        .books
        .update_by_id(id, patch, payload.category_name.as_deref())
        .await?;
    Ok(Json(book_to_api(book)))
}

pub async fn delete_book(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    state.books.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
