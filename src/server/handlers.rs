//! HTTP request handlers.

use crate::cover::{self, PlaceholderOptions, decode_image_payload};
use crate::error::{AppError, Result};
use crate::library::form::{BookForm, Field, ValidationErrors};
use crate::library::{Book, CoverInput, month};
use crate::server::AppState;
use crate::server::views;
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::Value;

const IMAGE_READ_ERROR: &str = "Could not read the image, please choose it again";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn image_response(content_type: &str, data: Vec<u8>) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(data))
        .unwrap_or_else(|_| Response::default())
}

// ============================================================================
// WEB PAGES
// ============================================================================

/// Gallery query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    month: Option<String>,
}

impl MonthParams {
    fn month(&self) -> Option<String> {
        let raw = self.month.as_deref().map(str::trim).filter(|m| !m.is_empty())?;
        Some(month::normalize_month(raw).unwrap_or_else(|| raw.to_string()))
    }
}

/// Gallery of the selected (or most recent) month.
pub async fn gallery(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Html<String> {
    let months = state.months();
    let selected = params.month().or_else(|| months.first().cloned());

    let books = match &selected {
        Some(month) => state.books_by_month(month),
        None => state.all_books(),
    };

    Html(views::gallery_page(
        state.title(),
        &months,
        selected.as_deref(),
        &books,
    ))
}

/// Empty add-book form.
pub async fn new_book_form(State(state): State<AppState>) -> Html<String> {
    Html(views::add_form_page(
        state.title(),
        &BookForm::default(),
        &ValidationErrors::default(),
        today(),
    ))
}

/// Add-book form submission.
pub async fn submit_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut form = BookForm::default();
    let mut cover = CoverInput::None;
    let mut upload_errors = ValidationErrors::default();
    let mut seen_image = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // The stream cannot recover once an image part overflowed.
            Err(e) if seen_image => {
                tracing::warn!(error = %e, "Upload stream failed after an image field");
                upload_errors.add(Field::CoverImage, IMAGE_READ_ERROR);
                break;
            }
            Err(e) => return Err(AppError::BadRequest(format!("Invalid form data: {}", e))),
        };
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "coverImage" | "authorPhoto" => {
                seen_image = true;
                let content_type = field.content_type().map(str::to_string);
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        tracing::warn!(field = %name, error = %e, "Error processing image");
                        upload_errors.add(Field::CoverImage, IMAGE_READ_ERROR);
                        break;
                    }
                };
                if bytes.is_empty() {
                    continue;
                }

                if name == "coverImage" {
                    cover = CoverInput::Upload {
                        bytes,
                        content_type,
                    };
                } else {
                    form.author_photo = Some(cover::bytes_to_image_payload(
                        &bytes,
                        content_type.as_deref(),
                    ));
                }
            }
            _ => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) if seen_image => {
                        tracing::warn!(field = %name, error = %e, "Upload stream failed after an image field");
                        upload_errors.add(Field::CoverImage, IMAGE_READ_ERROR);
                        break;
                    }
                    Err(e) => return Err(AppError::BadRequest(format!("Invalid form field: {}", e))),
                };
                match name.as_str() {
                    "title" => form.title = value,
                    "author" => form.author = value,
                    "monthYear" => form.month_year = value,
                    "rating" => form.rating = value,
                    "synopsis" => form.synopsis = value,
                    "publicationYear" => form.publication_year = value,
                    _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
                }
            }
        }
    }

    let today = today();
    let draft = match form.validate(today) {
        Ok(draft) if upload_errors.is_empty() => draft,
        result => {
            let mut errors = result.err().unwrap_or_default();
            for (field, msg) in upload_errors.iter() {
                errors.add(field, msg);
            }
            let page = views::add_form_page(state.title(), &form, &errors, today);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    let book = state.add_book(draft, cover).await?;
    tracing::info!(id = %book.id, "Book added from web form");

    Ok(Redirect::to("/").into_response())
}

/// Book detail page; unknown ids go back to the gallery.
pub async fn book_detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(book) = state.get_book(&id) else {
        return Redirect::to("/").into_response();
    };

    let position = state.neighbours(&id);
    Html(views::detail_page(state.title(), &book, position.as_ref())).into_response()
}

/// Stored cover as a raw image.
pub async fn book_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response<Body>> {
    let book = state
        .get_book(&id)
        .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", id)))?;

    let (mime, data) = decode_image_payload(&book.cover_image)
        .ok_or_else(|| AppError::NotFound(format!("Cover not available: {}", id)))?;

    Ok(image_response(&mime, data))
}

// ============================================================================
// JSON API
// ============================================================================

/// Books, optionally restricted to one month.
pub async fn api_books(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Json<Vec<Book>> {
    let books = match params.month() {
        Some(month) => state.books_by_month(&month),
        None => state.all_books(),
    };
    Json(books)
}

/// Reading months, newest first.
pub async fn api_months(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.months())
}

/// One book.
pub async fn api_book(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Book>> {
    state
        .get_book(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", id)))
}

/// New book request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBookRequest {
    title: String,
    author: String,
    month_year: String,
    rating: Option<Value>,
    synopsis: String,
    publication_year: Option<Value>,
    cover_image: Option<String>,
    author_photo: Option<String>,
}

impl NewBookRequest {
    fn into_parts(self) -> (BookForm, CoverInput) {
        let form = BookForm {
            title: self.title,
            author: self.author,
            month_year: self.month_year,
            rating: value_text(self.rating).unwrap_or_else(|| BookForm::default().rating),
            synopsis: self.synopsis,
            publication_year: value_text(self.publication_year).unwrap_or_default(),
            author_photo: self.author_photo,
        };

        let cover = self
            .cover_image
            .filter(|c| !c.trim().is_empty())
            .map(CoverInput::Payload)
            .unwrap_or_default();

        (form, cover)
    }
}

/// Raw text of a scalar so validation, not the extractor, judges it.
fn value_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Add a book from JSON.
pub async fn api_add_book(
    State(state): State<AppState>,
    Json(request): Json<NewBookRequest>,
) -> Result<(StatusCode, Json<Book>)> {
    let (form, cover) = request.into_parts();
    let draft = form.validate(today()).map_err(AppError::Validation)?;
    let book = state.add_book(draft, cover).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Placeholder query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceholderParams {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    seed: Option<u64>,
    width: Option<u32>,
}

/// Placeholder cover as PNG.
pub async fn api_placeholder(
    State(state): State<AppState>,
    Query(params): Query<PlaceholderParams>,
) -> Result<Response<Body>> {
    let options = match params.width {
        Some(width) => PlaceholderOptions {
            width: width.clamp(60, 1200),
        },
        None => state.placeholder_options(),
    };

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let img = cover::render_placeholder(&params.title, &params.author, &options, &mut rng);
    let png = cover::placeholder::encode_png(&img)?;

    Ok(image_response("image/png", png))
}
