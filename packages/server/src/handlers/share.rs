use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use common::registry::ShareRegistry;
use common::storage::BlobStore;
use common::{Category, FileEntry, ShareId, ShareRecord, guess_category};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::share::{FileMetaInput, ResolveResponse, ResolvedFile, UploadResponse};
use crate::state::AppState;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(256 * 1024 * 1024) // whole batch
}

/// One file taken out of the multipart body.
pub struct UploadFile {
    pub original_name: String,
    pub data: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Share",
    operation_id = "uploadShare",
    summary = "Upload meshes and mint a share link",
    description = "Accepts one or more `files` multipart parts plus an optional `meta` part \
        (JSON array of `{originalName, category}`, aligned by filename). All files are stored \
        and a new immutable share record is created; on any storage failure the whole batch \
        is rolled back.",
    request_body(content_type = "multipart/form-data", description = "Mesh files with optional metadata"),
    responses(
        (status = 200, description = "Share created", body = UploadResponse),
        (status = 400, description = "No files, empty file or malformed meta (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Storage failure, batch rolled back (STORAGE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_share(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files: Vec<UploadFile> = Vec::new();
    let mut meta_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("files") => {
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        AppError::Validation("file part must have a filename".into())
                    })?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
                files.push(UploadFile {
                    original_name,
                    data: data.to_vec(),
                });
            }
            Some("meta") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read meta: {e}")))?;
                meta_raw = Some(text);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let share_id = process_upload(
        &*state.blob_store,
        &*state.registry,
        files,
        meta_raw.as_deref(),
    )
    .await?;

    Ok(Json(UploadResponse {
        share_id: share_id.to_hex(),
    }))
}

/// The upload pipeline: validate the batch, store every blob, mint the record.
///
/// All-or-nothing at request granularity: a failed write (or a failed record
/// create) deletes every blob this request already stored before the error is
/// returned, so no orphaned blobs outlive a failed call.
pub async fn process_upload(
    blob_store: &dyn BlobStore,
    registry: &dyn ShareRegistry,
    files: Vec<UploadFile>,
    meta_raw: Option<&str>,
) -> Result<ShareId, AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("no files provided".into()));
    }
    for file in &files {
        if file.data.is_empty() {
            return Err(AppError::Validation(format!(
                "file '{}' is empty",
                file.original_name
            )));
        }
    }

    let meta = parse_meta(meta_raw)?;

    let mut entries: Vec<FileEntry> = Vec::with_capacity(files.len());
    for file in &files {
        match blob_store.put(&file.data, &file.original_name).await {
            Ok(storage_name) => entries.push(FileEntry {
                storage_name,
                original_name: file.original_name.clone(),
                category: category_for(&file.original_name, &meta),
            }),
            Err(e) => {
                rollback(blob_store, &entries).await;
                return Err(e.into());
            }
        }
    }

    let share_id = ShareId::generate();
    let record = ShareRecord::new(share_id, entries)
        .ok_or_else(|| AppError::Internal("empty record after validation".into()))?;

    if let Err(e) = registry.create(&record).await {
        rollback(blob_store, &record.files).await;
        return Err(e.into());
    }

    tracing::info!(share_id = %share_id, files = record.files.len(), "share created");
    Ok(share_id)
}

fn parse_meta(raw: Option<&str>) -> Result<Vec<FileMetaInput>, AppError> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text)
            .map_err(|e| AppError::Validation(format!("unparsable meta: {e}"))),
    }
}

/// Explicit metadata wins; the filename heuristic is only a default.
fn category_for(original_name: &str, meta: &[FileMetaInput]) -> Option<Category> {
    meta.iter()
        .find(|m| m.original_name == original_name)
        .and_then(|m| m.category)
        .or_else(|| guess_category(original_name))
}

/// Best-effort deletion of blobs written by a failed request.
async fn rollback(blob_store: &dyn BlobStore, entries: &[FileEntry]) {
    for entry in entries {
        if let Err(e) = blob_store.delete(&entry.storage_name).await {
            tracing::warn!(
                "rollback failed to delete blob {}: {e}",
                entry.storage_name
            );
        }
    }
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Share",
    operation_id = "resolveShare",
    summary = "Resolve a share link",
    description = "Returns the shared files in upload order, each with a publicly fetchable \
        URL and its display metadata. Share records are immutable, so repeated calls return \
        identical content.",
    params(("id" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Resolved file list", body = ResolveResponse),
        (status = 400, description = "Malformed share token (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown share token (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn resolve_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolveResponse>, AppError> {
    let share_id = ShareId::from_hex(&id)
        .map_err(|e| AppError::Validation(format!("invalid share id: {e}")))?;

    let record = state
        .registry
        .get(&share_id)
        .await?
        .ok_or_else(|| AppError::NotFound("share not found".into()))?;

    let files = record
        .files
        .iter()
        .map(|entry| ResolvedFile {
            url: state.blob_store.url_for(&entry.storage_name),
            original_name: entry.original_name.clone(),
            category: entry.category,
        })
        .collect();

    Ok(Json(ResolveResponse { files }))
}
