//! `POST /ocr`: multipart image upload.

use axum::Json;
use axum::extract::{Multipart, State};
use bytes::Bytes;
use glyph_client::StagedUpload;

use crate::error::WebError;
use crate::pipeline::{ProcessingFailure, ProcessingResult, Submission};
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

struct ImagePart {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Read the first part named `image`, skipping any others.
async fn read_image_part(multipart: &mut Multipart) -> Result<Option<ImagePart>, WebError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        return Ok(Some(ImagePart { file_name, content_type, data }));
    }
    Ok(None)
}

pub async fn ocr(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<ProcessingResult>, WebError> {
    let part = read_image_part(&mut multipart)
        .await?
        .ok_or_else(|| ProcessingFailure::validation("no image uploaded; expected multipart field `image`"))?;

    tracing::debug!(file = %part.file_name, size = part.data.len(), "received upload");

    let declared_size = part.data.len() as u64;
    let input = StagedUpload::stage(&state.upload_dir, part.data).await?;
    let submission =
        Submission { input, label: part.file_name, declared_type: part.content_type, declared_size };

    let result = state.pipeline.process(submission).await?;
    Ok(Json(result))
}
