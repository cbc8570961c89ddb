use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::StreamExt;
use serde_json::json;

use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::model::ImageRef;
use crate::utils::uploads::{FileUpload, FileValidator, UPLOAD_FOLDER, UploadService, format_size};

const FILE_FIELDS: [&str; 2] = ["file", "image"];

/// Buffer one chunk, refusing to grow past `max_size` bytes.
fn append_chunk(data: &mut Vec<u8>, chunk: &[u8], max_size: usize) -> Result<(), CustomError> {
    if data.len() + chunk.len() > max_size {
        return Err(CustomError::ValidationError(format!(
            "File too large. Maximum size: {}",
            format_size(max_size)
        )));
    }
    data.extend_from_slice(chunk);
    Ok(())
}

/// First non-empty file field of the form. Stops reading once a field
/// exceeds `max_size`.
async fn extract_file(
    mut payload: Multipart,
    max_size: usize,
) -> Result<Option<FileUpload>, CustomError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            CustomError::BadRequestError(format!("Error reading multipart field: {}", e))
        })?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        let field_name = content_disposition.get_name().unwrap_or("");
        if !FILE_FIELDS.contains(&field_name) {
            continue;
        }

        let file_name = content_disposition
            .get_filename()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                CustomError::BadRequestError(format!("Error reading file chunk: {}", e))
            })?;
            append_chunk(&mut data, &chunk, max_size)?;
        }

        if !data.is_empty() {
            return Ok(Some(FileUpload::new(file_name, data, content_type)));
        }
    }

    Ok(None)
}

/// Upload one image to the hosted store
/// POST /upload
pub async fn upload_image(auth: AuthUser, payload: Multipart) -> Result<HttpResponse, CustomError> {
    let validator = FileValidator::images();
    let file = extract_file(payload, validator.max_file_size)
        .await?
        .ok_or_else(|| CustomError::BadRequestError("No file provided".to_string()))?;

    validator
        .validate(&file)
        .map_err(CustomError::ValidationError)?;

    let upload_service = UploadService::new().map_err(|e| {
        log::error!("Upload service unavailable: {}", e);
        CustomError::InternalServerError("Upload service is not configured".to_string())
    })?;

    let uploaded = upload_service
        .upload_image(file, UPLOAD_FOLDER)
        .await
        .map_err(|e| {
            log::error!("Image upload for user {} failed: {}", auth.id(), e);
            CustomError::UpstreamError("Failed to upload image".to_string())
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "File uploaded successfully",
        "data": ImageRef {
            id: uploaded.public_id,
            url: uploaded.secure_url,
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_buffered_up_to_the_limit() {
        let mut data = Vec::new();
        append_chunk(&mut data, &[1; 600], 1024).unwrap();
        append_chunk(&mut data, &[2; 424], 1024).unwrap();
        assert_eq!(data.len(), 1024);

        let err = append_chunk(&mut data, &[3], 1024).unwrap_err();
        assert!(matches!(err, CustomError::ValidationError(_)));
        assert_eq!(err.to_string(), "Validation Error: File too large. Maximum size: 1.00 KB");
        assert_eq!(data.len(), 1024);
    }
}
