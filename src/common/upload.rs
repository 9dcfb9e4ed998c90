use anyhow::{Result, anyhow};
use axum::{body::Bytes, extract::multipart::Field};
use futures_util::StreamExt;
use tracing::error;

use crate::infrastructure::storage::s3::StorageService;

// S3 requires 5MB minimum per part; 6MB keeps us clear of the limit.
const MIN_PART_SIZE: usize = 6 * 1024 * 1024;

/// Streams one multipart field into object storage without buffering the
/// whole file. Aborts the multipart upload if the stream breaks, so no
/// orphaned parts accumulate on the bucket.
pub struct MediaUploader<'a> {
    storage: &'a StorageService,
    key: String,
    upload_id: String,
    parts: Vec<aws_sdk_s3::types::CompletedPart>,
    part_number: i32,
    buffer: Vec<u8>,
}

impl<'a> MediaUploader<'a> {
    pub async fn begin(storage: &'a StorageService, key: String, content_type: &str) -> Result<Self> {
        let upload_id = storage
            .create_multipart_upload(&key, content_type)
            .await
            .map_err(|e| anyhow!("Failed to initiate upload: {}", e))?;

        Ok(Self {
            storage,
            key,
            upload_id,
            parts: Vec::new(),
            part_number: 1,
            buffer: Vec::with_capacity(MIN_PART_SIZE),
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.buffer.extend_from_slice(&chunk);

        if self.buffer.len() >= MIN_PART_SIZE {
            self.flush_part().await?;
        }

        Ok(())
    }

    async fn flush_part(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let body = Bytes::from(std::mem::take(&mut self.buffer));
        self.buffer.reserve(MIN_PART_SIZE);

        let part = self
            .storage
            .upload_part(&self.key, &self.upload_id, self.part_number, body)
            .await
            .map_err(|e| anyhow!("Failed to upload part {}: {}", self.part_number, e))?;

        self.parts.push(part);
        self.part_number += 1;

        Ok(())
    }

    pub async fn finish(mut self) -> Result<String> {
        if !self.buffer.is_empty() {
            self.flush_part().await?;
        }

        self.storage
            .complete_multipart_upload(&self.key, &self.upload_id, self.parts)
            .await
            .map_err(|e| anyhow!("Failed to complete upload: {}", e))?;

        Ok(self.key)
    }

    pub async fn abort(&self) -> Result<()> {
        self.storage
            .abort_multipart_upload(&self.key, &self.upload_id)
            .await
            .map_err(|e| anyhow!("Failed to abort upload: {}", e))
    }
}

/// Figure out the media content type of an uploaded field, falling back to a
/// guess from the filename when the client didn't send one.
fn media_content_type(field: &Field<'_>) -> Result<String> {
    let content_type = match field.content_type() {
        Some(ct) => ct.to_string(),
        None => field
            .file_name()
            .map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
    };

    if !content_type.starts_with("audio/") && !content_type.starts_with("video/") {
        return Err(anyhow!(
            "Invalid content type {}: only audio/* and video/* allowed",
            content_type
        ));
    }

    Ok(content_type)
}

pub async fn stream_to_storage(
    storage: &StorageService,
    mut field: Field<'_>,
    key: String,
) -> Result<String> {
    let content_type = media_content_type(&field)?;

    let mut uploader = MediaUploader::begin(storage, key, &content_type).await?;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Upload stream error: {}", e);
                uploader.abort().await?;
                return Err(anyhow!("Upload stream interrupted"));
            }
        };

        if let Err(e) = uploader.write_chunk(chunk).await {
            error!("Upload error: {}", e);
            uploader.abort().await?;
            return Err(e);
        }
    }

    uploader.finish().await
}
