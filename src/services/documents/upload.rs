//! multipart 单文件接收
//!
//! 只接受一个名为 `file` 的字段，内容分块写入文档存储。

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::{StreamExt, TryStreamExt};

use crate::errors::ETenderError;
use crate::models::{ApiResponse, ErrorCode, documents::entities::DocumentKind};
use crate::services::error_response;
use crate::storage::blob_store::{BlobStore, StoredBlob};

const FILE_FIELD: &str = "file";

fn upload_error(err: &ETenderError) -> HttpResponse {
    let code = match err {
        ETenderError::FileTooLarge(_) => ErrorCode::FileSizeExceeded,
        ETenderError::FileRejected(_) => ErrorCode::FileTypeNotAllowed,
        _ => ErrorCode::FileUploadFailed,
    };
    error_response(err, code)
}

/// 把请求中的文件写入文档存储，失败时直接给出响应
pub(crate) async fn receive_single_file(
    blob_store: &dyn BlobStore,
    kind: DocumentKind,
    mut payload: Multipart,
) -> Result<StoredBlob, HttpResponse> {
    let mut stored: Option<StoredBlob> = None;

    loop {
        let field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                if let Some(blob) = &stored {
                    let _ = blob_store.remove(&blob.locator).await;
                }
                return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileUploadFailed,
                    format!("Malformed multipart payload: {e}"),
                )));
            }
        };

        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        if name != FILE_FIELD {
            continue;
        }

        if let Some(blob) = &stored {
            let _ = blob_store.remove(&blob.locator).await;
            return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            )));
        }

        let original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let chunks = field
            .map_err(|e| ETenderError::validation(format!("Upload interrupted: {e}")))
            .boxed_local();

        match blob_store.put(kind, &original_name, chunks).await {
            Ok(blob) => stored = Some(blob),
            Err(e) => return Err(upload_error(&e)),
        }
    }

    stored.ok_or_else(|| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        ))
    })
}
