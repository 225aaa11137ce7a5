//! 文档二进制存储
//!
//! 数据库只保存定位符 `{tender|bids}/{unix_ts}_{文件名}`，文件内容经由
//! [`BlobStore`] 分块写入和分块读出。

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use actix_web::web::Bytes;
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, LocalBoxStream, StreamExt};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::AppConfig;
use crate::errors::{ETenderError, Result};
use crate::models::documents::entities::DocumentKind;
use crate::utils::{SNIFF_LEN, validate_magic_bytes};

const READ_CHUNK_SIZE: usize = 64 * 1024;
const MAX_NAME_LEN: usize = 120;

/// 上传方提供的分块流
pub type UploadStream<'a> = LocalBoxStream<'a, Result<Bytes>>;
/// 下载时返回的分块流
pub type BlobStream = BoxStream<'static, std::io::Result<Bytes>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub locator: String,
    /// 清理后的文件名，作为文档名落库
    pub file_name: String,
    pub size: usize,
}

#[async_trait(?Send)]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        kind: DocumentKind,
        original_name: &str,
        chunks: UploadStream<'_>,
    ) -> Result<StoredBlob>;

    async fn open(&self, locator: &str) -> Result<BlobStream>;

    /// 删除已写入的文件，文件不存在时视为成功
    async fn remove(&self, locator: &str) -> Result<()>;
}

/// 本地文件系统实现
pub struct LocalBlobStore {
    root: PathBuf,
    max_size: usize,
    allowed_types: Vec<String>,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, max_size: usize, allowed_types: Vec<String>) -> Self {
        Self {
            root: root.into(),
            max_size,
            allowed_types: allowed_types
                .into_iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config() -> Self {
        let upload = &AppConfig::get().upload;
        Self::new(&upload.dir, upload.max_size, upload.allowed_types.clone())
    }

    fn extension_of(name: &str) -> String {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }

    /// 定位符只能是根目录下的相对路径
    fn resolve(&self, locator: &str) -> Result<PathBuf> {
        let rel = Path::new(locator);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if locator.is_empty() || !safe {
            return Err(ETenderError::not_found("Stored file is missing"));
        }
        Ok(self.root.join(rel))
    }

    /// 以独占方式创建目标文件，同一秒同名时加序号
    async fn create_target(&self, kind: DocumentKind, name: &str) -> Result<(File, String)> {
        let dir = self.root.join(kind.dir_name());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ETenderError::file_operation(format!("创建上传目录失败: {e}")))?;

        let ts = chrono::Utc::now().timestamp();
        for attempt in 0..100 {
            let stored = if attempt == 0 {
                format!("{ts}_{name}")
            } else {
                format!("{ts}_{attempt}_{name}")
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&stored))
                .await
            {
                Ok(file) => return Ok((file, format!("{}/{stored}", kind.dir_name()))),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ETenderError::file_operation(format!("文件创建失败: {e}")));
                }
            }
        }
        Err(ETenderError::file_operation("文件创建失败: too many name collisions"))
    }

    async fn write_chunks(
        &self,
        file: &mut File,
        extension: &str,
        mut chunks: UploadStream<'_>,
    ) -> Result<usize> {
        let mut total = 0usize;
        // 分块可能比签名还短，先攒够文件头再判定
        let mut head = Vec::with_capacity(SNIFF_LEN);
        let mut checked = false;

        while let Some(chunk) = chunks.next().await {
            let data = chunk?;
            total += data.len();
            if total > self.max_size {
                return Err(ETenderError::file_too_large(format!(
                    "File size exceeds the limit of {} bytes",
                    self.max_size
                )));
            }
            if checked {
                write_all(file, &data).await?;
                continue;
            }
            head.extend_from_slice(&data);
            if head.len() >= SNIFF_LEN {
                ensure_magic(&head, extension)?;
                write_all(file, &head).await?;
                head.clear();
                checked = true;
            }
        }

        if total == 0 {
            return Err(ETenderError::file_rejected("Uploaded file is empty"));
        }
        if !checked {
            ensure_magic(&head, extension)?;
            write_all(file, &head).await?;
        }
        file.flush()
            .await
            .map_err(|e| ETenderError::file_operation(format!("文件写入失败: {e}")))?;
        Ok(total)
    }
}

fn ensure_magic(head: &[u8], extension: &str) -> Result<()> {
    if validate_magic_bytes(head, extension) {
        Ok(())
    } else {
        Err(ETenderError::file_rejected(
            "File content does not match its extension",
        ))
    }
}

async fn write_all(file: &mut File, data: &[u8]) -> Result<()> {
    file.write_all(data)
        .await
        .map_err(|e| ETenderError::file_operation(format!("文件写入失败: {e}")))
}

/// 去掉路径部分，只保留安全字符
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');

    let name = if trimmed.len() > MAX_NAME_LEN {
        // 截断时保留扩展名
        let ext = LocalBlobStore::extension_of(trimmed);
        let keep = MAX_NAME_LEN.saturating_sub(ext.len());
        format!("{}{}", &trimmed[..keep], ext)
    } else {
        trimmed.to_string()
    };

    if name.is_empty() {
        "file".to_string()
    } else {
        name
    }
}

#[async_trait(?Send)]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        kind: DocumentKind,
        original_name: &str,
        chunks: UploadStream<'_>,
    ) -> Result<StoredBlob> {
        let file_name = sanitize_file_name(original_name);
        let extension = Self::extension_of(&file_name);
        if extension.is_empty() || !self.allowed_types.contains(&extension) {
            return Err(ETenderError::file_rejected(format!(
                "File type not allowed: {}",
                if extension.is_empty() {
                    "(none)"
                } else {
                    extension.as_str()
                }
            )));
        }

        let (mut file, locator) = self.create_target(kind, &file_name).await?;
        match self.write_chunks(&mut file, &extension, chunks).await {
            Ok(size) => {
                tracing::info!("Stored {} document at {} ({} bytes)", kind, locator, size);
                Ok(StoredBlob {
                    locator,
                    file_name,
                    size,
                })
            }
            Err(e) => {
                drop(file);
                if let Ok(path) = self.resolve(&locator) {
                    let _ = fs::remove_file(path).await;
                }
                Err(e)
            }
        }
    }

    async fn open(&self, locator: &str) -> Result<BlobStream> {
        let path = self.resolve(locator)?;
        let file = File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ETenderError::not_found("Stored file is missing")
            } else {
                ETenderError::file_operation(format!("文件打开失败: {e}"))
            }
        })?;

        let chunks = stream::try_unfold(file, |mut file| async move {
            let mut buf = vec![0u8; READ_CHUNK_SIZE];
            let n = file.read(&mut buf).await?;
            if n == 0 {
                return Ok::<_, std::io::Error>(None);
            }
            buf.truncate(n);
            Ok(Some((Bytes::from(buf), file)))
        });

        Ok(chunks.boxed())
    }

    async fn remove(&self, locator: &str) -> Result<()> {
        let path = self.resolve(locator)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ETenderError::file_operation(format!("文件删除失败: {e}"))),
        }
    }
}

pub fn create_blob_store() -> Arc<dyn BlobStore> {
    Arc::new(LocalBlobStore::from_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    fn temp_store(max_size: usize) -> (LocalBlobStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("etender-blobs-{}", uuid::Uuid::new_v4()));
        let store = LocalBlobStore::new(
            &root,
            max_size,
            vec![".pdf".into(), ".txt".into(), ".PNG".into()],
        );
        (store, root)
    }

    fn chunks(parts: &[&'static str]) -> UploadStream<'static> {
        let parts: Vec<Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        stream::iter(parts).boxed_local()
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\BOQ final.pdf"), "BOQ_final.pdf");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name(".hidden.txt"), "hidden.txt");
        let long = format!("{}.pdf", "a".repeat(300));
        let cut = sanitize_file_name(&long);
        assert_eq!(cut.len(), MAX_NAME_LEN);
        assert!(cut.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_put_then_open_streams_content() {
        let (store, root) = temp_store(1024);
        let stored = store
            .put(
                DocumentKind::Tender,
                "spec sheet.pdf",
                chunks(&["%PDF-1.7\n", "body", "%%EOF"]),
            )
            .await
            .unwrap();
        assert!(stored.locator.starts_with("tender/"));
        assert!(stored.locator.ends_with("_spec_sheet.pdf"));
        assert_eq!(stored.size, 18);

        let body: Vec<Bytes> = store
            .open(&stored.locator)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(body.concat(), b"%PDF-1.7\nbody%%EOF".to_vec());

        store.remove(&stored.locator).await.unwrap();
        assert!(matches!(
            store.open(&stored.locator).await,
            Err(ETenderError::NotFound(_))
        ));
        store.remove(&stored.locator).await.unwrap();

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_same_name_does_not_overwrite() {
        let (store, root) = temp_store(1024);
        let a = store
            .put(DocumentKind::Bid, "quote.txt", chunks(&["first"]))
            .await
            .unwrap();
        let b = store
            .put(DocumentKind::Bid, "quote.txt", chunks(&["second"]))
            .await
            .unwrap();
        assert_ne!(a.locator, b.locator);
        assert!(a.locator.starts_with("bids/"));
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_signature_split_across_small_chunks() {
        let (store, root) = temp_store(1024);
        let stored = store
            .put(
                DocumentKind::Bid,
                "quote.pdf",
                chunks(&["%", "P", "DF", "-1.4\n", "body"]),
            )
            .await
            .unwrap();
        assert_eq!(stored.size, 13);

        let body: Vec<Bytes> = store
            .open(&stored.locator)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(body.concat(), b"%PDF-1.4\nbody".to_vec());

        // 整个文件比签名缓冲还短
        let tiny = store
            .put(DocumentKind::Bid, "note.txt", chunks(&["o", "k"]))
            .await
            .unwrap();
        assert_eq!(tiny.size, 2);

        let spoofed = store
            .put(DocumentKind::Bid, "fake.pdf", chunks(&["%", "P", "NG-data"]))
            .await;
        assert!(matches!(spoofed, Err(ETenderError::FileRejected(_))));
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_rejections_leave_no_file() {
        let (store, root) = temp_store(8);

        let wrong_ext = store
            .put(DocumentKind::Tender, "run.exe", chunks(&["MZ"]))
            .await;
        assert!(matches!(wrong_ext, Err(ETenderError::FileRejected(_))));

        let spoofed = store
            .put(DocumentKind::Tender, "fake.pdf", chunks(&["hello"]))
            .await;
        assert!(matches!(spoofed, Err(ETenderError::FileRejected(_))));

        let too_big = store
            .put(DocumentKind::Tender, "big.txt", chunks(&["12345", "67890"]))
            .await;
        assert!(matches!(too_big, Err(ETenderError::FileTooLarge(_))));

        let empty = store
            .put(DocumentKind::Tender, "empty.txt", chunks(&[]))
            .await;
        assert!(matches!(empty, Err(ETenderError::FileRejected(_))));

        let leftovers = std::fs::read_dir(root.join("tender"))
            .map(|d| d.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_open_missing_and_traversal() {
        let (store, root) = temp_store(1024);
        assert!(matches!(
            store.open("tender/nope.pdf").await,
            Err(ETenderError::NotFound(_))
        ));
        assert!(matches!(
            store.open("../secret").await,
            Err(ETenderError::NotFound(_))
        ));
        assert!(matches!(
            store.open("/etc/passwd").await,
            Err(ETenderError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(root);
    }
}
