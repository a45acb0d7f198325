//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! URLs are downloaded into a `TempDir` so cleanup happens automatically when
//! `ResolvedInput` is dropped, even on panic. A file claiming to be DOCX is
//! validated against the ZIP magic bytes (`PK\x03\x04`) before the parser
//! touches it, so callers get a meaningful error instead of a zip-reader
//! failure deep inside extraction.

use crate::error::KeywordifyError;
use crate::pipeline::docx;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Magic bytes of a ZIP local-file header, shared by every DOCX.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// The resolved input — either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the document was downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the document regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    /// Stem used to derive output artifact names.
    pub fn stem(&self) -> String {
        self.path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, KeywordifyError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Read the document text from a resolved input.
///
/// DOCX files (ZIP magic) go through the DOCX extractor; anything else is
/// treated as UTF-8 plain text. A file with a `.docx` extension that is not
/// actually a ZIP archive is rejected with its leading bytes in the error.
pub fn load_text(path: &Path) -> Result<String, KeywordifyError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => KeywordifyError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => KeywordifyError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    if bytes.len() >= 4 && bytes[..4] == ZIP_MAGIC {
        return docx::extract_text(&bytes);
    }

    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("docx")) {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(KeywordifyError::NotADocx {
            path: path.to_path_buf(),
            magic,
        });
    }

    String::from_utf8(bytes).map_err(|_| {
        KeywordifyError::InvalidInput(format!(
            "'{}' is neither a DOCX file nor UTF-8 text",
            path.display()
        ))
    })
}

/// Resolve a local file path, validating existence and readability.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, KeywordifyError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(KeywordifyError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(KeywordifyError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(KeywordifyError::FileNotFound { path });
        }
    }

    debug!("Resolved local document: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, KeywordifyError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| KeywordifyError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            KeywordifyError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            KeywordifyError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(KeywordifyError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| KeywordifyError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| KeywordifyError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| KeywordifyError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.docx".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.docx"));
        assert!(is_url("http://example.com/doc.docx"));
        assert!(!is_url("/tmp/doc.docx"));
        assert!(!is_url("doc.docx"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename("https://example.com/a/report.docx"), "report.docx");
        assert_eq!(extract_filename("https://example.com/"), "downloaded.docx");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = resolve_local("/definitely/not/here.docx").unwrap_err();
        assert!(matches!(err, KeywordifyError::FileNotFound { .. }));
    }

    #[test]
    fn plain_text_file_loads_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Alpha beta.\n\nGamma.").unwrap();
        assert_eq!(load_text(&path).unwrap(), "Alpha beta.\n\nGamma.");
    }

    #[test]
    fn docx_extension_without_zip_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"this is not a zip archive").unwrap();

        let err = load_text(&path).unwrap_err();
        assert!(matches!(err, KeywordifyError::NotADocx { .. }));
    }

    #[test]
    fn stem_falls_back_for_odd_paths() {
        let input = ResolvedInput::Local(PathBuf::from("/tmp/report.docx"));
        assert_eq!(input.stem(), "report");
    }
}
