use url::Url;

use super::DownloadError;
use crate::modules::transcription::model::SourceKind;

/// Decide which provider a pasted link belongs to. `None` means no download
/// strategy recognizes the link, and the caller rejects it before any job is
/// created or any network I/O happens.
pub fn classify(input: &str) -> Option<SourceKind> {
    let url = Url::parse(input).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;

    if host == "drive.google.com" || host.ends_with(".drive.google.com") {
        return Some(SourceKind::GoogleDrive);
    }
    if host == "disk.yandex.ru" || host == "disk.yandex.com" || host == "yadi.sk" {
        return Some(SourceKind::YandexDisk);
    }

    None
}

/// Rewrite a Drive share link into the direct-download form. Share links
/// carry the file id either in the path (`/file/d/<id>/view`) or in the
/// query (`open?id=<id>`, `uc?id=<id>`).
pub fn to_direct_download(share_url: &str) -> Result<String, DownloadError> {
    let url = Url::parse(share_url)
        .map_err(|_| DownloadError::UnsupportedSource(share_url.to_string()))?;

    let file_id = path_file_id(&url)
        .or_else(|| query_file_id(&url))
        .ok_or_else(|| DownloadError::UnsupportedSource(share_url.to_string()))?;

    Ok(format!(
        "https://drive.google.com/uc?export=download&id={file_id}"
    ))
}

fn path_file_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "d" {
            return segments
                .next()
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }
    }
    None
}

fn query_file_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}
