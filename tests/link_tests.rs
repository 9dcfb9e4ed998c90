// Link classification and share-link rewriting. Classification happens
// before any job exists, so an unrecognized link must be identifiable
// without touching the network.

use scribe_backend::infrastructure::download::DownloadError;
use scribe_backend::infrastructure::download::link::{classify, to_direct_download};
use scribe_backend::modules::transcription::model::SourceKind;

#[test]
fn drive_share_links_classify_as_google_drive() {
    assert_eq!(
        classify("https://drive.google.com/file/d/ABC123/view?usp=sharing"),
        Some(SourceKind::GoogleDrive)
    );
    assert_eq!(
        classify("https://drive.google.com/open?id=XYZ789"),
        Some(SourceKind::GoogleDrive)
    );
}

#[test]
fn disk_links_classify_as_yandex_disk() {
    assert_eq!(
        classify("https://disk.yandex.ru/d/AbCdEf123"),
        Some(SourceKind::YandexDisk)
    );
    assert_eq!(
        classify("https://yadi.sk/d/AbCdEf123"),
        Some(SourceKind::YandexDisk)
    );
}

#[test]
fn unknown_links_are_rejected() {
    assert_eq!(classify("https://www.youtube.com/watch?v=abc"), None);
    assert_eq!(classify("not a url at all"), None);
    assert_eq!(classify("ftp://drive.google.com/file/d/ABC/view"), None);
}

#[test]
fn share_link_rewrites_to_direct_download_form() {
    let direct =
        to_direct_download("https://drive.google.com/file/d/ABC123/view?usp=sharing").unwrap();

    assert!(direct.contains("ABC123"));
    assert!(direct.contains("export=download"));
}

#[test]
fn query_form_share_link_is_also_rewritten() {
    let direct = to_direct_download("https://drive.google.com/open?id=XYZ789").unwrap();

    assert!(direct.contains("id=XYZ789"));
}

#[test]
fn link_without_a_file_id_is_unsupported() {
    let err = to_direct_download("https://drive.google.com/drive/my-drive").unwrap_err();

    assert!(matches!(err, DownloadError::UnsupportedSource(_)));
}
