//! Download behavior: ZIP bundling, raw retrieval, and not-found handling.

mod common;

use std::sync::Arc;

use common::{bakery_draft, bakery_request, test_orchestrator, wait_for_terminal, FakeBackend};
use siteforge::generator::DownloadFormat;
use siteforge::ForgeError;

#[tokio::test]
async fn download_before_any_completion_is_not_found() {
    let backend = Arc::new(FakeBackend::returning(bakery_draft()));
    let (orchestrator, _tmp) = test_orchestrator(backend);

    let result = orchestrator
        .download("0000000000000000", DownloadFormat::Zip)
        .await;

    assert!(matches!(result, Err(ForgeError::NotFound(_))));
}

#[tokio::test]
async fn zip_download_bundles_every_persisted_file() {
    let backend = Arc::new(FakeBackend::returning(bakery_draft()));
    let (orchestrator, _tmp) = test_orchestrator(backend);

    let submitted = orchestrator.submit(bakery_request()).await.unwrap();
    wait_for_terminal(&orchestrator, &submitted.generation_id).await;

    let payload = orchestrator
        .download(&submitted.generation_id, DownloadFormat::Zip)
        .await
        .unwrap();

    assert_eq!(payload.media_type, "application/zip");
    assert_eq!(
        payload.file_name,
        format!("website_{}.zip", submitted.generation_id)
    );

    let file = std::fs::File::open(&payload.path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();

    assert_eq!(names, vec!["index.html", "meta.json", "styles.css"]);
}

#[tokio::test]
async fn raw_download_points_at_the_entry_page() {
    let backend = Arc::new(FakeBackend::returning(bakery_draft()));
    let (orchestrator, _tmp) = test_orchestrator(backend);

    let submitted = orchestrator.submit(bakery_request()).await.unwrap();
    wait_for_terminal(&orchestrator, &submitted.generation_id).await;

    let payload = orchestrator
        .download(&submitted.generation_id, DownloadFormat::Raw)
        .await
        .unwrap();

    assert_eq!(payload.media_type, "text/html");
    assert_eq!(payload.file_name, "index.html");

    let html = std::fs::read_to_string(&payload.path).unwrap();
    assert!(html.contains("viewport"));
}

#[tokio::test]
async fn repeated_zip_download_reuses_the_archive() {
    let backend = Arc::new(FakeBackend::returning(bakery_draft()));
    let (orchestrator, _tmp) = test_orchestrator(backend);

    let submitted = orchestrator.submit(bakery_request()).await.unwrap();
    wait_for_terminal(&orchestrator, &submitted.generation_id).await;

    let first = orchestrator
        .download(&submitted.generation_id, DownloadFormat::Zip)
        .await
        .unwrap();
    let first_mtime = std::fs::metadata(&first.path).unwrap().modified().unwrap();

    let second = orchestrator
        .download(&submitted.generation_id, DownloadFormat::Zip)
        .await
        .unwrap();
    let second_mtime = std::fs::metadata(&second.path).unwrap().modified().unwrap();

    assert_eq!(first.path, second.path);
    assert_eq!(first_mtime, second_mtime);
}
