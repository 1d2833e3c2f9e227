//! End-to-end session workflows
//!
//! Drives a [`Session`] through intake, processing and download with the
//! scripted remover, checking what a user would see at each step.

use clearcut::{
    services::PresenterEvent, ClearCutError, CommandRemover, DirectoryTarget, DroppedFile, ProcessingState,
    ProgressEvent, RecordingPresenter, RunOutcome, ScriptedRemover, Session, StatusMessage, View,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::sync::Arc;
use tempfile::TempDir;

/// Encode a small gradient as a real JPEG
fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut image = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let intensity = ((x + y) % 100) as u8;
        *pixel = image::Rgb([intensity, 128, 255 - intensity]);
    }

    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .unwrap();
    buffer
}

fn photo(name: &str) -> DroppedFile {
    DroppedFile::new(name, create_test_jpeg(16, 16))
}

#[tokio::test]
async fn test_cold_start_reports_phases_in_order() {
    let presenter = Arc::new(RecordingPresenter::new());
    let mut session = Session::with_presenter(
        Arc::new(ScriptedRemover::cold_start("/models/medium", 3)),
        presenter.clone(),
    );

    assert!(session.select_file(photo("photo.jpg")).is_some());
    let outcome = session.process().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Done(_)));

    // repeated fetch chunks collapse into one status change
    assert_eq!(
        presenter.statuses(),
        vec![
            Some(StatusMessage::DownloadingModel),
            Some(StatusMessage::ProcessingImage),
            None,
        ]
    );
    assert_eq!(
        presenter.events().last(),
        Some(&PresenterEvent::Focus {
            view: View::Processed
        })
    );
}

#[tokio::test]
async fn test_photo_scenario_downloads_clearcut_png() {
    let temp = TempDir::new().unwrap();
    let remover = ScriptedRemover::new().with_progress(vec![
        ProgressEvent::new("fetch:medium", 1, 10),
        ProgressEvent::new("compute:inference", 1, 1),
    ]);
    let presenter = Arc::new(RecordingPresenter::new());
    let mut session = Session::with_presenter(Arc::new(remover), presenter.clone());

    session.select_file(photo("photo.jpg")).unwrap();
    session.start_processing().unwrap();

    assert!(session.pump().await.is_none());
    assert_eq!(session.state().status(), Some(StatusMessage::DownloadingModel));
    // a finished inference clears the status while still running
    assert!(session.pump().await.is_none());
    assert_eq!(session.state().status(), None);
    assert!(session.state().is_busy());

    let outcome = session.pump().await;
    assert!(matches!(outcome, Some(RunOutcome::Done(_))));
    assert!(matches!(session.state().processing(), ProcessingState::Done { .. }));
    assert!(session.state().result().is_some());
    assert_eq!(
        presenter.statuses(),
        vec![Some(StatusMessage::DownloadingModel), None]
    );

    let path = session.download(&DirectoryTarget::new(temp.path())).unwrap();
    assert_eq!(path.file_name().unwrap(), "photo_clearcut.png");
}

#[tokio::test]
async fn test_warm_start_skips_download_status() {
    let remover = ScriptedRemover::new().with_progress(vec![
        ProgressEvent::new("compute:inference", 0, 1),
        ProgressEvent::new("compute:inference", 1, 1),
    ]);
    let presenter = Arc::new(RecordingPresenter::new());
    let mut session = Session::with_presenter(Arc::new(remover), presenter.clone());

    session.select_file(photo("photo.jpg"));
    session.process().await.unwrap();

    assert_eq!(
        presenter.statuses(),
        vec![Some(StatusMessage::ProcessingImage), None]
    );
}

#[tokio::test]
async fn test_unrecognized_progress_keys_are_ignored() {
    let remover = ScriptedRemover::new().with_progress(vec![
        ProgressEvent::new("compute:decode", 0, 1),
        ProgressEvent::new("compute:mask", 1, 1),
    ]);
    let presenter = Arc::new(RecordingPresenter::new());
    let mut session = Session::with_presenter(Arc::new(remover), presenter.clone());

    session.select_file(photo("photo.jpg"));
    session.start_processing().unwrap();
    assert!(session.pump().await.is_none());
    assert!(session.pump().await.is_none());
    assert_eq!(session.state().status(), None);
    assert!(session.state().is_busy());

    session.wait_for_completion().await;
    assert!(presenter.statuses().is_empty());
}

#[tokio::test]
async fn test_download_uses_original_name() {
    let temp = TempDir::new().unwrap();
    let mut session = Session::new(Arc::new(ScriptedRemover::new().returning(vec![0x89, b'P'])));

    session.select_file(photo("photo.jpg"));
    session.process().await.unwrap();

    let path = session.download(&DirectoryTarget::new(temp.path())).unwrap();
    assert_eq!(path, temp.path().join("photo_clearcut.png"));
    assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P']);
}

#[tokio::test]
async fn test_download_without_result_fails() {
    let temp = TempDir::new().unwrap();
    let mut session = Session::new(Arc::new(ScriptedRemover::new()));
    session.select_file(photo("photo.jpg"));

    let err = session.download(&DirectoryTarget::new(temp.path())).unwrap_err();
    assert!(matches!(err, ClearCutError::InvalidState(_)));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failure_returns_to_original_view() {
    let mut session = Session::new(Arc::new(
        ScriptedRemover::cold_start("/models/medium", 2).failing("model fetch aborted"),
    ));
    session.select_file(photo("photo.jpg"));

    let outcome = session.process().await.unwrap();
    let RunOutcome::Failed(failure) = outcome else {
        panic!("expected failure");
    };
    assert!(failure.reason.contains("model fetch aborted"));

    let model = session.view_model();
    assert_eq!(model.active_view, View::Original);
    assert!(!model.original.busy_overlay);
    assert!(model.original.status_text.is_none());
    assert!(!model.processed.selectable);
    assert!(!model.download_enabled);
    // the same file can be retried
    assert!(model.trigger_enabled);
    assert!(model.failure.unwrap().contains("model fetch aborted"));
}

#[tokio::test]
async fn test_retry_after_failure_runs_again() {
    let remover = ScriptedRemover::new().failing("busy GPU");
    let history = remover.clone();
    let mut session = Session::new(Arc::new(remover));
    session.select_file(photo("photo.jpg"));

    assert!(matches!(session.process().await.unwrap(), RunOutcome::Failed(_)));
    assert!(matches!(session.process().await.unwrap(), RunOutcome::Failed(_)));
    assert_eq!(history.call_history().len(), 2);
    assert!(matches!(session.state().processing(), ProcessingState::Failed { .. }));
    assert_eq!(session.handles().live_count(), 1);
}

#[tokio::test]
async fn test_reprocessing_replaces_result() {
    let mut session = Session::new(Arc::new(ScriptedRemover::new()));
    session.select_file(photo("photo.jpg"));

    let RunOutcome::Done(first) = session.process().await.unwrap() else {
        panic!("expected success");
    };
    let RunOutcome::Done(second) = session.process().await.unwrap() else {
        panic!("expected success");
    };

    assert_ne!(first, second);
    assert!(!session.handles().is_live(&first));
    assert!(session.handles().is_live(&second));
    assert_eq!(session.handles().live_count(), 2);
}

#[tokio::test]
async fn test_switching_views() {
    let mut session = Session::new(Arc::new(ScriptedRemover::new()));
    session.select_file(photo("photo.jpg"));
    assert!(!session.show_view(View::Processed));

    session.process().await.unwrap();
    assert_eq!(session.state().active_view(), View::Processed);
    assert!(session.show_view(View::Original));
    assert_eq!(session.view_model().active_view, View::Original);
    assert!(session.show_view(View::Processed));
}

#[tokio::test]
async fn test_non_image_and_multi_file_drops_ignored() {
    let mut session = Session::new(Arc::new(ScriptedRemover::new()));

    assert!(session
        .select_file(DroppedFile::new("notes.txt", b"hello".to_vec()))
        .is_none());
    assert!(session
        .select_drop(vec![photo("a.jpg"), photo("b.jpg")])
        .is_none());
    assert!(session.select_drop(Vec::new()).is_none());

    assert!(session.state().selected().is_none());
    assert_eq!(session.handles().created_count(), 0);
    assert!(!session.view_model().trigger_enabled);
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_cold_start_reports_download_before_processing() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    let remover = CommandRemover::new(
        "sh",
        vec![
            "-c".to_string(),
            "echo 'Model not cached. Auto-downloading default model...'; \
             echo 'Model downloaded successfully!'; \
             echo 'Processing photo.png'; \
             cp \"$0\" \"$1\""
                .to_string(),
            "{input}".to_string(),
            "{output}".to_string(),
        ],
    );
    let presenter = Arc::new(RecordingPresenter::new());
    let mut session = Session::with_presenter(Arc::new(remover), presenter.clone());

    session.select_file(DroppedFile::new("photo.png", png)).unwrap();
    let outcome = session.process().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Done(_)));

    assert_eq!(
        presenter.statuses(),
        vec![
            Some(StatusMessage::DownloadingModel),
            Some(StatusMessage::ProcessingImage),
            None,
        ]
    );
}
