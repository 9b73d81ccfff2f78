use std::io::Write;

use services::{BundleError, Clock, SessionError, SessionLoopService, SessionState, load_bundle};
use visor_core::model::{EngineSettings, Response, VariantPolicy};
use visor_core::time::fixed_now;

const CORES: &str = r#"{
    "udl_cores": [
        {"core_id": "photosynthesis", "variants": [
            {"type": "true_false", "content": {"prompt_text": "Audio variant"},
             "interaction": {"answer": true}, "dua": {"variant_index": 2}},
            {"type": "true_false", "content": {"prompt_text": "Text variant"},
             "interaction": {"answer": true}, "dua": {"variant_index": 1}}
        ]},
        {"core_id": "respiration", "variants": [
            {"type": "hotspot", "content": {"prompt_text": "Tap the lungs"}}
        ]}
    ],
    "delivery": {"variant_policy": "first_per_core"},
    "resource_metadata": {"unit": 4}
}"#;

fn write_bundle(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn service() -> SessionLoopService {
    SessionLoopService::new(Clock::fixed(fixed_now()), EngineSettings::default()).with_seed(42)
}

#[tokio::test]
async fn load_bundle_reads_file_from_disk() {
    let file = write_bundle(CORES);
    let bundle = load_bundle(file.path()).await.unwrap();
    assert_eq!(bundle.udl_cores.len(), 2);
    assert_eq!(bundle.policy(), &VariantPolicy::FirstPerCore);
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_bundle(&dir.path().join("absent.json")).await.unwrap_err();
    assert!(matches!(err, BundleError::Io { .. }));
}

#[tokio::test]
async fn load_path_starts_session_with_resolved_variants() {
    let file = write_bundle(CORES);
    let mut svc = service();
    let session = svc.load_path(file.path()).await.unwrap();

    assert_eq!(session.exercises().len(), 2);
    assert_eq!(
        session.exercises()[0].content().prompt_text(),
        "Text variant"
    );
    assert_eq!(session.meta().variant_policy, VariantPolicy::FirstPerCore);
    assert_eq!(session.meta().resource_metadata["unit"], 4);
    assert_eq!(session.started_at(), fixed_now());
}

#[tokio::test]
async fn ungradeable_exercise_can_be_skipped() {
    let file = write_bundle(CORES);
    let mut svc = service();
    svc.load_path(file.path()).await.unwrap();
    svc.begin_grading(Response::choice("true")).unwrap();
    svc.advance().unwrap();

    let view = svc.current_view().unwrap();
    assert!(!view.is_gradeable());
    assert_eq!(view.type_name(), "hotspot");

    let err = svc.begin_grading(Response::no_choice()).unwrap_err();
    assert!(matches!(err, SessionError::Ungradeable { index: 1, .. }));

    let done = svc.advance().unwrap();
    let report = done.report.unwrap();
    assert_eq!(report.correct(), 1);
    assert_eq!(report.ungraded(), 1);
}

#[tokio::test]
async fn failed_load_from_disk_keeps_live_session() {
    let good = write_bundle(CORES);
    let broken = write_bundle(r#"{"udl_cores": [{"core_id": "x", "variants": []}]}"#);

    let mut svc = service();
    let id = svc.load_path(good.path()).await.unwrap().id();

    let err = svc.load_path(broken.path()).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Bundle(BundleError::NoValidExercises)
    ));
    assert_eq!(svc.session().unwrap().id(), id);
    assert_eq!(svc.state(), SessionState::InProgress);
}

#[tokio::test]
async fn malformed_exercise_is_ungradeable_not_fatal() {
    let file = write_bundle(
        r#"{"exercises": [
            {"type": "true_false", "content": {"prompt_text": "Ice floats"},
             "interaction": {"answer": true}},
            {"type": 7, "content": null, "scaffolding": null}
        ]}"#,
    );
    let mut svc = service();
    let session = svc.load_path(file.path()).await.unwrap();

    assert_eq!(session.exercises().len(), 2);
    let ungradeable = session
        .exercises()
        .iter()
        .filter(|exercise| !exercise.interaction().is_gradeable())
        .count();
    assert_eq!(ungradeable, 1);

    svc.begin_grading(Response::choice("true")).unwrap();
    svc.advance().unwrap();
    assert!(matches!(
        svc.begin_grading(Response::no_choice()),
        Err(SessionError::Ungradeable { index: 1, .. })
    ));
    assert!(svc.advance().unwrap().is_complete);
}
