//! End-to-end upload flow against an unreachable backend.

use ocora_engine::{
    EventBus, FallbackMode, GatewayConfig, PatientStore, RemoteGateway, ScanUpload, Screen,
    ScreenController, SessionEvent, View,
};

// Port 9 (discard) refuses connections immediately; the short timeout covers
// environments that drop the packets instead.
fn offline_config(mode: FallbackMode) -> GatewayConfig {
    let mut config = GatewayConfig::new("http://127.0.0.1:9");
    config.mode = mode;
    config.request_timeout_ms = 300;
    config.extraction_fallback_delay_ms = 0;
    config.policy_fallback_delay_ms = 0;
    config.simulation_fallback_delay_ms = 0;
    config
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn lenient_offline_upload_populates_demo_record() {
    init_logging();
    let bus = EventBus::default();
    let gateway = RemoteGateway::new(offline_config(FallbackMode::Lenient), bus.clone()).unwrap();
    let store = PatientStore::new(bus.clone());
    let mut screens = ScreenController::new(bus);

    screens.begin_processing();
    assert_eq!(screens.resolve(store.has_data()), View::Processing);

    let upload = ScanUpload::new("BraTS19_2013_10_flair.nii", vec![0u8; 16]);
    let record = store.complete_upload(&upload, &gateway).await.unwrap();

    // demo extraction fixture carries 7 features and a 7-dim vector
    assert_eq!(record.radiomics.len(), 7);
    assert_eq!(record.radiomics[0].name, "Sphericity");
    assert_eq!(record.feature_vector.as_ref().unwrap().len(), 7);
    assert!(record.phenotype.is_some());
    assert!(gateway.is_degraded());

    // the policy fixture replaced the built-in candidates
    let snapshot = store.snapshot();
    assert!(snapshot.has_data);
    assert_eq!(snapshot.candidates.len(), 4);
    assert_eq!(snapshot.selected.unwrap().name, "Radiotherapy");
    assert!(snapshot.last_error.is_none());

    screens.finish_processing(true);
    assert_eq!(
        screens.resolve(store.has_data()),
        View::Screen(Screen::Analysis)
    );
}

#[tokio::test]
async fn strict_offline_upload_fails_and_leaves_store_untouched() {
    init_logging();
    let bus = EventBus::default();
    let gateway = RemoteGateway::new(offline_config(FallbackMode::Strict), bus.clone()).unwrap();
    let store = PatientStore::new(bus.clone());
    let mut screens = ScreenController::new(bus);

    screens.begin_processing();
    let upload = ScanUpload::new("scan.nii", vec![0u8; 16]);
    let err = store.complete_upload(&upload, &gateway).await.unwrap_err();
    assert!(err.is_transient());

    let snapshot = store.snapshot();
    assert!(!snapshot.has_data);
    assert_eq!(snapshot.record.id, "PT-2024-883");
    assert_eq!(snapshot.candidates.len(), 3);
    assert!(snapshot.last_error.is_some());

    // failed upload keeps the user on the upload screen
    screens.finish_processing(false);
    assert_eq!(
        screens.resolve(store.has_data()),
        View::Screen(Screen::Upload)
    );
}

#[tokio::test]
async fn upload_flow_publishes_expected_events() {
    init_logging();
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();
    let gateway = RemoteGateway::new(offline_config(FallbackMode::Lenient), bus.clone()).unwrap();
    let store = PatientStore::new(bus);

    let upload = ScanUpload::new("scan.nii", vec![0u8; 16]);
    store.complete_upload(&upload, &gateway).await.unwrap();

    let mut saw_started = false;
    let mut saw_degraded = false;
    let mut saw_completed = false;
    let mut saw_policy = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::UploadStarted { .. } => saw_started = true,
            SessionEvent::GatewayDegraded { .. } => saw_degraded = true,
            SessionEvent::UploadCompleted { feature_count, .. } => {
                saw_completed = true;
                assert_eq!(feature_count, 7);
            }
            SessionEvent::PolicyReplaced { candidate_count, .. } => {
                saw_policy = true;
                assert_eq!(candidate_count, 4);
            }
            _ => {}
        }
    }
    assert!(saw_started && saw_degraded && saw_completed && saw_policy);
}

#[tokio::test]
async fn refresh_policy_is_a_noop_without_feature_vector() {
    init_logging();
    let bus = EventBus::default();
    let gateway = RemoteGateway::new(offline_config(FallbackMode::Strict), bus.clone()).unwrap();
    let store = PatientStore::new(bus);

    // no upload happened, so even a strict unreachable gateway is never hit
    store.refresh_policy(&gateway).await.unwrap();
    assert_eq!(store.snapshot().candidates.len(), 3);
}

#[tokio::test]
async fn consecutive_uploads_converge_on_latest_state() {
    init_logging();
    let bus = EventBus::default();
    let gateway = RemoteGateway::new(offline_config(FallbackMode::Lenient), bus.clone()).unwrap();
    let store = PatientStore::new(bus);

    let first = ScanUpload::new("first_scan.nii", vec![0u8; 8]);
    let second = ScanUpload::new("second_scan.nii", vec![0u8; 8]);
    let (a, b) = tokio::join!(
        store.complete_upload(&first, &gateway),
        store.complete_upload(&second, &gateway)
    );
    a.unwrap();
    b.unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.has_data);
    assert_eq!(snapshot.record.radiomics.len(), 7);
    assert_eq!(snapshot.candidates.len(), 4);
    assert_eq!(snapshot.selected.unwrap().name, "Radiotherapy");
}
