use std::collections::HashMap;

use super::*;
use crate::locate::LocatorKind;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_are_valid() {
    let cfg = HatmeConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.default_face_url, DEFAULT_FACE_URL);
    assert_eq!(cfg.blend.source_opacity, 0.9);
    assert!(cfg.hop_timeout().is_none());
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: HatmeConfig = serde_json::from_str(
        r#"{"detector":{"kind":"cloud_vision","endpoint":"https://vision.example/detect"},"hop_timeout_ms":2500}"#,
    )
    .unwrap();
    assert_eq!(cfg.detector.kind, LocatorKind::CloudVision);
    assert_eq!(cfg.hop_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(cfg.blend, BlendOpts::default());
}

#[test]
fn env_overrides_fields() {
    let mut cfg = HatmeConfig::default();
    cfg.apply_env_with(env(&[
        (ENV_DETECTOR_KIND, "azure"),
        (ENV_DETECTOR_ENDPOINT, "https://face.example/detect"),
        (ENV_DETECTOR_KEY, "secret"),
        (ENV_MANIPULATE_ENDPOINT, "manipulate:80"),
        (ENV_HOP_TIMEOUT_MS, "1000"),
    ]))
    .unwrap();
    assert_eq!(cfg.detector.kind, LocatorKind::RectApi);
    assert_eq!(cfg.detector.endpoint, "https://face.example/detect");
    assert_eq!(cfg.detector.api_key.as_deref(), Some("secret"));
    assert_eq!(cfg.manipulate_endpoint.as_deref(), Some("manipulate:80"));
    assert_eq!(cfg.hop_timeout_ms, Some(1000));
}

#[test]
fn blank_env_values_are_ignored() {
    let mut cfg = HatmeConfig::default();
    cfg.apply_env_with(env(&[(ENV_MANIPULATE_ENDPOINT, "  ")])).unwrap();
    assert!(cfg.manipulate_endpoint.is_none());
}

#[test]
fn bad_env_values_are_rejected() {
    let mut cfg = HatmeConfig::default();
    assert!(cfg.apply_env_with(env(&[(ENV_HOP_TIMEOUT_MS, "soon")])).is_err());
    assert!(cfg.apply_env_with(env(&[(ENV_DETECTOR_KIND, "crystal_ball")])).is_err());
}

#[test]
fn validate_rejects_out_of_range_opacity() {
    let mut cfg = HatmeConfig::default();
    cfg.blend.source_opacity = 1.5;
    assert!(matches!(cfg.validate(), Err(HatError::Validation(_))));

    let mut cfg = HatmeConfig::default();
    cfg.hop_timeout_ms = Some(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn endpoint_selects_remote_compositor() {
    let mut cfg = HatmeConfig::default();
    assert!(cfg.build_compositor(reqwest::Client::new()).is_ok());

    cfg.manipulate_endpoint = Some("   ".to_string());
    assert!(cfg.build_compositor(reqwest::Client::new()).is_err());
}
