use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "hatme_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn entry(description: &str, url: &str, approve: bool) -> HatEntry {
    HatEntry {
        description: description.to_string(),
        url: url.to_string(),
        approve,
    }
}

fn catalog(dir: &Path) -> ManifestCatalog {
    ManifestCatalog::new(
        vec![
            entry("tophat", "tophat.png", true),
            entry("Beanie", "beanie.png", true),
            entry("fez", "fez.png", false),
        ],
        dir,
        reqwest::Client::new(),
    )
}

#[test]
fn style_request_normalizes() {
    assert_eq!(StyleRequest::from_raw(None), StyleRequest::Any);
    assert_eq!(StyleRequest::from_raw(Some("  ")), StyleRequest::Any);
    assert_eq!(
        StyleRequest::from_raw(Some(" TopHat ")),
        StyleRequest::Named("tophat".to_string())
    );
}

#[test]
fn candidates_skip_unapproved_and_match_case_insensitively() {
    let c = catalog(Path::new("."));
    assert_eq!(c.candidates(&StyleRequest::Any).len(), 2);
    assert_eq!(
        c.candidates(&StyleRequest::from_raw(Some("beanie")))[0].url,
        "beanie.png"
    );
    assert!(c.candidates(&StyleRequest::from_raw(Some("fez"))).is_empty());
}

#[tokio::test]
async fn unknown_style_is_invalid_style() {
    let c = catalog(Path::new("."));
    let err = c
        .lookup(&StyleRequest::from_raw(Some("sombrero")))
        .await
        .unwrap_err();
    assert!(matches!(err, HatError::InvalidStyle(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn empty_catalog_is_a_server_side_failure() {
    let c = ManifestCatalog::new(vec![], ".", reqwest::Client::new());
    let err = c.lookup(&StyleRequest::Any).await.unwrap_err();
    assert!(matches!(err, HatError::BackendUnavailable(_)));
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn missing_hat_file_matches_empty_catalog() {
    let dir = temp_dir("catalog_missing_file");
    std::fs::create_dir_all(&dir).unwrap();

    let c = catalog(&dir);
    let err = c
        .lookup(&StyleRequest::from_raw(Some("tophat")))
        .await
        .unwrap_err();
    assert!(matches!(err, HatError::BackendUnavailable(_)));
    let empty = ManifestCatalog::new(vec![], ".", reqwest::Client::new())
        .lookup(&StyleRequest::Any)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), empty.kind());
    assert_eq!(err.status_code(), empty.status_code());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn lookup_reads_local_files() {
    let dir = temp_dir("catalog_lookup");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tophat.png"), [7u8, 7, 7]).unwrap();

    let c = catalog(&dir);
    let hat = c.lookup(&StyleRequest::from_raw(Some("TOPHAT"))).await.unwrap();
    assert_eq!(hat.image.as_bytes(), &[7, 7, 7]);
    assert_eq!(hat.style.as_deref(), Some("tophat"));
    assert_eq!(hat.source_url.as_deref(), Some("tophat.png"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn list_returns_only_approved() {
    let c = catalog(Path::new("."));
    let listed = c.list().await.unwrap();
    let names: Vec<_> = listed.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, ["tophat", "Beanie"]);
}

#[test]
fn manifest_file_round_trip() {
    let dir = temp_dir("catalog_manifest");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("hats.json");
    std::fs::write(
        &path,
        r#"[{"description":"tophat","url":"tophat.png","approve":true},{"description":"cap","url":"cap.png"}]"#,
    )
    .unwrap();

    let c = ManifestCatalog::from_json_file(&path, reqwest::Client::new()).unwrap();
    assert_eq!(c.candidates(&StyleRequest::Any).len(), 1);
    assert!(ManifestCatalog::from_json_file(&dir.join("missing.json"), reqwest::Client::new()).is_err());

    std::fs::remove_dir_all(&dir).ok();
}
