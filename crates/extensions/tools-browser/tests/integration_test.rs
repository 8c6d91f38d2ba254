//! Integration tests against a real Chrome.
//!
//! Ignored by default. Run with:
//! cargo test -p webvision-tools-browser --test integration_test -- --ignored --nocapture

use std::sync::Arc;

use webvision_tools_browser::{
    ActionOrchestrator, BrowserBackend, BrowserManager, BrowserManagerConfig, OrchestratorConfig,
    PageDriver,
};

fn test_config(profile: &std::path::Path) -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: 9333,
        profile_dir: Some(profile.to_path_buf()),
        headless: true,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_chrome_detection() {
    let path = BrowserManager::find_chrome().expect("Chrome should be installed");
    assert!(path.exists());
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_lazy_start_and_shutdown() {
    let profile = tempfile::TempDir::new().unwrap();
    let manager = BrowserManager::new(test_config(profile.path()));
    assert!(!manager.is_started().await);

    let page = manager.current_page().await.unwrap();
    assert_eq!(page.url().await.unwrap(), "about:blank");
    assert!(manager.is_started().await);

    manager.shutdown().await.unwrap();
    assert!(!manager.is_started().await);
}

#[tokio::test]
#[ignore = "requires Chrome and network access"]
async fn test_navigate_and_extract() {
    let profile = tempfile::TempDir::new().unwrap();
    let shots = tempfile::TempDir::new().unwrap();
    let manager = Arc::new(BrowserManager::new(test_config(profile.path())));
    let orchestrator = ActionOrchestrator::new(
        manager,
        OrchestratorConfig {
            screenshot_dir: shots.path().to_path_buf(),
            ..Default::default()
        },
    );

    let result = orchestrator.navigate("example.com", false).await;
    assert!(result.success, "{:?}", result.error);
    assert!(result.content.contains("Example Domain"));

    let again = orchestrator.navigate("https://example.com", false).await;
    assert!(again.content.starts_with("🌍 Already on"));

    let content = orchestrator.extract_text("h1", 1000).await;
    assert!(content.content.ends_with("Example Domain"));

    let shot = orchestrator.take_screenshot().await;
    assert!(shot.success, "{:?}", shot.error);

    orchestrator.shutdown().await.unwrap();
}
