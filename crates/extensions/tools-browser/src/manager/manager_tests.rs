use super::*;
use crate::driver::BrowserBackend;

#[test]
fn test_config_default() {
    let config = BrowserManagerConfig::default();
    assert_eq!(config.debug_port, 9222);
    assert_eq!(config.viewport_width, 1920);
    assert_eq!(config.viewport_height, 1080);
    assert!(!config.headless);
}

#[test]
fn test_config_endpoint() {
    let config = BrowserManagerConfig {
        debug_port: 9333,
        ..Default::default()
    };
    assert_eq!(config.devtools_url(), "http://localhost:9333");
}

#[test]
fn test_config_profile_dir() {
    let config = BrowserManagerConfig::default();
    let profile = config.resolved_profile_dir();
    assert!(profile.ends_with(".webvision/browser-profile"));
}

#[test]
fn test_launch_args() {
    let manager = BrowserManager::new(BrowserManagerConfig {
        profile_dir: Some("/tmp/wv-profile".into()),
        headless: true,
        ..Default::default()
    });
    let args = manager.launch_args();
    assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
    assert!(args.contains(&"--user-data-dir=/tmp/wv-profile".to_string()));
    assert!(args.contains(&"--disable-extensions".to_string()));
    assert!(args.contains(&"--disable-file-system".to_string()));
    assert!(args.contains(&"--no-first-run".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("--headless=new"));
}

#[test]
fn test_launch_args_headed() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(!manager.launch_args().iter().any(|a| a.starts_with("--headless")));
}

#[test]
fn test_page_profile_uses_configured_viewport() {
    let manager = BrowserManager::new(BrowserManagerConfig {
        viewport_width: 1280,
        viewport_height: 800,
        ..Default::default()
    });
    let profile = manager.page_profile();
    assert_eq!((profile.viewport_width, profile.viewport_height), (1280, 800));
    assert!(profile.extra_headers.contains_key("Accept"));
}

#[test]
fn test_browser_error_display() {
    let err = BrowserError::ConnectionFailed("timeout".to_string());
    assert_eq!(err.to_string(), "Connection failed: timeout");

    let err = BrowserError::ChromeNotFound;
    assert_eq!(err.to_string(), "Chrome not found. Please install Google Chrome.");

    let err = BrowserError::LaunchFailed("permission denied".to_string());
    assert_eq!(err.to_string(), "Failed to launch Chrome: permission denied");
}

#[test]
fn test_browser_error_from_cdp() {
    let err: BrowserError = crate::cdp::CdpError::SessionClosed.into();
    assert!(matches!(err, BrowserError::NotConnected));

    let err: BrowserError = crate::cdp::CdpError::Timeout("nav".into()).into();
    assert_eq!(err.to_string(), "Timeout: nav");
}

#[tokio::test]
async fn test_shutdown_without_start() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(!manager.is_started().await);
    assert!(manager.shutdown().await.is_ok());
}
