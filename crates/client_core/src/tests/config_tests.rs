use super::*;

use std::{
    env,
    path::PathBuf,
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
    time::{SystemTime, UNIX_EPOCH},
};

/// Held by every test that reads or writes `APP__*` variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());
static NEXT_FILE: AtomicU32 = AtomicU32::new(0);

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let n = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
    let path = env::temp_dir().join(format!("directory_client_test_{suffix}_{n}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn defaults_are_valid() {
    let settings = ClientSettings::default();
    settings.validate().expect("defaults validate");
    assert_eq!(settings.verification_code, "1234");
    assert_eq!(settings.request_timeout(), Duration::from_secs(15));
}

#[test]
fn file_values_override_defaults() {
    let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let path = temp_config(
        "listing_url = \"https://api.example.com/search\"\nrequest_timeout_secs = 3\nunrelated = true\n",
    );

    let settings = load_settings_from(&path);
    assert_eq!(settings.listing_url, "https://api.example.com/search");
    assert_eq!(settings.request_timeout_secs, 3);
    assert_eq!(
        settings.register_model_url,
        ClientSettings::default().register_model_url
    );

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_or_broken_file_falls_back_to_defaults() {
    let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let settings = load_settings_from(Path::new("/definitely/not/here/client.toml"));
    assert_eq!(settings.review_url, ClientSettings::default().review_url);
    assert!(parse_flat_toml("this is = = not toml").is_none());
}

#[test]
fn unparsable_timeout_is_ignored() {
    let mut settings = ClientSettings::default();
    let overrides: HashMap<String, String> = [
        ("request_timeout_secs".to_string(), "soon".to_string()),
        ("verification_code".to_string(), "9999".to_string()),
    ]
    .into_iter()
    .collect();
    settings.apply_file(&overrides);
    assert_eq!(settings.request_timeout_secs, 15);
    assert_eq!(settings.verification_code, "9999");
}

#[test]
fn validation_rejects_bad_urls_and_zero_timeout() {
    let mut settings = ClientSettings {
        listing_url: "not a url".into(),
        ..ClientSettings::default()
    };
    assert!(settings.validate().is_err());

    settings.listing_url = "ftp://example.com/search".into();
    assert!(settings.validate().is_err());

    settings.listing_url = ClientSettings::default().listing_url;
    settings.request_timeout_secs = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn registration_url_follows_kind() {
    let settings = ClientSettings::default();
    assert!(settings
        .registration_url(ProfileKind::Model)
        .ends_with("/register-model"));
    assert!(settings
        .registration_url(ProfileKind::Photographer)
        .ends_with("/register-photographer"));
}

#[test]
fn env_overrides_file_and_bad_numbers_are_ignored() {
    let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let path = temp_config(
        "listing_url = \"https://file.example.com/search\"\nrequest_timeout_secs = 7\nreview_url = \"https://file.example.com/review\"\n",
    );
    env::set_var("APP__LISTING_URL", "https://env.example.com/search");
    env::set_var("APP__REQUEST_TIMEOUT_SECS", "forever");

    let settings = load_settings_from(&path);

    env::remove_var("APP__LISTING_URL");
    env::remove_var("APP__REQUEST_TIMEOUT_SECS");
    fs::remove_file(path).expect("cleanup");

    assert_eq!(settings.listing_url, "https://env.example.com/search");
    assert_eq!(settings.request_timeout_secs, 7);
    assert_eq!(settings.review_url, "https://file.example.com/review");
}
