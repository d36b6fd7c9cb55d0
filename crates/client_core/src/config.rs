use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::domain::ProfileKind;
use url::Url;

use crate::verification::DEFAULT_TEST_CODE;

pub const DEFAULT_CONFIG_PATH: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub listing_url: String,
    pub register_model_url: String,
    pub register_photographer_url: String,
    pub review_url: String,
    pub request_timeout_secs: u64,
    pub verification_code: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            listing_url: "http://127.0.0.1:8080/search-profiles".into(),
            register_model_url: "http://127.0.0.1:8080/register-model".into(),
            register_photographer_url: "http://127.0.0.1:8080/register-photographer".into(),
            review_url: "http://127.0.0.1:8080/submit-model-review".into(),
            request_timeout_secs: 15,
            verification_code: DEFAULT_TEST_CODE.into(),
        }
    }
}

impl ClientSettings {
    pub fn registration_url(&self, kind: ProfileKind) -> &str {
        match kind {
            ProfileKind::Model => &self.register_model_url,
            ProfileKind::Photographer => &self.register_photographer_url,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, raw) in [
            ("listing_url", &self.listing_url),
            ("register_model_url", &self.register_model_url),
            ("register_photographer_url", &self.register_photographer_url),
            ("review_url", &self.review_url),
        ] {
            let parsed = Url::parse(raw).with_context(|| format!("invalid {name} '{raw}'"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("{name} must be an http(s) url, got '{raw}'");
            }
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        if self.verification_code.trim().is_empty() {
            bail!("verification_code must not be empty");
        }
        Ok(())
    }

    fn apply_file(&mut self, file_cfg: &HashMap<String, String>) {
        self.apply(|key| file_cfg.get(key).cloned());
    }

    fn apply_env(&mut self) {
        self.apply(|key| std::env::var(format!("APP__{}", key.to_ascii_uppercase())).ok());
    }

    fn apply(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("listing_url") {
            self.listing_url = v;
        }
        if let Some(v) = lookup("register_model_url") {
            self.register_model_url = v;
        }
        if let Some(v) = lookup("register_photographer_url") {
            self.register_photographer_url = v;
        }
        if let Some(v) = lookup("review_url") {
            self.review_url = v;
        }
        if let Some(v) = lookup("request_timeout_secs") {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
        if let Some(v) = lookup("verification_code") {
            self.verification_code = v;
        }
    }
}

/// Defaults, then `client.toml` in the working directory, then `APP__*` env vars.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_CONFIG_PATH))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Some(file_cfg) = parse_flat_toml(&raw) {
            settings.apply_file(&file_cfg);
        }
    }

    settings.apply_env();
    settings
}

fn parse_flat_toml(raw: &str) -> Option<HashMap<String, String>> {
    let table = toml::from_str::<toml::Table>(raw).ok()?;
    Some(
        table
            .into_iter()
            .filter_map(|(key, value)| match value {
                toml::Value::String(s) => Some((key, s)),
                toml::Value::Integer(i) => Some((key, i.to_string())),
                _ => None,
            })
            .collect(),
    )
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
