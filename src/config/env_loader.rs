use crate::config::model::{Config, OutlookConfig, SmtpConfig, SyncMode};
use crate::outlook::api::GRAPH_BASE_URL;
use serde::Deserialize;
use serde_either::SingleOrVec;
use std::path::Path;
use std::str::FromStr;
use std::{env, fs};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_STATE_FILE: &str = "sent_seminars.json";

/// Keys accepted in the JSON config file. Every field is optional; the file
/// itself may be absent when everything comes from the environment.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    sync_mode: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    from_email: Option<String>,
    to_emails: Option<SingleOrVec<String>>,
    email_subject: Option<String>,
    smtp_starttls: Option<bool>,
    smtp_ssl: Option<bool>,
    state_file: Option<String>,
    outlook_token: Option<String>,
    outlook_base_url: Option<String>,
}

/// Assembles the run configuration. Environment variables take precedence,
/// the JSON file (path in `HKU_CONFIG_PATH`) is the fallback.
pub fn load_config() -> Config {
    let path = env::var("HKU_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let file = load_file_config(Path::new(&path));

    let mode_text = load_string_config("HKU_SYNC_MODE", file.sync_mode, "email");
    let mode = SyncMode::from_str(&mode_text).unwrap_or_else(|_| {
        panic!(
            "Invalid config 'HKU_SYNC_MODE'. Expected either 'email' or 'outlook', got '{}'",
            mode_text
        )
    });

    Config {
        mode,
        smtp: SmtpConfig {
            host: load_string_config("HKU_SMTP_HOST", file.smtp_host, ""),
            port: load_port_config("HKU_SMTP_PORT", file.smtp_port),
            user: load_string_config("HKU_SMTP_USER", file.smtp_user, ""),
            password: load_string_config("HKU_SMTP_PASSWORD", file.smtp_password, ""),
            from_email: load_string_config("HKU_FROM_EMAIL", file.from_email, ""),
            to_emails: load_recipients(file.to_emails),
            subject_override: load_string_config("HKU_EMAIL_SUBJECT", file.email_subject, ""),
            use_starttls: load_bool_config("HKU_SMTP_STARTTLS", file.smtp_starttls, true),
            use_ssl: load_bool_config("HKU_SMTP_SSL", file.smtp_ssl, false),
            state_file: load_string_config("HKU_STATE_FILE", file.state_file, DEFAULT_STATE_FILE),
        },
        outlook: OutlookConfig {
            access_token: load_string_config("HKU_OUTLOOK_TOKEN", file.outlook_token, ""),
            base_url: load_string_config(
                "HKU_OUTLOOK_BASE_URL",
                file.outlook_base_url,
                GRAPH_BASE_URL,
            ),
        },
    }
}

fn load_file_config(path: &Path) -> FileConfig {
    if !path.exists() {
        debug!("No config file at {}, using environment only", path.display());
        return FileConfig::default();
    }

    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("Cannot read config file {}: {}", path.display(), err));
    serde_json::from_str(&raw)
        .unwrap_or_else(|err| panic!("Invalid JSON in config file {}: {}", path.display(), err))
}

fn load_string_config(name: &str, file_value: Option<String>, default: &str) -> String {
    env::var(name)
        .ok()
        .or(file_value)
        .unwrap_or_else(|| default.to_string())
}

fn load_port_config(name: &str, file_value: Option<u16>) -> u16 {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("Invalid config '{}'. Expected a port number.", name)),
        Err(_) => file_value.unwrap_or(DEFAULT_SMTP_PORT),
    }
}

fn load_bool_config(name: &str, file_value: Option<bool>, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            panic!(
                "Invalid config '{}'. Expected either 'true' or 'false'",
                name
            )
        }),
        Err(_) => file_value.unwrap_or(default),
    }
}

/// Recipients come as a comma-separated string in the environment, and as
/// either a string or a list in the config file.
fn load_recipients(file_value: Option<SingleOrVec<String>>) -> Vec<String> {
    match env::var("HKU_TO_EMAILS") {
        Ok(value) => split_addresses(&value),
        Err(_) => match file_value {
            Some(SingleOrVec::Single(joined)) => split_addresses(&joined),
            Some(SingleOrVec::Vec(list)) => list
                .iter()
                .map(|address| address.trim())
                .filter(|address| !address.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        },
    }
}

fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
