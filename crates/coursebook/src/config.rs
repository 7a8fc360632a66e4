//! Process configuration, read once from the environment at startup.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::AppError;
use crate::sheets::{normalize_private_key, ServiceAccountKey};

pub const DEFAULT_PORT: u16 = 3000;

/// Where the service account credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A downloaded JSON key file
    KeyFile(PathBuf),
    /// `GOOGLE_CLIENT_EMAIL` / `GOOGLE_PRIVATE_KEY`, either of which may be missing
    Inline {
        client_email: Option<String>,
        private_key: Option<String>,
    },
}

impl CredentialSource {
    /// Resolves the source into a key.
    ///
    /// A configured key file that is missing or unreadable is an error; absent
    /// inline credentials yield `None` and fail later, per request.
    pub fn load(&self) -> Result<Option<ServiceAccountKey>, AppError> {
        match self {
            CredentialSource::KeyFile(path) => ServiceAccountKey::from_file(path)
                .map(Some)
                .map_err(|e| AppError::Configuration(e.to_string())),
            CredentialSource::Inline {
                client_email,
                private_key,
            } => match (client_email, private_key) {
                (Some(client_email), Some(private_key)) => Ok(Some(ServiceAccountKey {
                    client_email: client_email.clone(),
                    private_key: private_key.clone(),
                })),
                _ => {
                    warn!("No Google credentials configured; spreadsheet calls will fail");
                    Ok(None)
                }
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sheet_id: Option<String>,
    pub credentials: CredentialSource,
    pub port: u16,
    /// Set on platforms that call the router themselves (`VERCEL`)
    pub managed_hosting: bool,
}

impl Config {
    /// Reads the process environment.
    pub fn load() -> Result<Self, AppError> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(|key| env::var(key).ok(), &cwd)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    /// Relative key file paths are resolved against `cwd`.
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sheet_id = var("SHEET_ID");
        if sheet_id.is_none() {
            warn!("SHEET_ID not set; spreadsheet endpoints will respond with 500");
        }

        let key_file = var("GOOGLE_APPLICATION_CREDENTIALS").or_else(|| var("GOOGLE_KEY_FILE"));
        let credentials = match key_file {
            Some(file) => {
                let path = PathBuf::from(file);
                let path = if path.is_absolute() { path } else { cwd.join(path) };
                info!("Using Google key file {}", path.display());
                CredentialSource::KeyFile(path)
            }
            None => CredentialSource::Inline {
                client_email: var("GOOGLE_CLIENT_EMAIL").map(|e| e.trim().to_string()),
                private_key: var("GOOGLE_PRIVATE_KEY").map(|k| normalize_private_key(&k)),
            },
        };

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AppError::Configuration(format!("Invalid PORT value {raw:?}: {e}"))
            })?,
            None => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        Ok(Self {
            sheet_id,
            credentials,
            port,
            managed_hosting: var("VERCEL").is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned(), Path::new("/srv/app"))
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.sheet_id.is_none());
        assert!(!cfg.managed_hosting);
        assert_eq!(
            cfg.credentials,
            CredentialSource::Inline {
                client_email: None,
                private_key: None
            }
        );
    }

    #[test]
    fn test_relative_key_file_resolves_against_cwd() {
        let cfg = config(&[("GOOGLE_KEY_FILE", "keys/svc.json")]).unwrap();
        assert_eq!(
            cfg.credentials,
            CredentialSource::KeyFile(PathBuf::from("/srv/app/keys/svc.json"))
        );
    }

    #[test]
    fn test_application_credentials_take_precedence() {
        let cfg = config(&[
            ("GOOGLE_APPLICATION_CREDENTIALS", "/etc/key.json"),
            ("GOOGLE_KEY_FILE", "other.json"),
            ("GOOGLE_CLIENT_EMAIL", "svc@example.com"),
        ])
        .unwrap();
        assert_eq!(
            cfg.credentials,
            CredentialSource::KeyFile(PathBuf::from("/etc/key.json"))
        );
    }

    #[test]
    fn test_inline_credentials_are_normalized() {
        let cfg = config(&[
            ("SHEET_ID", "abc"),
            ("GOOGLE_CLIENT_EMAIL", " svc@example.com "),
            ("GOOGLE_PRIVATE_KEY", "-----BEGIN-----\\nxyz\\n-----END-----\\n"),
            ("PORT", "8080"),
            ("VERCEL", "1"),
        ])
        .unwrap();

        assert_eq!(cfg.sheet_id.as_deref(), Some("abc"));
        assert_eq!(cfg.port, 8080);
        assert!(cfg.managed_hosting);
        assert_eq!(
            cfg.credentials,
            CredentialSource::Inline {
                client_email: Some("svc@example.com".to_string()),
                private_key: Some("-----BEGIN-----\nxyz\n-----END-----".to_string()),
            }
        );
    }

    #[test]
    fn test_bad_port_is_rejected() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_key_file_is_fatal() {
        let source = CredentialSource::KeyFile(PathBuf::from("/nonexistent/svc.json"));
        assert!(matches!(source.load(), Err(AppError::Configuration(_))));
    }
}
