use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::{AuthError, Error, Result};

const REQUIRED_FIELDS: [&str; 4] = ["type", "project_id", "private_key", "client_email"];
const SERVICE_ACCOUNT: &str = "service_account";

/// Service-account key document, validated for shape but not yet for trust.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    pub project_id: String,
    pub client_email: String,
    pub private_key_id: Option<String>,
    private_key: String,
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountCredentials {
    /// Parse and check required fields, then the account type.
    pub fn from_json(document: &str) -> std::result::Result<Self, AuthError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| AuthError::InvalidDocument(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| AuthError::InvalidDocument("expected a JSON object".to_string()))?;

        let field = |name: &str| {
            obj.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|name| field(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing));
        }

        let kind = field("type").unwrap_or_default();
        if kind != SERVICE_ACCOUNT {
            return Err(AuthError::WrongType(kind.to_string()));
        }

        Ok(Self {
            project_id: field("project_id").unwrap_or_default().to_string(),
            client_email: field("client_email").unwrap_or_default().to_string(),
            private_key_id: field("private_key_id").map(str::to_string),
            private_key: obj
                .get("private_key")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text).map_err(Error::from)
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// PEM-encoded private key block present.
    pub fn has_pem_key(&self) -> bool {
        let key = self.private_key.trim();
        key.starts_with("-----BEGIN") && key.contains("PRIVATE KEY-----") && key.ends_with("-----")
    }
}
