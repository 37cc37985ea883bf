use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or timeout before a response arrived.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream rejected request{}: {reason}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    UpstreamRejected { status: Option<u16>, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No usable audio format: {0}")]
    NoUsableFormat(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid track id: {0}")]
    InvalidId(String),

    #[error("All {attempts} attempts failed")]
    AllEndpointsFailed { attempts: usize },
}

impl ProviderError {
    pub fn rejected(status: u16, reason: impl Into<String>) -> Self {
        ProviderError::UpstreamRejected {
            status: Some(status),
            reason: reason.into(),
        }
    }

    /// Whether a rotating provider should move on to its next endpoint or identity.
    pub fn is_rotatable(&self) -> bool {
        matches!(
            self,
            ProviderError::UpstreamUnavailable(_)
                | ProviderError::UpstreamRejected { .. }
                | ProviderError::Parse(_)
                | ProviderError::NoUsableFormat(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::UpstreamRejected { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ProviderError::rejected(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::UpstreamUnavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotatable_classification() {
        assert!(ProviderError::UpstreamUnavailable("timeout".into()).is_rotatable());
        assert!(ProviderError::rejected(503, "busy").is_rotatable());
        assert!(ProviderError::Parse("bad json".into()).is_rotatable());
        assert!(!ProviderError::NotConfigured("spotify".into()).is_rotatable());
        assert!(!ProviderError::InvalidId("x".into()).is_rotatable());
    }

    #[test]
    fn test_rejected_display_includes_status() {
        let err = ProviderError::rejected(403, "LOGIN_REQUIRED");
        assert_eq!(err.to_string(), "Upstream rejected request (403): LOGIN_REQUIRED");
        assert_eq!(err.status(), Some(403));

        let err = ProviderError::UpstreamRejected {
            status: None,
            reason: "UNPLAYABLE".into(),
        };
        assert_eq!(err.to_string(), "Upstream rejected request: UNPLAYABLE");
    }
}
