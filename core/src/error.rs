use thiserror::Error;

/// Failures reported by a chat-completions backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} rejected credentials ({status}): {body}")]
    Unauthorized {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Empty response from {0}: no content or tool calls")]
    EmptyResponse(&'static str),
}

impl ProviderError {
    pub fn from_status(provider: &'static str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized {
                provider,
                status,
                body,
            },
            _ => Self::Api {
                provider,
                status,
                body,
            },
        }
    }

    /// Retrying cannot succeed; the session should end.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Whether any error in the chain is a fatal provider error.
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ProviderError>())
        .any(ProviderError::is_fatal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn auth_statuses_are_fatal() {
        assert!(ProviderError::from_status("OpenAI", 401, String::new()).is_fatal());
        assert!(ProviderError::from_status("OpenAI", 403, String::new()).is_fatal());
        assert!(!ProviderError::from_status("OpenAI", 429, String::new()).is_fatal());
        assert!(!ProviderError::from_status("OpenAI", 500, String::new()).is_fatal());
    }

    #[test]
    fn fatality_survives_context() {
        let err: anyhow::Result<()> =
            Err(ProviderError::from_status("OpenAI", 401, "bad key".into()).into());
        let err = err.context("turn failed").unwrap_err();
        assert!(is_fatal(&err));
        assert!(!is_fatal(&anyhow::anyhow!("network hiccup")));
    }
}
