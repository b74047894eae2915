use thiserror::Error;

use crate::database::DatabaseError;
use crate::routing::UpstreamRouteError;
use crate::validation::ValidationError;

/// Failure of a single outbound provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} did not answer in time")]
    Timeout { provider: &'static str },
    #[error("{provider} answered with HTTP {status}")]
    Status { provider: &'static str, status: u16 },
    #[error("{provider} returned an unexpected payload: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} returned no results")]
    NoResults { provider: &'static str },
    #[error("{provider} is not configured: missing {missing}")]
    NotConfigured {
        provider: &'static str,
        missing: &'static str,
    },
}

impl ProviderError {
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { provider }
        } else if err.is_decode() {
            ProviderError::Malformed {
                provider,
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ProviderError::Status {
                provider,
                status: status.as_u16(),
            }
        } else {
            ProviderError::Transport {
                provider,
                source: err,
            }
        }
    }

    pub fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            reason: reason.into(),
        }
    }
}

/// Terminal failures of a planning request. Everything else degrades.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),
    #[error(transparent)]
    UpstreamRoute(#[from] UpstreamRouteError),
    #[error("Failed to predict energy consumption for all {candidates} candidate route(s).")]
    NoViableRoute { candidates: usize },
    #[error("Failed to save trip: {0}")]
    Persistence(#[from] DatabaseError),
}
