//! Authorization (id tag) domain entity (spec §3, §4.D Authorize/StartTransaction).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainResult;

/// OCPP 1.6 `AuthorizationStatus` values relevant to a Central System
/// decision (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Accepted,
    Blocked,
    Expired,
    Invalid,
    ConcurrentTx,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Blocked => "Blocked",
            Self::Expired => "Expired",
            Self::Invalid => "Invalid",
            Self::ConcurrentTx => "ConcurrentTx",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Accepted" => Self::Accepted,
            "Blocked" => Self::Blocked,
            "Expired" => Self::Expired,
            "ConcurrentTx" => Self::ConcurrentTx,
            _ => Self::Invalid,
        }
    }
}

/// A known id tag and its current standing.
#[derive(Debug, Clone)]
pub struct AuthorizationRecord {
    pub id_tag: String,
    pub status: AuthorizationStatus,
    pub expiry_date: Option<DateTime<Utc>>,
    pub parent_id_tag: Option<String>,
}

impl AuthorizationRecord {
    pub fn new(id_tag: impl Into<String>, status: AuthorizationStatus) -> Self {
        Self {
            id_tag: id_tag.into(),
            status,
            expiry_date: None,
            parent_id_tag: None,
        }
    }

    /// Effective status against `now`, folding expiry into the stored
    /// status: an `Accepted` record past its `expiry_date` reads as
    /// `Expired` without needing a background sweep (spec §4.D).
    pub fn effective_status(&self, now: DateTime<Utc>) -> AuthorizationStatus {
        if self.status == AuthorizationStatus::Accepted {
            if let Some(expiry) = self.expiry_date {
                if now > expiry {
                    return AuthorizationStatus::Expired;
                }
            }
        }
        self.status
    }
}

#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Look up a known id tag. Absence of a record is distinct from a
    /// stored `Invalid` status — callers decide the unknown-tag policy
    /// (spec §9 open question): this repository only reports what it
    /// knows.
    async fn find(&self, id_tag: &str) -> DomainResult<Option<AuthorizationRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn effective_status_passes_through_non_accepted() {
        let rec = AuthorizationRecord::new("TAG1", AuthorizationStatus::Blocked);
        assert_eq!(rec.effective_status(Utc::now()), AuthorizationStatus::Blocked);
    }

    #[test]
    fn effective_status_expires_past_expiry_date() {
        let mut rec = AuthorizationRecord::new("TAG1", AuthorizationStatus::Accepted);
        rec.expiry_date = Some(Utc::now() - Duration::seconds(1));
        assert_eq!(rec.effective_status(Utc::now()), AuthorizationStatus::Expired);
    }

    #[test]
    fn effective_status_accepted_before_expiry() {
        let mut rec = AuthorizationRecord::new("TAG1", AuthorizationStatus::Accepted);
        rec.expiry_date = Some(Utc::now() + Duration::hours(1));
        assert_eq!(rec.effective_status(Utc::now()), AuthorizationStatus::Accepted);
    }
}
