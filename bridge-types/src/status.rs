//! Transaction and Download Status Types

use serde::{Deserialize, Serialize};

/// Outcome of a purchase request.
///
/// `Failed` carries a human-readable reason threaded through from whichever
/// layer detected the failure; there is no silent failure mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Purchased,
    Cancelled,
    Restored,
    Pending,
    Failed(String),
}

impl TransactionStatus {
    /// Map a case-insensitive status tag (as answered by the host) to a
    /// status. An unrecognized tag maps to `Failed` with a reason
    /// distinguishable from the explicit-failed path; it is never coerced to
    /// a known status.
    pub fn from_tag(tag: &str, error_msg: Option<&str>) -> Self {
        match tag.to_lowercase().as_str() {
            "purchased" => Self::Purchased,
            "cancelled" => Self::Cancelled,
            "restored" => Self::Restored,
            "pending" => Self::Pending,
            "failed" => Self::Failed(error_msg.unwrap_or("Unexpected error.").to_string()),
            other => Self::Failed(format!("unknown purchase status: {other}")),
        }
    }

    /// The wire tag for this status.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Purchased => "purchased",
            Self::Cancelled => "cancelled",
            Self::Restored => "restored",
            Self::Pending => "pending",
            Self::Failed(_) => "failed",
        }
    }
}

/// Download state of paywall assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadStatus {
    NotDownloadedYet,
    InProgress,
    DownloadFailure,
    DownloadSuccess,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotDownloadedYet => "notDownloadedYet",
            Self::InProgress => "inProgress",
            Self::DownloadFailure => "downloadFailure",
            Self::DownloadSuccess => "downloadSuccess",
        }
    }
}

/// Result of a paywall info lookup: either an error message or the template
/// name plus whether the paywall should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaywallInfoResult {
    pub error_msg: Option<String>,
    pub template_name: Option<String>,
    pub should_show: Option<bool>,
}

impl PaywallInfoResult {
    pub fn found(template_name: impl Into<String>, should_show: bool) -> Self {
        Self {
            error_msg: None,
            template_name: Some(template_name.into()),
            should_show: Some(should_show),
        }
    }

    pub fn not_found() -> Self {
        Self {
            error_msg: Some("Invalid trigger or paywalls not ready.".to_string()),
            template_name: None,
            should_show: None,
        }
    }
}

/// Answer to a presentation readiness check, with a short machine-readable
/// reason ("ready", "loading", "fallback_ready", or why presentation would
/// fail).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanPresentResult {
    pub can_present: bool,
    pub reason: String,
}

impl CanPresentResult {
    pub fn yes(reason: impl Into<String>) -> Self {
        Self {
            can_present: true,
            reason: reason.into(),
        }
    }

    pub fn no(reason: impl Into<String>) -> Self {
        Self {
            can_present: false,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_map_case_insensitively() {
        assert_eq!(
            TransactionStatus::from_tag("Purchased", None),
            TransactionStatus::Purchased
        );
        assert_eq!(
            TransactionStatus::from_tag("CANCELLED", None),
            TransactionStatus::Cancelled
        );
        assert_eq!(
            TransactionStatus::from_tag("restored", None),
            TransactionStatus::Restored
        );
        assert_eq!(
            TransactionStatus::from_tag("pending", None),
            TransactionStatus::Pending
        );
    }

    #[test]
    fn test_explicit_failed_carries_message() {
        assert_eq!(
            TransactionStatus::from_tag("failed", Some("card declined")),
            TransactionStatus::Failed("card declined".to_string())
        );
        assert_eq!(
            TransactionStatus::from_tag("failed", None),
            TransactionStatus::Failed("Unexpected error.".to_string())
        );
    }

    #[test]
    fn test_unknown_tag_is_distinguishable_failure() {
        let status = TransactionStatus::from_tag("bogus", Some("ignored"));
        match status {
            TransactionStatus::Failed(reason) => {
                assert!(reason.contains("unknown purchase status"));
                assert!(reason.contains("bogus"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_download_status_wire_tags() {
        assert_eq!(
            serde_json::to_value(DownloadStatus::NotDownloadedYet).unwrap(),
            "notDownloadedYet"
        );
        assert_eq!(
            serde_json::to_value(DownloadStatus::InProgress).unwrap(),
            "inProgress"
        );
        assert_eq!(DownloadStatus::DownloadSuccess.as_str(), "downloadSuccess");
    }
}
