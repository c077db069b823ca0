//! # Outcomes

use serde::{Deserialize, Serialize};

/// Binary routing result, broadcast to UI consumers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Backend confirmed delivery.
    SubmittedNow,
    /// Durably queued for the Sync Agent.
    Queued,
}

impl SubmissionOutcome {
    /// User-facing confirmation.
    pub fn message(&self) -> &'static str {
        match self {
            Self::SubmittedNow => "Submitted successfully!",
            Self::Queued => "Saved offline. Will sync when connected.",
        }
    }
}

/// What the completion screen needs, stored under `cawi_settings_{form}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionNotice {
    /// Thank-you message.
    pub thank_you_message: String,
    /// Accent color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
}

/// Returned to the caller of a successful submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Submission identifier.
    pub submission_id: String,
    /// Form submitted.
    pub form_id: String,
    /// Where it went.
    pub outcome: SubmissionOutcome,
    /// Completion screen content.
    pub notice: CompletionNotice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert!(SubmissionOutcome::Queued.message().contains("offline"));
        assert_eq!(
            serde_json::to_string(&SubmissionOutcome::SubmittedNow).unwrap(),
            "\"submitted_now\""
        );
    }

    #[test]
    fn test_notice_wire_names() {
        let notice = CompletionNotice {
            thank_you_message: "Thanks".into(),
            primary_color: None,
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["thankYouMessage"], "Thanks");
    }
}
