use crate::session::SessionOutcome;
use serde::{Deserialize, Serialize};

/// Body returned by `POST /api/describe`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DescribeResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl From<&SessionOutcome> for DescribeResponse {
    fn from(outcome: &SessionOutcome) -> Self {
        let described = match outcome {
            SessionOutcome::Described(description) => Some(description),
            _ => None,
        };
        Self {
            status: outcome.status().to_string(),
            description: described.map(|d| d.text.clone()),
            message: outcome.message().map(str::to_string),
            model: described.map(|d| d.model.clone()),
            duration_ms: described.map(|d| d.duration.as_millis() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Description, NO_CONTENT_MESSAGE};
    use std::time::Duration;

    #[test]
    fn test_success_body() {
        let outcome = SessionOutcome::Described(Description {
            text: "**Name:** Denarius".into(),
            model: "gemini-2.5-flash".into(),
            duration: Duration::from_millis(1500),
        });
        let json = serde_json::to_value(DescribeResponse::from(&outcome)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "success",
                "description": "**Name:** Denarius",
                "model": "gemini-2.5-flash",
                "duration_ms": 1500
            })
        );
    }

    #[test]
    fn test_no_content_body() {
        let json = serde_json::to_value(DescribeResponse::from(&SessionOutcome::NoContent)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "no_content", "message": NO_CONTENT_MESSAGE })
        );
    }
}
