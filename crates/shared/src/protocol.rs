use serde::{Deserialize, Serialize};

use crate::domain::{FamilySize, LoanType, RepaymentPlan, Role};

/// Transcript entry, also the shape of each `history` element sent to `/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tools_used: Vec::new(),
            timestamp: timestamp.into(),
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        tools_used: Vec<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tools_used,
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub tools_used: Vec<String>,
}

/// Normalized loan parameters sent to `/loan-calculator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTimelineRequest {
    pub name: String,
    pub income: f64,
    pub family_size: FamilySize,
    pub loan_balance: f64,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub current_plan: RepaymentPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTimelineResponse {
    pub timeline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_paid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_to_payoff: Option<f64>,
}

impl LoanTimelineResponse {
    pub fn new(timeline: impl Into<String>) -> Self {
        Self {
            timeline: timeline.into(),
            monthly_payment: None,
            total_paid: None,
            years_to_payoff: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_history_entries_omit_empty_tool_list() {
        let value = serde_json::to_value(ChatMessage::user("hi", "9:00:00 AM")).expect("json");
        assert_eq!(
            value,
            json!({ "role": "user", "content": "hi", "timestamp": "9:00:00 AM" })
        );
    }

    #[test]
    fn chat_response_defaults_missing_tool_list() {
        let response: ChatResponse =
            serde_json::from_value(json!({ "response": "RAP is..." })).expect("decode");
        assert!(response.tools_used.is_empty());
    }

    #[test]
    fn loan_request_uses_numeric_wire_fields() {
        let request = LoanTimelineRequest {
            name: "Jo".to_string(),
            income: 50000.0,
            family_size: FamilySize::new(2).expect("two"),
            loan_balance: 30000.0,
            loan_type: LoanType::Federal,
            current_plan: RepaymentPlan::Standard,
        };
        assert_eq!(
            serde_json::to_value(&request).expect("json"),
            json!({
                "name": "Jo",
                "income": 50000.0,
                "family_size": 2,
                "loan_balance": 30000.0,
                "loan_type": "federal",
                "current_plan": "standard"
            })
        );
    }

    #[test]
    fn timeline_response_accepts_calculator_summary_fields() {
        let response: LoanTimelineResponse = serde_json::from_value(json!({
            "timeline": "Personalized RAP Plan Timeline for Jo",
            "monthly_payment": 125.5,
            "total_paid": 30000.0,
            "years_to_payoff": 19.9
        }))
        .expect("decode");
        assert_eq!(response.monthly_payment, Some(125.5));
        assert_eq!(
            serde_json::from_value::<LoanTimelineResponse>(json!({ "timeline": "t" }))
                .expect("decode"),
            LoanTimelineResponse::new("t")
        );
    }
}
