//! Read-only projection of a session for rendering.

use shared::protocol::ChatMessage;

use crate::{
    error::MISSING_FIELDS_PROMPT,
    loan_form::LoanDraft,
    session::SessionState,
};

pub const WELCOME_TITLE: &str = "Welcome to the Student Loan AI Assistant!";
pub const WELCOME_TOPICS: [&str; 4] = [
    "Understanding the new RAP (Repayment Assistance Plan)",
    "Comparing different repayment plans (SAVE, PAYE, IBR)",
    "Loan timeline simulations",
    "Latest news and updates about student loans",
];
pub const WELCOME_HINT: &str =
    "Try asking me something like: \"What is the new RAP plan?\" or \"How does SAVE compare to the new plan?\"";

pub const THINKING_LABEL: &str = "Thinking...";
pub const GENERATING_TIMELINE_LABEL: &str = "Generating your personalized timeline...";
pub const SUBMIT_LABEL: &str = "Generate Timeline";
pub const SUBMITTING_LABEL: &str = "Generating...";

#[derive(Debug, Clone, PartialEq)]
pub struct FormView<'a> {
    pub draft: &'a LoanDraft,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub missing_prompt: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView<'a> {
    pub messages: &'a [ChatMessage],
    pub show_welcome: bool,
    pub loading_label: Option<&'static str>,
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub form: Option<FormView<'a>>,
}

impl<'a> SessionView<'a> {
    pub fn project(state: &'a SessionState) -> Self {
        let flags = state.request_state();
        let busy = flags.any_in_flight();

        let loading_label = if flags.calculator_in_flight {
            Some(GENERATING_TIMELINE_LABEL)
        } else if flags.chat_in_flight {
            Some(THINKING_LABEL)
        } else {
            None
        };

        let form = flags.form_open.then(|| FormView {
            draft: state.form().draft(),
            submit_label: if flags.calculator_in_flight {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            submit_enabled: !flags.calculator_in_flight,
            missing_prompt: MISSING_FIELDS_PROMPT,
        });

        Self {
            messages: state.transcript().messages(),
            show_welcome: state.transcript().is_empty(),
            loading_label,
            input_enabled: !busy,
            send_enabled: !busy && !state.composer().is_blank(),
            form,
        }
    }
}

/// "Tools used: a, b" footer, absent when the message used no tools.
pub fn tools_line(message: &ChatMessage) -> Option<String> {
    (!message.tools_used.is_empty())
        .then(|| format!("Tools used: {}", message.tools_used.join(", ")))
}
