//! Conversation and form orchestration as pure state transitions.
//!
//! [`transition`] mutates a [`SessionState`] and returns the backend calls the
//! controller has to start. Each call's outcome comes back as a completion
//! [`Event`] that appends the reply and clears the in-flight flag.

use shared::{
    domain::{COMPLETE_FORM_TOOL, TIMELINE_TOOL},
    protocol::{ChatMessage, ChatRequest, ChatResponse, LoanTimelineRequest, LoanTimelineResponse},
};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    composer::{Composer, KeyOutcome, KeyPress},
    error::{BackendFailure, FormError},
    loan_form::{validate_request, LoanForm},
    transcript::Transcript,
};

pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";
pub const TIMELINE_FALLBACK: &str =
    "Sorry, I encountered an error while calculating your loan timeline. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Chat,
    LoanTimeline,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Chat => "chat",
            RequestKind::LoanTimeline => "loan_timeline",
        }
    }
}

/// Loading and modal flags as seen by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestState {
    pub chat_in_flight: bool,
    pub calculator_in_flight: bool,
    pub form_open: bool,
}

impl RequestState {
    pub fn any_in_flight(&self) -> bool {
        self.chat_in_flight || self.calculator_in_flight
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Programmatic send; only guarded against a chat already in flight.
    SendChat { text: String },
    ComposerChanged { text: String },
    ComposerKey(KeyPress),
    /// Send button.
    ComposerSend,
    OpenForm,
    CancelForm,
    EditForm { field: String, value: String },
    SubmitForm,
    ChatCompleted(Result<ChatResponse, BackendFailure>),
    LoanTimelineCompleted(Result<LoanTimelineResponse, BackendFailure>),
}

/// Backend calls requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestChat(ChatRequest),
    RequestLoanTimeline(LoanTimelineRequest),
}

impl Effect {
    pub fn kind(&self) -> RequestKind {
        match self {
            Effect::RequestChat(_) => RequestKind::Chat,
            Effect::RequestLoanTimeline(_) => RequestKind::LoanTimeline,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    transcript: Transcript,
    chat_in_flight: bool,
    calculator_in_flight: bool,
    form: LoanForm,
    composer: Composer,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn form(&self) -> &LoanForm {
        &self.form
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn request_state(&self) -> RequestState {
        RequestState {
            chat_in_flight: self.chat_in_flight,
            calculator_in_flight: self.calculator_in_flight,
            form_open: self.form.is_open(),
        }
    }

    pub fn in_flight(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Chat => self.chat_in_flight,
            RequestKind::LoanTimeline => self.calculator_in_flight,
        }
    }

    /// Appends the user message and returns the chat call to issue. The
    /// history sent along is the transcript as it stood before the append.
    pub fn open_form(&mut self) {
        self.form.open();
    }

    /// Returns whether the form was open.
    pub fn cancel_form(&mut self) -> bool {
        self.form.cancel()
    }

    pub fn send_chat(&mut self, text: String, clock: &dyn Clock) -> Option<Effect> {
        if text.trim().is_empty() {
            debug!("ignoring blank chat message");
            return None;
        }
        if self.chat_in_flight {
            debug!("chat request already in flight; ignoring send");
            return None;
        }

        let history = self.transcript.snapshot();
        self.transcript
            .append(ChatMessage::user(text.clone(), clock.timestamp()));
        self.chat_in_flight = true;
        info!(
            text_len = text.len(),
            history_len = history.len(),
            "dispatching chat request"
        );
        Some(Effect::RequestChat(ChatRequest {
            message: text,
            history,
        }))
    }

    /// Closes the form and returns the calculator call to issue.
    pub fn send_loan_request(
        &mut self,
        request: LoanTimelineRequest,
    ) -> Result<Option<Effect>, FormError> {
        if self.calculator_in_flight {
            debug!("loan timeline request already in flight; ignoring submit");
            return Ok(None);
        }
        validate_request(&request)?;

        self.form.close();
        self.calculator_in_flight = true;
        info!(
            family_size = request.family_size.get(),
            loan_type = request.loan_type.as_str(),
            current_plan = request.current_plan.as_str(),
            "dispatching loan timeline request"
        );
        Ok(Some(Effect::RequestLoanTimeline(request)))
    }

    fn submit_composer(&mut self, clock: &dyn Clock) -> Option<Effect> {
        if self.request_state().any_in_flight() {
            debug!("request in flight; chat input is disabled");
            return None;
        }
        if self.composer.is_blank() {
            return None;
        }
        let text = self.composer.draft().to_string();
        let effect = self.send_chat(text, clock);
        self.composer.clear();
        effect
    }

    fn submit_form(&mut self) -> Result<Option<Effect>, FormError> {
        if self.calculator_in_flight {
            debug!("loan timeline request already in flight; submit is disabled");
            return Ok(None);
        }
        match self.form.submit()? {
            Some(request) => self.send_loan_request(request),
            None => {
                debug!("loan form is not open; ignoring submit");
                Ok(None)
            }
        }
    }

    fn complete_chat(&mut self, result: Result<ChatResponse, BackendFailure>, clock: &dyn Clock) {
        if !self.chat_in_flight {
            warn!("chat completion with no chat request in flight; dropped");
            return;
        }
        let message = match result {
            Ok(reply) => {
                info!(tools = ?reply.tools_used, "chat reply received");
                ChatMessage::assistant(reply.response, reply.tools_used, clock.timestamp())
            }
            Err(err) => {
                warn!("chat request failed: {err}");
                ChatMessage::assistant(CHAT_FALLBACK, Vec::new(), clock.timestamp())
            }
        };
        self.transcript.append(message);
        self.chat_in_flight = false;
    }

    fn complete_loan_timeline(
        &mut self,
        result: Result<LoanTimelineResponse, BackendFailure>,
        clock: &dyn Clock,
    ) {
        if !self.calculator_in_flight {
            warn!("loan timeline completion with no request in flight; dropped");
            return;
        }
        let message = match result {
            Ok(reply) => {
                info!(
                    monthly_payment = ?reply.monthly_payment,
                    years_to_payoff = ?reply.years_to_payoff,
                    "loan timeline received"
                );
                ChatMessage::assistant(
                    reply.timeline,
                    vec![COMPLETE_FORM_TOOL.to_string(), TIMELINE_TOOL.to_string()],
                    clock.timestamp(),
                )
            }
            Err(err) => {
                warn!("loan timeline request failed: {err}");
                ChatMessage::assistant(TIMELINE_FALLBACK, Vec::new(), clock.timestamp())
            }
        };
        self.transcript.append(message);
        self.calculator_in_flight = false;
    }
}

/// Applies one event. Validation failures and unknown form fields come back
/// as errors and leave the state untouched; every other rejected input is a
/// silent no-op.
pub fn transition(
    state: &mut SessionState,
    event: Event,
    clock: &dyn Clock,
) -> Result<Vec<Effect>, FormError> {
    let effect = match event {
        Event::SendChat { text } => state.send_chat(text, clock),
        Event::ComposerChanged { text } => {
            state.composer.set_draft(text);
            None
        }
        Event::ComposerKey(press) => match state.composer.on_key(press) {
            KeyOutcome::Submit => state.submit_composer(clock),
            KeyOutcome::Edited | KeyOutcome::Ignored => None,
        },
        Event::ComposerSend => state.submit_composer(clock),
        Event::OpenForm => {
            state.open_form();
            None
        }
        Event::CancelForm => {
            state.cancel_form();
            None
        }
        Event::EditForm { field, value } => {
            state.form.edit(&field, &value)?;
            None
        }
        Event::SubmitForm => state.submit_form()?,
        Event::ChatCompleted(result) => {
            state.complete_chat(result, clock);
            None
        }
        Event::LoanTimelineCompleted(result) => {
            state.complete_loan_timeline(result, clock);
            None
        }
    };
    Ok(effect.into_iter().collect())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
