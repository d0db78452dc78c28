use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use client_core::{
    composer::{Key, KeyPress},
    session::{CHAT_FALLBACK, TIMELINE_FALLBACK},
    AdvisorBackend, Event, FixedClock, FormError, RequestState, SessionController,
};
use shared::{
    domain::{LoanType, RepaymentPlan, Role},
    protocol::{ChatRequest, ChatResponse, LoanTimelineRequest, LoanTimelineResponse},
};

/// Replays queued outcomes and records every request it receives.
#[derive(Default)]
struct ScriptedBackend {
    chat_replies: Mutex<VecDeque<Result<ChatResponse, String>>>,
    timeline_replies: Mutex<VecDeque<Result<String, String>>>,
    chat_calls: Mutex<Vec<ChatRequest>>,
    timeline_calls: Mutex<Vec<LoanTimelineRequest>>,
}

impl ScriptedBackend {
    fn reply(self: &Arc<Self>, response: &str, tools: &[&str]) -> Arc<Self> {
        self.chat_replies.lock().expect("lock").push_back(Ok(ChatResponse {
            response: response.to_string(),
            tools_used: tools.iter().map(|tool| tool.to_string()).collect(),
        }));
        Arc::clone(self)
    }

    fn fail_chat(self: &Arc<Self>) -> Arc<Self> {
        self.chat_replies
            .lock()
            .expect("lock")
            .push_back(Err("503 Service Unavailable".to_string()));
        Arc::clone(self)
    }

    fn timeline(self: &Arc<Self>, outcome: Result<&str, &str>) -> Arc<Self> {
        self.timeline_replies
            .lock()
            .expect("lock")
            .push_back(outcome.map(str::to_string).map_err(str::to_string));
        Arc::clone(self)
    }

    fn chat_calls(&self) -> Vec<ChatRequest> {
        self.chat_calls.lock().expect("lock").clone()
    }

    fn timeline_calls(&self) -> Vec<LoanTimelineRequest> {
        self.timeline_calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AdvisorBackend for ScriptedBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_calls.lock().expect("lock").push(request);
        let next = self.chat_replies.lock().expect("lock").pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(err)) => Err(anyhow!(err)),
            None => Err(anyhow!("no scripted chat reply")),
        }
    }

    async fn loan_timeline(&self, request: LoanTimelineRequest) -> Result<LoanTimelineResponse> {
        self.timeline_calls.lock().expect("lock").push(request);
        let next = self.timeline_replies.lock().expect("lock").pop_front();
        match next {
            Some(Ok(timeline)) => Ok(LoanTimelineResponse::new(timeline)),
            Some(Err(err)) => Err(anyhow!(err)),
            None => Err(anyhow!("no scripted timeline")),
        }
    }
}

fn session(backend: &Arc<ScriptedBackend>) -> SessionController {
    SessionController::with_clock(backend.clone(), FixedClock::new("11:00:00 AM"))
}

fn fill_form(controller: &mut SessionController, fields: &[(&str, &str)]) {
    controller.open_form();
    for (field, value) in fields {
        controller.edit_form(field, value).expect("edit");
    }
}

const JO: [(&str, &str); 6] = [
    ("name", "Jo"),
    ("income", "50000"),
    ("family_size", "2"),
    ("loan_balance", "30000"),
    ("loan_type", "federal"),
    ("current_plan", "standard"),
];

#[tokio::test]
async fn what_is_rap_round_trip() {
    let backend = Arc::new(ScriptedBackend::default()).reply("RAP is...", &["search_tool"]);
    let mut controller = session(&backend);

    controller.send_chat("What is RAP?");
    controller.settle().await;

    let messages = controller.state().transcript().snapshot();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "What is RAP?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "RAP is...");
    assert_eq!(messages[1].tools_used, vec!["search_tool"]);

    let calls = backend.chat_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].message, "What is RAP?");
    assert!(calls[0].history.is_empty());
}

#[tokio::test]
async fn every_chat_adds_exactly_two_messages() {
    let backend = Arc::new(ScriptedBackend::default())
        .reply("one", &[])
        .fail_chat()
        .reply("three", &["timeline_tool"]);
    let mut controller = session(&backend);

    for (round, text) in ["first", "second", "third"].into_iter().enumerate() {
        assert!(!controller.state().request_state().chat_in_flight);
        controller.send_chat(text);
        controller.settle().await;
        assert!(!controller.state().request_state().chat_in_flight);
        assert_eq!(controller.state().transcript().len(), 2 * (round + 1));
    }

    let messages = controller.state().transcript().snapshot();
    let roles: Vec<_> = messages.iter().map(|message| message.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
    assert_eq!(messages[3].content, CHAT_FALLBACK);
    assert!(messages[3].tools_used.is_empty());

    let calls = backend.chat_calls();
    assert_eq!(calls[2].history.len(), 4);
    assert_eq!(calls[2].history[3].content, CHAT_FALLBACK);
}

#[tokio::test]
async fn blank_chat_changes_nothing() {
    let backend = Arc::new(ScriptedBackend::default());
    let mut controller = session(&backend);

    controller.send_chat("");
    controller.send_chat("   ");

    assert_eq!(controller.pending_calls(), 0);
    assert!(controller.state().transcript().is_empty());
    assert_eq!(controller.state().request_state(), RequestState::default());
    assert!(backend.chat_calls().is_empty());
}

#[tokio::test]
async fn submit_example_sends_typed_request_and_tags_tools() {
    let backend = Arc::new(ScriptedBackend::default()).timeline(Ok("Year 1: ..."));
    let mut controller = session(&backend);
    fill_form(&mut controller, &JO);

    controller.submit_form().expect("valid form");
    assert!(!controller.state().request_state().form_open);
    assert!(controller.state().request_state().calculator_in_flight);
    controller.settle().await;

    let calls = backend.timeline_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "Jo");
    assert_eq!(calls[0].income, 50000.0);
    assert_eq!(calls[0].family_size.get(), 2);
    assert_eq!(calls[0].loan_balance, 30000.0);
    assert_eq!(calls[0].loan_type, LoanType::Federal);
    assert_eq!(calls[0].current_plan, RepaymentPlan::Standard);

    let messages = controller.state().transcript().snapshot();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "Year 1: ...");
    assert_eq!(
        messages[0].tools_used,
        vec!["complete_form_tool", "timeline_tool"]
    );
    assert!(!controller.state().request_state().calculator_in_flight);
}

#[tokio::test]
async fn calculator_failure_appends_single_fallback() {
    let backend = Arc::new(ScriptedBackend::default()).timeline(Err("timed out"));
    let mut controller = session(&backend);
    fill_form(&mut controller, &JO);

    controller.submit_form().expect("valid form");
    controller.settle().await;

    let messages = controller.state().transcript().snapshot();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, TIMELINE_FALLBACK);
    assert!(messages[0].tools_used.is_empty());
    assert_eq!(controller.state().request_state(), RequestState::default());
}

#[tokio::test]
async fn incomplete_form_never_reaches_calculator() {
    for missing in ["name", "income", "loan_balance"] {
        let backend = Arc::new(ScriptedBackend::default());
        let mut controller = session(&backend);
        let fields: Vec<_> = JO
            .iter()
            .copied()
            .filter(|(field, _)| *field != missing)
            .collect();
        fill_form(&mut controller, &fields);

        let err = controller.submit_form().expect_err("guard");
        controller.settle().await;

        assert!(matches!(err, FormError::MissingRequired(_)));
        assert!(controller.state().request_state().form_open);
        assert!(backend.timeline_calls().is_empty());
        assert!(controller.state().transcript().is_empty());
    }
}

#[tokio::test]
async fn cancel_never_calls_a_backend() {
    let backend = Arc::new(ScriptedBackend::default());
    let mut controller = session(&backend);
    fill_form(&mut controller, &JO);

    controller.cancel_form();
    controller.settle().await;

    assert!(!controller.state().request_state().form_open);
    assert!(backend.timeline_calls().is_empty());
    assert!(backend.chat_calls().is_empty());

    controller.open_form();
    assert_eq!(controller.state().form().draft().name, "Jo");
}

#[tokio::test]
async fn enter_key_drives_the_same_dispatch() {
    let backend = Arc::new(ScriptedBackend::default()).reply("sure", &[]);
    let mut controller = session(&backend);

    controller
        .handle(Event::ComposerChanged {
            text: "Compare SAVE".to_string(),
        })
        .expect("edit");
    controller
        .handle(Event::ComposerKey(KeyPress::plain(Key::Enter)))
        .expect("enter");

    assert_eq!(controller.state().composer().draft(), "");
    controller.settle().await;
    assert_eq!(backend.chat_calls()[0].message, "Compare SAVE");
    assert_eq!(controller.state().transcript().len(), 2);
}

#[tokio::test]
async fn snapshot_is_stable_without_appends() {
    let backend = Arc::new(ScriptedBackend::default()).reply("ok", &[]);
    let mut controller = session(&backend);
    controller.send_chat("hi");
    controller.settle().await;

    let transcript = controller.state().transcript();
    assert_eq!(transcript.snapshot(), transcript.snapshot());
}
