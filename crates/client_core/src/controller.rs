//! Drives a [`SessionState`] against a live backend.
//!
//! Backend calls run as futures polled on the caller's task. Nothing is spawned
//! and nothing is cancelled; every call started here resolves into exactly one
//! completion event, even if the backend panics.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::{
    future::BoxFuture,
    stream::{FuturesUnordered, StreamExt},
    FutureExt,
};
use shared::protocol::LoanTimelineRequest;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    backend::AdvisorBackend,
    clock::{Clock, SystemClock},
    error::{BackendFailure, FormError},
    session::{transition, Effect, Event, RequestKind, SessionState},
    view::SessionView,
};

pub struct SessionController {
    session_id: Uuid,
    state: SessionState,
    backend: Arc<dyn AdvisorBackend>,
    clock: Box<dyn Clock>,
    pending: FuturesUnordered<BoxFuture<'static, Event>>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn AdvisorBackend>) -> Self {
        Self::with_clock(backend, SystemClock)
    }

    pub fn with_clock(backend: Arc<dyn AdvisorBackend>, clock: impl Clock + 'static) -> Self {
        let session_id = Uuid::new_v4();
        debug!(%session_id, "session started");
        Self {
            session_id,
            state: SessionState::new(),
            backend,
            clock: Box::new(clock),
            pending: FuturesUnordered::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView::project(&self.state)
    }

    /// Number of backend calls whose completion has not been applied yet.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Applies a UI event and starts any backend call it requests.
    pub fn handle(&mut self, event: Event) -> Result<(), FormError> {
        let effects = transition(&mut self.state, event, self.clock.as_ref())?;
        for effect in effects {
            self.start(effect);
        }
        Ok(())
    }

    pub fn send_chat(&mut self, text: impl Into<String>) {
        let effect = self.state.send_chat(text.into(), self.clock.as_ref());
        self.start_all(effect);
    }

    pub fn send_loan_request(&mut self, request: LoanTimelineRequest) -> Result<(), FormError> {
        let effect = self.state.send_loan_request(request)?;
        self.start_all(effect);
        Ok(())
    }

    pub fn open_form(&mut self) {
        self.state.open_form();
    }

    pub fn cancel_form(&mut self) {
        self.state.cancel_form();
    }

    pub fn edit_form(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        self.handle(Event::EditForm {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn submit_form(&mut self) -> Result<(), FormError> {
        self.handle(Event::SubmitForm)
    }

    /// Waits for the next backend call to finish and applies its result.
    /// Returns `false` when nothing is outstanding.
    pub async fn next_completion(&mut self) -> bool {
        let Some(event) = self.pending.next().await else {
            return false;
        };
        if let Err(err) = transition(&mut self.state, event, self.clock.as_ref()) {
            // completions never touch the form
            error!(session_id = %self.session_id, "completion rejected: {err}");
        }
        true
    }

    /// Applies completions until no backend call is outstanding.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn start_all(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.start(effect);
        }
    }

    fn start(&mut self, effect: Effect) {
        let kind = effect.kind();
        debug!(session_id = %self.session_id, kind = kind.as_str(), "starting backend call");

        let backend = Arc::clone(&self.backend);
        let call = async move {
            match effect {
                Effect::RequestChat(request) => Event::ChatCompleted(
                    backend.chat(request).await.map_err(BackendFailure::from),
                ),
                Effect::RequestLoanTimeline(request) => Event::LoanTimelineCompleted(
                    backend
                        .loan_timeline(request)
                        .await
                        .map_err(BackendFailure::from),
                ),
            }
        };
        let call = AssertUnwindSafe(call)
            .catch_unwind()
            .map(move |outcome| {
                outcome.unwrap_or_else(|_| failed(kind, BackendFailure::new("backend call panicked")))
            })
            .boxed();
        self.pending.push(call);
    }
}

fn failed(kind: RequestKind, failure: BackendFailure) -> Event {
    match kind {
        RequestKind::Chat => Event::ChatCompleted(Err(failure)),
        RequestKind::LoanTimeline => Event::LoanTimelineCompleted(Err(failure)),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
