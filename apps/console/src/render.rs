//! Plain-text rendering of [`SessionView`] snapshots.
//!
//! The renderer only prints what changed since the previous call: new
//! transcript messages and transitions of the loading indicator.

use std::io::{self, Write};

use client_core::{
    loan_form::LoanField,
    view::{tools_line, FormView, WELCOME_HINT, WELCOME_TITLE, WELCOME_TOPICS},
    SessionView,
};
use shared::{domain::Role, protocol::ChatMessage};

pub struct Renderer<W: Write> {
    out: W,
    printed: usize,
    loading: Option<&'static str>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            loading: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn welcome(&mut self) -> io::Result<()> {
        writeln!(self.out, "{WELCOME_TITLE}")?;
        writeln!(self.out, "I can help you with:")?;
        for topic in WELCOME_TOPICS {
            writeln!(self.out, "  - {topic}")?;
        }
        writeln!(self.out, "{WELCOME_HINT}")?;
        writeln!(self.out)
    }

    /// Prints messages appended since the last call and the loading label
    /// when it first appears.
    pub fn update(&mut self, view: &SessionView<'_>) -> io::Result<()> {
        for message in view.messages.iter().skip(self.printed) {
            self.message(message)?;
        }
        self.printed = self.printed.max(view.messages.len());

        if view.loading_label != self.loading {
            if let Some(label) = view.loading_label {
                writeln!(self.out, "... {label}")?;
            }
            self.loading = view.loading_label;
        }
        self.out.flush()
    }

    pub fn form(&mut self, form: Option<&FormView<'_>>) -> io::Result<()> {
        let Some(form) = form else {
            writeln!(self.out, "The loan calculator is closed. Use /loan to open it.")?;
            return self.out.flush();
        };

        writeln!(self.out, "Loan Timeline Calculator")?;
        for field in LoanField::ALL {
            let marker = if field.is_required() { " *" } else { "" };
            writeln!(
                self.out,
                "  {:<24} {:<14} {}",
                format!("{}{marker}", field.label()),
                field.as_str(),
                form.draft.value(field)
            )?;
        }
        let state = if form.submit_enabled { "" } else { " (busy)" };
        writeln!(self.out, "  [{}]{state}  /submit  /cancel", form.submit_label)?;
        self.out.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "! {text}")?;
        self.out.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn message(&mut self, message: &ChatMessage) -> io::Result<()> {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "Advisor",
        };
        writeln!(self.out, "[{}] {who}:", message.timestamp)?;
        for line in message.content.lines() {
            writeln!(self.out, "  {line}")?;
        }
        if let Some(tools) = tools_line(message) {
            writeln!(self.out, "  ({tools})")?;
        }
        writeln!(self.out)
    }
}
