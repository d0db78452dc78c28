//! Console line input mapped onto session events.

use client_core::{
    composer::{Key, KeyPress},
    Event,
};

pub const HELP: &str = "\
Type a message and press Enter to send it. End a line with '\\' to keep writing on the next line.
  /send                 send the current draft
  /loan                 open the loan calculator
  /set <field> <value>  edit a form field (name, income, family_size, loan_balance, loan_type, current_plan)
  /form                 show the loan form
  /submit               generate the timeline
  /cancel               close the loan calculator
  /help                 show this help
  /quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Typed text; `continued` lines end with Shift+Enter instead of Enter.
    Type { text: String, continued: bool },
    Send,
    OpenForm,
    SetField { field: String, value: String },
    ShowForm,
    SubmitForm,
    CancelForm,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return match line.strip_suffix('\\') {
            Some(text) => ConsoleCommand::Type {
                text: text.to_string(),
                continued: true,
            },
            None => ConsoleCommand::Type {
                text: line.to_string(),
                continued: false,
            },
        };
    };

    let mut parts = rest.splitn(3, ' ');
    match parts.next().unwrap_or_default() {
        "send" => ConsoleCommand::Send,
        "loan" => ConsoleCommand::OpenForm,
        "form" => ConsoleCommand::ShowForm,
        "submit" => ConsoleCommand::SubmitForm,
        "cancel" => ConsoleCommand::CancelForm,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        "set" => match (parts.next(), parts.next()) {
            (Some(field), Some(value)) if !field.is_empty() => ConsoleCommand::SetField {
                field: field.to_string(),
                value: value.trim().to_string(),
            },
            (Some(field), None) if !field.is_empty() => ConsoleCommand::SetField {
                field: field.to_string(),
                value: String::new(),
            },
            _ => ConsoleCommand::Unknown(line.to_string()),
        },
        _ => ConsoleCommand::Unknown(line.to_string()),
    }
}

/// Session events for a command; empty for commands handled by the console.
/// Returns `None` for typed text while the chat input is disabled, so a line
/// typed during a request never lands in the draft.
pub fn to_events(command: ConsoleCommand, input_enabled: bool) -> Option<Vec<Event>> {
    let events = match command {
        ConsoleCommand::Type { .. } if !input_enabled => return None,
        ConsoleCommand::Type { text, continued } => {
            let mut events: Vec<Event> = text
                .chars()
                .map(|c| Event::ComposerKey(KeyPress::plain(Key::Char(c))))
                .collect();
            let enter = if continued {
                KeyPress::shifted(Key::Enter)
            } else {
                KeyPress::plain(Key::Enter)
            };
            events.push(Event::ComposerKey(enter));
            events
        }
        ConsoleCommand::Send => vec![Event::ComposerSend],
        ConsoleCommand::OpenForm => vec![Event::OpenForm],
        ConsoleCommand::SetField { field, value } => vec![Event::EditForm { field, value }],
        ConsoleCommand::SubmitForm => vec![Event::SubmitForm],
        ConsoleCommand::CancelForm => vec![Event::CancelForm],
        ConsoleCommand::ShowForm
        | ConsoleCommand::Help
        | ConsoleCommand::Quit
        | ConsoleCommand::Unknown(_) => Vec::new(),
    };
    Some(events)
}
