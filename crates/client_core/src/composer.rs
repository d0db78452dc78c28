/// Keys the chat box reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// Multi-line modifier; Shift+Enter inserts a newline instead of sending.
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Submit,
    Edited,
    Ignored,
}

/// Draft text of the chat input box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    draft: String,
}

impl Composer {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.draft.trim().is_empty()
    }

    pub fn on_key(&mut self, press: KeyPress) -> KeyOutcome {
        match press.key {
            Key::Enter if !press.shift => KeyOutcome::Submit,
            Key::Enter => {
                self.draft.push('\n');
                KeyOutcome::Edited
            }
            Key::Char(c) => {
                self.draft.push(c);
                KeyOutcome::Edited
            }
            Key::Backspace => match self.draft.pop() {
                Some(_) => KeyOutcome::Edited,
                None => KeyOutcome::Ignored,
            },
        }
    }
}
