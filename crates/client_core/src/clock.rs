use chrono::{DateTime, Local, TimeZone};

/// Source of the human-readable time labels stamped on transcript messages.
pub trait Clock: Send + Sync {
    fn timestamp(&self) -> String;
}

/// Local wall-clock time, formatted like `3:07:12 PM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        format_time_label(&Local::now())
    }
}

/// Clock that always reports the same label.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.0.clone()
    }
}

pub fn format_time_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M:%S %p").to_string()
}
