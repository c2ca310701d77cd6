pub mod auth;
pub mod branches;
pub mod ci;
pub mod history;
pub mod org;
pub mod placeholder;

use crate::command::Command;
use crate::msg::Msg;

/// Key and label shown in the footer
pub type Hint = (&'static str, &'static str);

/// Uniform contract of every screen the root controller hosts.
///
/// Views never perform I/O: they mutate their own state and describe the
/// work they need as commands.
pub trait View {
    /// Commands to run when the view becomes active
    fn init(&mut self) -> Vec<Command>;

    fn update(&mut self, msg: Msg) -> Vec<Command>;

    /// Content area available to the view, chrome already subtracted
    fn resize(&mut self, width: u16, height: u16);

    /// True while a text field or confirmation owns the keyboard
    fn claims_input(&self) -> bool {
        false
    }

    fn hints(&self) -> Vec<Hint>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Progress,
    Success,
    Error,
}

/// One-line feedback under a view's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Progress,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}
