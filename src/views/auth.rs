use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::auth::AuthDetector;
use crate::command::Command;
use crate::msg::{AuthMsg, Msg};
use crate::overlay::TextField;
use crate::views::{Hint, View};

/// Startup screen: detect stored credentials, or ask for a token
#[derive(Debug)]
pub struct AuthView {
    detector: Arc<dyn AuthDetector>,
    pub input: TextField,
    /// Detection still running
    pub checking: bool,
    quit_requested: bool,
    pub width: u16,
    pub height: u16,
}

impl AuthView {
    pub fn new(detector: Arc<dyn AuthDetector>) -> Self {
        Self {
            detector,
            input: TextField::default(),
            checking: true,
            quit_requested: false,
            width: 0,
            height: 0,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl View for AuthView {
    fn init(&mut self) -> Vec<Command> {
        self.checking = true;
        vec![Command::DetectAuth {
            detector: self.detector.clone(),
        }]
    }

    fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Auth(AuthMsg::NotFound(status)) => {
                tracing::info!(?status, "no stored credentials, prompting for token");
                self.checking = false;
                Vec::new()
            }
            Msg::Key(key) => {
                let ctrl_c =
                    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || key.code == KeyCode::Esc {
                    self.quit_requested = true;
                    return Vec::new();
                }
                if self.checking {
                    return Vec::new();
                }
                if key.code == KeyCode::Enter {
                    let token = self.input.value().trim().to_string();
                    if token.is_empty() {
                        return Vec::new();
                    }
                    self.input.clear();
                    return vec![Command::SubmitToken { token }];
                }
                self.input.handle_key(&key);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn claims_input(&self) -> bool {
        true
    }

    fn hints(&self) -> Vec<Hint> {
        vec![("enter", "submit"), ("esc", "quit")]
    }
}
