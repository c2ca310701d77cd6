use crate::command::Command;
use crate::msg::Msg;
use crate::views::{Hint, View};

/// Tab reserved for a feature that is not built yet
#[derive(Debug)]
pub struct PlaceholderView {
    pub title: &'static str,
    pub width: u16,
    pub height: u16,
}

impl PlaceholderView {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            width: 0,
            height: 0,
        }
    }
}

impl View for PlaceholderView {
    fn init(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn update(&mut self, _msg: Msg) -> Vec<Command> {
        Vec::new()
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn hints(&self) -> Vec<Hint> {
        Vec::new()
    }
}
