//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings alongside arrow and paging keys.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&key).copied()
    }

    /// Bind `key` to `action`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let defaults = [
            // Vim-style scrolling
            (KeyCode::Char('j'), KeyModifiers::NONE, KeyAction::ScrollDown),
            (KeyCode::Char('k'), KeyModifiers::NONE, KeyAction::ScrollUp),
            (KeyCode::Char('g'), KeyModifiers::NONE, KeyAction::ScrollToTop),
            (KeyCode::Char('G'), KeyModifiers::SHIFT, KeyAction::ScrollToBottom),
            // Arrow and navigation keys
            (KeyCode::Down, KeyModifiers::NONE, KeyAction::ScrollDown),
            (KeyCode::Up, KeyModifiers::NONE, KeyAction::ScrollUp),
            (KeyCode::Home, KeyModifiers::NONE, KeyAction::ScrollToTop),
            (KeyCode::End, KeyModifiers::NONE, KeyAction::ScrollToBottom),
            // Page navigation
            (KeyCode::Char('d'), KeyModifiers::CONTROL, KeyAction::PageDown),
            (KeyCode::Char('u'), KeyModifiers::CONTROL, KeyAction::PageUp),
            (KeyCode::PageDown, KeyModifiers::NONE, KeyAction::PageDown),
            (KeyCode::PageUp, KeyModifiers::NONE, KeyAction::PageUp),
            // Column selection
            (KeyCode::Char('l'), KeyModifiers::NONE, KeyAction::NextColumn),
            (KeyCode::Char('h'), KeyModifiers::NONE, KeyAction::PrevColumn),
            (KeyCode::Right, KeyModifiers::NONE, KeyAction::NextColumn),
            (KeyCode::Left, KeyModifiers::NONE, KeyAction::PrevColumn),
            (KeyCode::Tab, KeyModifiers::NONE, KeyAction::NextColumn),
            (KeyCode::BackTab, KeyModifiers::SHIFT, KeyAction::PrevColumn),
            // Sorting and filtering
            (KeyCode::Char('s'), KeyModifiers::NONE, KeyAction::ToggleSort),
            (KeyCode::Enter, KeyModifiers::NONE, KeyAction::ToggleSort),
            (KeyCode::Char('/'), KeyModifiers::NONE, KeyAction::StartFilter),
            (KeyCode::Char('c'), KeyModifiers::NONE, KeyAction::ClearFilters),
            // Application controls
            (KeyCode::Char('r'), KeyModifiers::NONE, KeyAction::Refresh),
            (KeyCode::Char('q'), KeyModifiers::NONE, KeyAction::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit),
        ];

        let bindings = defaults
            .into_iter()
            .map(|(code, modifiers, action)| (KeyEvent::new(code, modifiers), action))
            .collect();

        Self { bindings }
    }
}
