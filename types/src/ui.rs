//! UI state types for the TUI layer.
//!
//! Pure data types with no IO, no async, no ratatui dependency.
//! Used by both the engine (state ownership) and tui (rendering/input).

/// The five interactive buttons, in left-to-right render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    StartEmitter,
    CancelEmitter,
    FallibleAction,
    CallWrapper,
    Alternate,
}

impl Button {
    /// All buttons in render order.
    pub const ALL: [Button; 5] = [
        Button::StartEmitter,
        Button::CancelEmitter,
        Button::FallibleAction,
        Button::CallWrapper,
        Button::Alternate,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Button::StartEmitter => "Start Emitter",
            Button::CancelEmitter => "Cancel Emitter",
            Button::FallibleAction => "Perform Fallible Action",
            Button::CallWrapper => "Call Wrapper",
            Button::Alternate => "Alternate",
        }
    }

    /// Direct shortcut key for pressing this button without moving focus.
    #[must_use]
    pub fn shortcut(self) -> char {
        match self {
            Button::StartEmitter => 's',
            Button::CancelEmitter => 'c',
            Button::FallibleAction => 'f',
            Button::CallWrapper => 'w',
            Button::Alternate => 'a',
        }
    }

    #[must_use]
    pub fn from_shortcut(key: char) -> Option<Self> {
        Button::ALL.into_iter().find(|b| b.shortcut() == key)
    }

    /// Next button in render order, wrapping at the end.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = self.index();
        Button::ALL[(idx + 1) % Button::ALL.len()]
    }

    /// Previous button in render order, wrapping at the start.
    #[must_use]
    pub fn prev(self) -> Self {
        let idx = self.index();
        Button::ALL[(idx + Button::ALL.len() - 1) % Button::ALL.len()]
    }

    fn index(self) -> usize {
        Button::ALL
            .iter()
            .position(|b| *b == self)
            .unwrap_or_default()
    }
}

impl Default for Button {
    fn default() -> Self {
        Button::StartEmitter
    }
}
