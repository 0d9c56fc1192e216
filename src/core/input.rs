/// Input dispatch — maps raw keys to playback signals for the current state.

/// A request from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Move on to the scene's `next`.
    Advance,
    /// Take the choice at this zero-based index.
    Choose(usize),
}

/// A raw input event from the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    /// A tap or click on the text area.
    Tap,
    /// A number key, `1` through `9`.
    Digit(u8),
    Other,
}

impl Key {
    /// Map a typed character to a key.
    pub fn from_char(ch: char) -> Key {
        match ch {
            ' ' => Key::Space,
            '1'..='9' => Key::Digit(ch as u8 - b'0'),
            _ => Key::Other,
        }
    }
}

/// Which signals the dispatcher currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Armed {
    #[default]
    Nothing,
    Advance,
    /// Choices are on screen; holds how many.
    Choices(usize),
}

/// The single key handler owned by the player.
///
/// It is re-armed on every state change instead of accumulating handlers,
/// so a number key only ever selects among the choices currently shown.
#[derive(Debug, Clone, Default)]
pub struct InputDispatcher {
    armed: Armed,
    number_shortcuts: bool,
}

impl InputDispatcher {
    pub fn new(number_shortcuts: bool) -> Self {
        Self {
            armed: Armed::Nothing,
            number_shortcuts,
        }
    }

    pub fn arm(&mut self, armed: Armed) {
        self.armed = armed;
    }

    pub fn disarm(&mut self) {
        self.armed = Armed::Nothing;
    }

    pub fn armed(&self) -> Armed {
        self.armed
    }

    /// Translate a key into a signal, or `None` if the key means nothing
    /// right now.
    pub fn dispatch(&self, key: Key) -> Option<Signal> {
        match (self.armed, key) {
            (Armed::Advance, Key::Space | Key::Tap) => Some(Signal::Advance),
            (Armed::Choices(count), Key::Digit(n)) if self.number_shortcuts => {
                let index = usize::from(n).checked_sub(1)?;
                (index < count).then_some(Signal::Choose(index))
            }
            _ => None,
        }
    }
}
