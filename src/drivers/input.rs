//! Button input

/// Logical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Start/stop the countdown
    Toggle,
    /// Restart the current phase
    Reset,
}

/// Presses seen since the previous poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEvents {
    pub toggle: bool,
    pub reset: bool,
}

impl ButtonEvents {
    pub fn press(&mut self, button: Button) {
        match button {
            Button::Toggle => self.toggle = true,
            Button::Reset => self.reset = true,
        }
    }

    pub fn any(&self) -> bool {
        self.toggle || self.reset
    }
}

impl From<Button> for ButtonEvents {
    fn from(button: Button) -> Self {
        let mut events = Self::default();
        events.press(button);
        events
    }
}

/// Edge-triggered button source, polled once per control-loop iteration
pub trait InputSource: Send {
    fn poll(&mut self) -> ButtonEvents;
}
