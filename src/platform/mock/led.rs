//! Mock status LED

use crate::platform::traits::StatusLed;

/// Mock LED tracking its state and toggle count
#[derive(Debug, Default)]
pub struct MockLed {
    on: bool,
    toggles: u32,
}

impl MockLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl StatusLed for MockLed {
    fn toggle(&mut self) {
        self.on = !self.on;
        self.toggles += 1;
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
