//! Status LED interface

/// Board status LED
pub trait StatusLed {
    /// Invert the LED state.
    fn toggle(&mut self);

    /// Current LED state (true = on)
    fn is_on(&self) -> bool;
}
