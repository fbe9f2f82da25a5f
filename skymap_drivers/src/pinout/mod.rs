// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::gpio::{Pin, PinMode, Port, Pull};

pub mod inputs;
pub mod led;
pub mod motor;

/// Represents the definition of a GPIO pin.
pub struct PinDef {
    /// The port to which the pin belongs (e.g., Port::A, Port::B).
    port: Port,
    /// The pin number within the port.
    pin: u8,
    /// The mode of the pin (e.g., Output, Input).
    mode: PinMode,
    /// Internal pull resistor, `None` leaves the pin floating.
    pull: Option<Pull>,
}

impl PinDef {
    pub const fn new(port: Port, pin: u8, mode: PinMode) -> PinDef {
        PinDef {
            port,
            pin,
            mode,
            pull: None,
        }
    }

    /// Same pin with an internal pull resistor enabled.
    pub const fn with_pull(self, pull: Pull) -> PinDef {
        PinDef {
            pull: Some(pull),
            ..self
        }
    }

    /// EXTI line of the pin (equal to the pin number).
    pub const fn exti_line(&self) -> u8 {
        self.pin
    }

    /// Configures the pin and returns the HAL handle.
    /// # Example
    /// ```ignore
    /// let mut dr_reset = motor::RESET.init();
    /// dr_reset.set_high();
    /// ```
    pub fn init(&self) -> Pin {
        let mut pin = Pin::new(self.port, self.pin, self.mode);
        if let Some(pull) = self.pull {
            pin.pull(pull);
        }
        pin
    }
}
