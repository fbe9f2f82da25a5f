//! RGB status LED, each color sinks current (active low).
use super::PinDef;
use hal::gpio::{PinMode, Port};

/// Red: no frame accepted during the last rotation
pub const ALARM: PinDef = PinDef::new(Port::B, 15, PinMode::Output);

/// Green: motor is stepping
pub const STEP: PinDef = PinDef::new(Port::B, 14, PinMode::Output);

/// Blue: follows the time-signal line
pub const SIGNAL: PinDef = PinDef::new(Port::B, 13, PinMode::Output);
