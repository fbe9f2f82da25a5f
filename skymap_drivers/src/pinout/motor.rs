//! Motor driver pins. The bridge inputs are driven as plain outputs, one channel at a time.
use super::PinDef;
use hal::gpio::{PinMode, Port};

/// Reset pin for the motor driver, held high while running
pub const RESET: PinDef = PinDef::new(Port::B, 2, PinMode::Output);

/// Enable pin for the motor driver, held high while running
pub const ENABLE: PinDef = PinDef::new(Port::A, 4, PinMode::Output);

/// Bridge inputs in channel order: A1, B1, A2, B2.
/// Walking the channels 0..4 energizes A+, B+, A-, B- (wave drive).
pub const PHASES: [PinDef; 4] = [
    PinDef::new(Port::A, 1, PinMode::Output),
    PinDef::new(Port::B, 10, PinMode::Output),
    PinDef::new(Port::A, 0, PinMode::Output),
    PinDef::new(Port::B, 11, PinMode::Output),
];
