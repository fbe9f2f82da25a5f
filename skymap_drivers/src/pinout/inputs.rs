//! Sensor inputs. Both lines are open-collector outputs pulled up on the board side.
use super::PinDef;
use hal::gpio::{PinMode, Port, Pull};

/// Demodulated DCF77 receiver output, high during a carrier reduction pulse
pub const TIME_SIGNAL: PinDef = PinDef::new(Port::B, 7, PinMode::Input).with_pull(Pull::Up);

/// Home position sensor, pulled low while the home mark is in front of it
pub const HOME: PinDef = PinDef::new(Port::A, 15, PinMode::Input).with_pull(Pull::Up);
