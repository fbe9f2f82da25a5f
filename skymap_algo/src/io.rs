// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Digital inputs sampled by the core logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Demodulated output of the time-signal receiver (high during a pulse)
    TimeSignal,
    /// Home position sensor (falls when the home mark is reached)
    Home,
}

/// Discrete status outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// No frame accepted during the last rotation
    Alarm,
    /// Follows the time-signal line
    Signal,
    /// Motor is stepping
    Step,
}

/// Board capabilities the sky map logic needs.
/// Implemented by the hardware board and by simulated boards in tests.
pub trait BoardIo {
    /// Energizes motor output channel `channel` (0..4) alone, `None` releases all.
    fn set_motor_phase(&mut self, channel: Option<u8>);

    /// Logical level of an input line.
    fn read_line(&self, line: Line) -> bool;

    /// Switches a status indicator.
    fn set_indicator(&mut self, indicator: Indicator, on: bool);
}
