// Hardware-free core of the rotating sky map: DCF77 frame acquisition and
// decoding, minutes-to-angle conversion, motion scheduling and homing.
//
// The firmware drives it from three contexts. The coarse tick advances the
// elapsed-time counters, the fine tick calls `MotionScheduler::tick`, and the
// polling loop feeds `FrameAcquisition::poll` and `HomeMonitor::confirm` and
// commits their results with both ticks masked.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod math_integer;

pub mod frame;
pub mod angle;
pub mod acquisition;

pub mod io;
pub mod motion;
pub mod homing;
pub mod telemetry;

pub use acquisition::{AcquisitionPoll, AcquisitionState, CounterCommand, Edge, FrameAcquisition};
pub use angle::minutes_to_angle;
pub use config::{Calibration, SignalTiming};
pub use frame::{Frame, FrameError, FrameTime};
pub use homing::HomeMonitor;
pub use io::{BoardIo, Indicator, Line};
pub use math_integer::counter::SaturatingCounter;
pub use motion::{Direction, Motion, MotionScheduler, MotorPhase, PhasePattern};
pub use telemetry::{CorrectionLog, DcfRecord, SyncRecord, TelemetrySink};
