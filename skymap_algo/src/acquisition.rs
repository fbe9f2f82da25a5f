// Implements the frame acquisition state machine: reconstructs DCF77 bits from
// the pulse widths on the time-signal line and hands complete frames to the
// decoder at every minute mark.

// Key Features:
// - Classifies pulses (100 ms = 0, 200 ms = 1) and one-second gaps.
// - Detects the minute mark as a counter overflow (no pulse in second 59).
// - Silently resynchronizes on any timing outside the expected bands.
// - Never exposes a partial frame: decoding happens only with 59 bits collected.

// Detailed Operation:
// A saturating elapsed-time counter is advanced by the coarse tick outside of
// this module. `poll` receives a snapshot of it together with the line level and
// tells the caller how to update the counter. The counter is restarted on every
// rising edge, so on a falling edge it holds the pulse width and on a rising
// edge the time since the previous second started. A rejected pulse presets the
// counter to the 200 ms mark so that an overflow after the missing second-59
// pulse still lines up with the minute boundary.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::SignalTiming;
use crate::frame::{Frame, FrameError, FRAME_BITS};

/// What the caller has to do with the elapsed-time counter after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterCommand {
    Keep,
    /// Restart counting from 0
    Restart,
    /// Load the given value
    Preset(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionState {
    /// Waiting for a minute mark
    Resync,
    /// Bits announced so far
    Collecting(u8),
    /// All 59 bits in, waiting for the minute mark
    Complete,
}

/// A frame that passed validation at a minute mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedMinute {
    pub frame: Frame,
    /// Minutes since the epoch
    pub minutes: u32,
}

/// Result of one poll iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionPoll {
    pub counter: CounterCommand,
    pub edge: Option<Edge>,
    /// Set at a minute mark that closed a complete frame
    pub frame: Option<Result<ReceivedMinute, FrameError>>,
}

pub struct FrameAcquisition {
    timing: SignalTiming,
    frame: Frame,
    /// Bits announced by rising edges in the current minute (0..=59)
    bit_count: u8,
    /// Last sampled line level
    level: bool,
}

impl FrameAcquisition {
    pub fn new(timing: SignalTiming, initial_level: bool) -> Self {
        Self {
            timing,
            frame: Frame::new(),
            bit_count: 0,
            level: initial_level,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        match self.bit_count as usize {
            0 => AcquisitionState::Resync,
            FRAME_BITS => AcquisitionState::Complete,
            n => AcquisitionState::Collecting(n as u8),
        }
    }

    /// One iteration of the polling loop.
    ///
    /// # Arguments
    /// * `level` - current level of the time-signal line
    /// * `elapsed` - snapshot of the elapsed-time counter, in coarse ticks
    pub fn poll(&mut self, level: bool, elapsed: u8) -> AcquisitionPoll {
        let mut out = AcquisitionPoll {
            counter: CounterCommand::Keep,
            edge: None,
            frame: None,
        };

        let overflow = elapsed >= self.timing.overflow;
        if overflow {
            if self.bit_count as usize == FRAME_BITS {
                if self.level {
                    debug!("DCF: minute mark with signal still active, frame dropped");
                } else {
                    out.frame = Some(self.decode());
                }
            }
            self.bit_count = 0;
        }

        if level != self.level {
            self.level = level;
            if level {
                self.on_rising(elapsed, overflow);
                out.counter = CounterCommand::Restart;
                out.edge = Some(Edge::Rising);
            } else {
                out.counter = self.on_falling(elapsed);
                out.edge = Some(Edge::Falling);
            }
        }

        out
    }

    fn on_rising(&mut self, elapsed: u8, overflow: bool) {
        let t = &self.timing;
        let regular_second = elapsed >= t.gap_min && elapsed < t.gap_max;
        let collecting = self.bit_count > 0 && (self.bit_count as usize) < FRAME_BITS;

        if overflow || (collecting && regular_second) {
            self.bit_count += 1;
        } else {
            if self.bit_count > 0 {
                debug!("DCF: second gap of {} ticks, resync", elapsed);
            }
            self.bit_count = 0;
        }
    }

    fn on_falling(&mut self, elapsed: u8) -> CounterCommand {
        let t = &self.timing;
        if self.bit_count > 0 && elapsed >= t.pulse_min && elapsed < t.pulse_max {
            self.frame
                .set(self.bit_count as usize - 1, elapsed >= t.one_min);
            CounterCommand::Keep
        } else {
            if self.bit_count > 0 {
                debug!("DCF: pulse of {} ticks, resync", elapsed);
            }
            self.bit_count = 0;
            CounterCommand::Preset(t.resync_preset)
        }
    }

    fn decode(&self) -> Result<ReceivedMinute, FrameError> {
        self.frame.validate()?;
        Ok(ReceivedMinute {
            frame: self.frame,
            minutes: self.frame.minutes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameTime;

    const T: SignalTiming = SignalTiming::DCF77;

    #[test]
    fn minute_mark_starts_collection() {
        let mut acq = FrameAcquisition::new(T, false);
        let out = acq.poll(false, T.overflow);
        assert_eq!(out.frame, None);
        let out = acq.poll(true, T.overflow);
        assert_eq!(out.edge, Some(Edge::Rising));
        assert_eq!(out.counter, CounterCommand::Restart);
        assert_eq!(acq.state(), AcquisitionState::Collecting(1));
    }

    #[test]
    fn rising_edge_without_minute_mark_stays_in_resync() {
        let mut acq = FrameAcquisition::new(T, false);
        acq.poll(true, 50);
        assert_eq!(acq.state(), AcquisitionState::Resync);
    }

    #[test]
    fn bad_pulse_width_presets_counter() {
        let mut acq = FrameAcquisition::new(T, false);
        acq.poll(true, T.overflow);
        let out = acq.poll(false, T.pulse_max);
        assert_eq!(out.counter, CounterCommand::Preset(T.resync_preset));
        assert_eq!(acq.state(), AcquisitionState::Resync);
    }

    #[test]
    fn short_and_long_pulses_decode_to_bits() {
        let mut acq = FrameAcquisition::new(T, false);
        acq.poll(true, T.overflow);
        assert_eq!(acq.poll(false, 5).counter, CounterCommand::Keep);
        acq.poll(true, 50);
        acq.poll(false, 10);
        assert_eq!(acq.state(), AcquisitionState::Collecting(2));
        assert!(!acq.frame.bit(0));
        assert!(acq.frame.bit(1));
    }

    /// Pulse width in ticks encoding `bit`
    fn width(bit: bool) -> u8 {
        if bit {
            10
        } else {
            5
        }
    }

    /// Runs from a minute mark up to the 59th rising edge, leaving the last
    /// pulse open.
    fn collect_minute(acq: &mut FrameAcquisition, frame: &Frame) {
        acq.poll(false, T.overflow);
        for second in 0..FRAME_BITS {
            let elapsed = if second == 0 { T.overflow } else { 50 };
            acq.poll(true, elapsed);
            if second + 1 < FRAME_BITS {
                acq.poll(false, width(frame.bit(second)));
            }
        }
    }

    fn test_frame() -> Frame {
        Frame::encode(&FrameTime {
            year: 24,
            month: 3,
            day: 9,
            weekday: 6,
            hour: 21,
            minute: 7,
            summer_time: false,
        })
    }

    #[test]
    fn minute_mark_with_line_active_drops_frame() {
        let frame = test_frame();
        let mut acq = FrameAcquisition::new(T, false);
        collect_minute(&mut acq, &frame);
        assert_eq!(acq.state(), AcquisitionState::Complete);

        // Line still high when the counter saturates
        let out = acq.poll(true, T.overflow);
        assert_eq!(out.frame, None);
        assert_eq!(out.edge, None);
        assert_eq!(acq.state(), AcquisitionState::Resync);
    }

    #[test]
    fn minute_mark_with_line_inactive_decodes() {
        let frame = test_frame();
        let mut acq = FrameAcquisition::new(T, false);
        collect_minute(&mut acq, &frame);
        acq.poll(false, width(frame.bit(FRAME_BITS - 1)));

        let out = acq.poll(false, T.overflow);
        let minute = out.frame.map(|res| res.map(|m| m.frame));
        assert_eq!(minute, Some(Ok(frame)));
        assert_eq!(acq.state(), AcquisitionState::Resync);
    }

    #[test]
    fn early_second_resyncs() {
        let mut acq = FrameAcquisition::new(T, false);
        acq.poll(true, T.overflow);
        acq.poll(false, 5);
        acq.poll(true, T.gap_min - 1);
        assert_eq!(acq.state(), AcquisitionState::Resync);
    }
}
