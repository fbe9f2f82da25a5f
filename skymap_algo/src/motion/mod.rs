// Implements the motion scheduler: keeps the display target moving at sidereal
// rate and steps the motor toward it along the shorter way around the dial.

// Key Features:
// - Auto-advances the target angle once per `ticks_per_step` fine ticks after
//   the first valid frame.
// - Chooses the step direction from the forward circular distance.
// - Seeks forward blindly until the home sensor has anchored the position.
// - Latches the alarm when the target completes a rotation without a fresh frame.
// - Commits frame and home corrections as single updates of several fields.

// Detailed Operation:
// `tick` is the body of the fine timer interrupt and runs in constant time.
// `accept_frame` and `home` are called by the polling loop with both ticks
// masked, so the interrupt never sees a target without its FirstValid flag or
// a position without its FirstSync flag.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

mod phase_selector;

pub use phase_selector::{PhasePattern, PhaseSelector};

use crate::config::Calibration;
use crate::io::{BoardIo, Indicator};
use crate::math_integer::circular::{circular_dec, circular_distance, circular_inc};
use crate::telemetry::{DcfRecord, SyncRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Backward,
}

/// One of the four full-step states of the motor, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MotorPhase {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl MotorPhase {
    /// Neighbouring phase in `direction`
    pub fn next(self, direction: Direction) -> Self {
        let idx = self as u8;
        match direction {
            Direction::Forward => Self::from_index(idx + 1),
            Direction::Backward => Self::from_index(idx + 3),
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    fn from_index(idx: u8) -> Self {
        match idx & 0b11 {
            0 => MotorPhase::A,
            1 => MotorPhase::B,
            2 => MotorPhase::C,
            _ => MotorPhase::D,
        }
    }
}

/// What the motor did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    /// Position unknown, stepping forward toward the home sensor
    Seeking,
    Stepped(Direction),
    /// On target, coils released
    Stopped,
}

pub struct MotionScheduler {
    cal: Calibration,
    selector: PhaseSelector,

    current: u16, // Believed motor position (0..steps_per_rotation)
    target: u16,  // Where the display should point now
    /// Target of the last accepted frame, reaching it again raises the alarm
    alarm_angle: u16,

    direction: Direction, // Direction of the last step
    phase: MotorPhase,    // Energized phase

    sub_ticks: u16, // Fine ticks since the last target increment

    first_valid: bool, // A frame has been accepted
    first_sync: bool,  // The home sensor has anchored `current`
    alarm: bool,       // No recent frame correction
}

impl MotionScheduler {
    /// Power-up state: target at the home offset, position unknown, alarm raised.
    pub fn new(cal: Calibration, pattern: PhasePattern) -> Self {
        Self {
            cal,
            selector: PhaseSelector::new(pattern),
            current: 0,
            target: cal.home_offset,
            alarm_angle: 0,
            direction: Direction::Forward,
            phase: MotorPhase::A,
            sub_ticks: 0,
            first_valid: false,
            first_sync: false,
            alarm: true,
        }
    }

    /// Fine tick body: advance the target, then move one step toward it.
    pub fn tick<B: BoardIo>(&mut self, io: &mut B) -> Motion {
        if self.first_valid {
            self.advance_target();
        }

        let motion = if self.first_sync {
            self.seek(io)
        } else {
            // Absolute position unknown: keep turning until the home mark shows up
            self.energize(self.phase.next(Direction::Forward), io);
            io.set_indicator(Indicator::Step, true);
            Motion::Seeking
        };

        io.set_indicator(Indicator::Alarm, self.alarm);
        motion
    }

    /// Step decision: one step along the shorter way to the target, or release
    /// the coils once there.
    pub fn seek<B: BoardIo>(&mut self, io: &mut B) -> Motion {
        let n = self.cal.steps_per_rotation;
        let diff = circular_distance(self.current, self.target, n);

        if diff == 0 {
            io.set_motor_phase(None);
            io.set_indicator(Indicator::Step, false);
            return Motion::Stopped;
        }

        // Forward while the target is less than half a turn ahead
        let direction = if (diff as u32) * 2 < n as u32 {
            Direction::Forward
        } else {
            Direction::Backward
        };

        self.current = match direction {
            Direction::Forward => circular_inc(self.current, n),
            Direction::Backward => circular_dec(self.current, n),
        };
        self.direction = direction;
        self.energize(self.phase.next(direction), io);
        io.set_indicator(Indicator::Step, true);

        Motion::Stepped(direction)
    }

    /// Replaces the target with the angle of a freshly validated frame.
    /// Must run with the fine tick masked.
    pub fn accept_frame(&mut self, minutes: u32, target: u16) -> DcfRecord {
        let record = DcfRecord {
            current_angle: self.current,
            target_before: self.target,
            minutes,
        };
        let target = target % self.cal.steps_per_rotation;

        self.sub_ticks = 0;
        self.target = target;
        self.alarm_angle = target;
        self.first_valid = true;
        self.alarm = false;

        record
    }

    /// Re-anchors the position at the home offset if the last step went forward.
    /// Must run with the fine tick masked.
    pub fn home(&mut self) -> Option<SyncRecord> {
        if self.direction != Direction::Forward {
            return None;
        }
        let record = SyncRecord {
            current_angle: self.current,
            target_angle: self.target,
        };
        self.current = self.cal.home_offset;
        self.first_sync = true;
        Some(record)
    }

    fn advance_target(&mut self) {
        self.sub_ticks += 1;
        if self.sub_ticks < self.cal.ticks_per_step {
            return;
        }
        self.sub_ticks = 0;
        self.target = circular_inc(self.target, self.cal.steps_per_rotation);
        if self.target == self.alarm_angle {
            self.alarm = true;
        }
    }

    #[inline(always)]
    fn energize<B: BoardIo>(&mut self, phase: MotorPhase, io: &mut B) {
        self.phase = phase;
        io.set_motor_phase(Some(self.selector.channel(phase)));
    }

    pub fn current_angle(&self) -> u16 {
        self.current
    }

    pub fn target_angle(&self) -> u16 {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn first_valid(&self) -> bool {
        self.first_valid
    }

    pub fn first_sync(&self) -> bool {
        self.first_sync
    }

    pub fn alarm(&self) -> bool {
        self.alarm
    }

    pub fn calibration(&self) -> &Calibration {
        &self.cal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Line;

    #[derive(Default)]
    struct Outputs {
        channel: Option<u8>,
        step: bool,
        alarm: bool,
    }

    impl BoardIo for Outputs {
        fn set_motor_phase(&mut self, channel: Option<u8>) {
            self.channel = channel;
        }

        fn read_line(&self, _line: Line) -> bool {
            true
        }

        fn set_indicator(&mut self, indicator: Indicator, on: bool) {
            match indicator {
                Indicator::Step => self.step = on,
                Indicator::Alarm => self.alarm = on,
                Indicator::Signal => {}
            }
        }
    }

    fn synced(cal: Calibration) -> MotionScheduler {
        let mut motion = MotionScheduler::new(cal, PhasePattern::ABCD);
        assert!(motion.home().is_some());
        motion
    }

    #[test]
    fn phase_cycle() {
        let mut phase = MotorPhase::A;
        for _ in 0..4 {
            phase = phase.next(Direction::Forward);
        }
        assert_eq!(phase, MotorPhase::A);
        assert_eq!(MotorPhase::A.next(Direction::Backward), MotorPhase::D);
        assert_eq!(MotorPhase::D.next(Direction::Forward), MotorPhase::A);
    }

    #[test]
    fn seeks_forward_before_home() {
        let mut io = Outputs::default();
        let mut motion = MotionScheduler::new(Calibration::SKYMAP, PhasePattern::ABCD);
        for i in 1..=6u8 {
            assert_eq!(motion.tick(&mut io), Motion::Seeking);
            assert_eq!(io.channel, Some(i % 4));
        }
        assert_eq!(motion.current_angle(), 0);
        assert!(io.alarm);
    }

    #[test]
    fn converges_without_oscillation() {
        let cal = Calibration::new(101, 36625, 0, 122);
        for home in [0u16, 1, 50, 99, 100] {
            for target in 0..101u16 {
                let cal = Calibration::new(101, 36625, home, 122);
                let mut motion = synced(cal);
                motion.accept_frame(0, target);

                let mut io = Outputs::default();
                let mut ticks = 0;
                while motion.current_angle() != target {
                    let _ = motion.seek(&mut io);
                    ticks += 1;
                    assert!(ticks <= cal.steps_per_rotation / 2);
                }
                for _ in 0..10 {
                    assert_eq!(motion.seek(&mut io), Motion::Stopped);
                }
                assert_eq!(io.channel, None);
                assert!(!io.step);
            }
        }
        assert_eq!(cal.steps_per_rotation, 101);
    }

    #[test]
    fn converges_on_the_real_dial() {
        let n = Calibration::SKYMAP.steps_per_rotation;
        for target in [0u16, 1, n / 2 - 1, n / 2, n / 2 + 1, n - 1, 30_000] {
            let mut motion = synced(Calibration::SKYMAP);
            motion.accept_frame(0, target);
            let mut io = Outputs::default();
            let mut ticks = 0u16;
            while motion.seek(&mut io) != Motion::Stopped {
                ticks += 1;
            }
            assert!(ticks <= n / 2);
            assert_eq!(motion.current_angle(), target);
        }
    }

    #[test]
    fn shortest_direction() {
        let cal = Calibration::SKYMAP;
        let mut io = Outputs::default();

        let mut motion = synced(cal);
        motion.accept_frame(0, cal.home_offset + 10);
        assert_eq!(motion.seek(&mut io), Motion::Stepped(Direction::Forward));

        let mut motion = synced(cal);
        motion.accept_frame(0, cal.home_offset - 10);
        assert_eq!(motion.seek(&mut io), Motion::Stepped(Direction::Backward));
        assert_eq!(motion.direction(), Direction::Backward);
        assert_eq!(motion.current_angle(), cal.home_offset - 1);
    }

    #[test]
    fn target_advances_every_ticks_per_step() {
        let cal = Calibration::SKYMAP;
        let mut io = Outputs::default();
        let mut motion = synced(cal);
        motion.accept_frame(0, 100);
        for _ in 0..cal.ticks_per_step - 1 {
            motion.tick(&mut io);
        }
        assert_eq!(motion.target_angle(), 100);
        motion.tick(&mut io);
        assert_eq!(motion.target_angle(), 101);
    }

    #[test]
    fn alarm_after_a_rotation_without_frames() {
        let cal = Calibration::new(50, 36625, 0, 2);
        let mut io = Outputs::default();
        let mut motion = synced(cal);
        assert!(motion.alarm());

        motion.accept_frame(0, 10);
        motion.tick(&mut io);
        assert!(!io.alarm);

        // 50 increments of 2 ticks bring the target back to 10
        for _ in 0..98 {
            motion.tick(&mut io);
        }
        assert!(!motion.alarm());
        motion.tick(&mut io);
        assert!(motion.alarm());
        assert!(io.alarm);

        motion.accept_frame(0, 20);
        assert!(!motion.alarm());
    }

    #[test]
    fn home_is_gated_by_direction() {
        let cal = Calibration::SKYMAP;
        let mut io = Outputs::default();
        let mut motion = synced(cal);
        motion.accept_frame(0, cal.home_offset - 5);
        motion.seek(&mut io);
        let before = motion.current_angle();

        assert_eq!(motion.home(), None);
        assert_eq!(motion.current_angle(), before);
    }
}
