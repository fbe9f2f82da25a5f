// Calibration and timing configuration of the sky map.
//
// Every constant used by the decoder and the motion scheduler is derived here
// from physical quantities (gear ratio, reference rotation period, tick
// periods), so another mechanism or another timer setup only needs new inputs.

// Key Features:
// - Calibration: steps per rotation, rotations per century, home offset and the
//   reduced minutes-to-angle ratio computed at compile time.
// - SignalTiming: DCF77 pulse and gap bands expressed in coarse ticks.
// - Tick periods for the coarse (20 ms) and fine (step pacing) timers.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Solar days in one Julian century, the reference period of the angle ratio.
pub const DAYS_PER_CENTURY: u32 = 36525;
/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;
/// Minutes in one Julian century.
pub const MINUTES_PER_CENTURY: u32 = DAYS_PER_CENTURY * MINUTES_PER_DAY;
/// Seconds in one Julian century.
pub const SECONDS_PER_CENTURY: u64 = MINUTES_PER_CENTURY as u64 * 60;

/// Period of the coarse tick driving the elapsed-time counters.
pub const COARSE_TICK_MS: u16 = 20;
/// Coarse tick rate handed to the timer driver.
pub const COARSE_TICK_HZ: f32 = 1000.0 / COARSE_TICK_MS as f32;
/// Time the home sensor has to stay quiet before its level is trusted.
pub const HOME_DEBOUNCE_MS: u16 = 500;
/// Debounce threshold of the home sensor counter, in coarse ticks.
pub const HOME_DEBOUNCE_TICKS: u8 = ms_to_ticks(HOME_DEBOUNCE_MS, COARSE_TICK_MS);

/// Mechanical and timebase calibration of the display.
///
/// The display turns once per sidereal day. Over one Julian century
/// (36525 solar days) it makes `rotations_per_century` full turns, so
///
/// ```text
/// angle = minutes * (rotations_per_century * steps_per_rotation)
///                 / (DAYS_PER_CENTURY * MINUTES_PER_DAY)   mod steps_per_rotation
/// ```
///
/// `angle_mul / angle_div` is that ratio reduced by its greatest common divisor,
/// which keeps `minutes * angle_mul` inside `u64` for any minute count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// Motor steps for one full display rotation (gear train).
    pub steps_per_rotation: u16,
    /// Display rotations per Julian century (sidereal days per century).
    pub rotations_per_century: u32,
    /// Angle reported by the home sensor when it is crossed moving forward.
    pub home_offset: u16,
    /// Fine ticks per target angle increment.
    pub ticks_per_step: u16,
    /// Reduced numerator of the minutes-to-angle ratio (K1).
    pub angle_mul: u64,
    /// Reduced denominator of the minutes-to-angle ratio (K2).
    pub angle_div: u64,
}

impl Calibration {
    /// The shipped instrument: 49421 steps per rotation, 36625 sidereal days per
    /// century, home sensor at step 14144 and 122 fine ticks per step.
    pub const SKYMAP: Calibration = Calibration::new(49421, 36625, 14144, 122);

    /// Builds a calibration from the gear ratio and the reference period.
    pub const fn new(
        steps_per_rotation: u16,
        rotations_per_century: u32,
        home_offset: u16,
        ticks_per_step: u16,
    ) -> Self {
        let mul = rotations_per_century as u64 * steps_per_rotation as u64;
        let div = MINUTES_PER_CENTURY as u64;
        let divisor = gcd(mul, div);
        Self {
            steps_per_rotation,
            rotations_per_century,
            home_offset: home_offset % steps_per_rotation,
            ticks_per_step,
            angle_mul: mul / divisor,
            angle_div: div / divisor,
        }
    }

    /// Fine tick rate so that `ticks_per_step` ticks pass per target increment
    /// while the display keeps sidereal time.
    pub fn fine_tick_hz(&self) -> f32 {
        let ticks_per_century = self.steps_per_rotation as f64
            * self.ticks_per_step as f64
            * self.rotations_per_century as f64;
        (ticks_per_century / SECONDS_PER_CENTURY as f64) as f32
    }

    /// Duration of one display rotation in minutes (fractional).
    pub fn rotation_period_minutes(&self) -> f32 {
        (MINUTES_PER_CENTURY as f64 / self.rotations_per_century as f64) as f32
    }
}

/// Pulse and gap bands of the time signal, in coarse ticks.
///
/// Pulse widths are measured from the rising edge to the falling edge, gaps from
/// one rising edge to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalTiming {
    /// Shortest accepted pulse.
    pub pulse_min: u8,
    /// Pulses at least this long encode a `1`.
    pub one_min: u8,
    /// Pulses must be shorter than this.
    pub pulse_max: u8,
    /// Shortest rising-to-rising period of a regular second.
    pub gap_min: u8,
    /// Rising-to-rising period of a regular second must be shorter than this.
    pub gap_max: u8,
    /// No edge for this long marks the minute boundary; also the counter limit.
    pub overflow: u8,
    /// Counter value loaded after a rejected pulse.
    pub resync_preset: u8,
}

impl SignalTiming {
    /// DCF77 bands for the 20 ms coarse tick.
    pub const DCF77: SignalTiming = SignalTiming::from_tick_ms(COARSE_TICK_MS);

    /// Converts the DCF77 millisecond bands to ticks of `tick_ms`.
    pub const fn from_tick_ms(tick_ms: u16) -> Self {
        Self {
            pulse_min: ms_to_ticks(40, tick_ms),
            one_min: ms_to_ticks(140, tick_ms),
            pulse_max: ms_to_ticks(240, tick_ms),
            gap_min: ms_to_ticks(900, tick_ms),
            gap_max: ms_to_ticks(1100, tick_ms),
            overflow: ms_to_ticks(1800, tick_ms),
            resync_preset: ms_to_ticks(200, tick_ms),
        }
    }
}

/// Whole ticks in `ms` (truncating).
pub const fn ms_to_ticks(ms: u16, tick_ms: u16) -> u8 {
    (ms / tick_ms) as u8
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let rem = a % b;
        a = b;
        b = rem;
    }
    a
}
