// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::Calibration;

/// Converts minutes since the epoch into the display angle in motor steps.
///
/// `floor(minutes * K1 / K2) mod steps_per_rotation`, the product is taken in
/// `u64` since a century of minutes times K1 does not fit into 32 bits.
#[inline(always)]
pub const fn minutes_to_angle(minutes: u32, cal: &Calibration) -> u16 {
    let steps = minutes as u64 * cal.angle_mul / cal.angle_div;
    (steps % cal.steps_per_rotation as u64) as u16
}
