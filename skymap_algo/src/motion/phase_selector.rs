// Implements the PhaseSelector module, mapping the four logical full-step
// phases onto the four motor output channels.

// Key Features:
// - Initializes the PhaseSelector with a specific phase pattern.
// - Resolves the output channel for a logical phase.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use super::MotorPhase;

/// Order in which the output channels are energized for forward motion.
/// Each 2-bit group holds the channel of one logical phase, phase A in the lowest bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PhasePattern {
    ABCD = 0b11100100, // {0, 1, 2, 3}
    ACDB = 0b01111000, // {0, 2, 3, 1}
    ADBC = 0b10011100, // {0, 3, 1, 2}
    DCAB = 0b01001011, // {3, 2, 0, 1}
    DCBA = 0b00011011, // {3, 2, 1, 0}
}

/// Struct to handle the re-mapping of motor channels
pub struct PhaseSelector {
    /// Output channel of each logical phase
    idxs: [u8; 4],
}

impl PhaseSelector {
    /// Creates a new PhaseSelector with the specified phase pattern
    pub const fn new(pattern: PhasePattern) -> PhaseSelector {
        PhaseSelector {
            idxs: Self::unpack(pattern as u8),
        }
    }

    /// Output channel driven for `phase`
    #[inline(always)]
    pub fn channel(&self, phase: MotorPhase) -> u8 {
        self.idxs[phase.index()]
    }

    const fn unpack(mode: u8) -> [u8; 4] {
        [
            mode & 0b11,        // Channel of phase A
            (mode >> 2) & 0b11, // Channel of phase B
            (mode >> 4) & 0b11, // Channel of phase C
            (mode >> 6) & 0b11, // Channel of phase D
        ]
    }
}
