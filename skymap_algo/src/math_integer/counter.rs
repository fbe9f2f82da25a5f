// Saturating tick counter shared between a periodic tick and the polling loop.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Counts ticks up to `limit` and stays there until reset. Never wraps.
#[derive(Debug, Clone, Copy)]
pub struct SaturatingCounter {
    value: u8,
    limit: u8,
}

impl SaturatingCounter {
    pub const fn new(limit: u8) -> Self {
        Self { value: 0, limit }
    }

    /// Tick handler body: one increment unless saturated.
    #[inline(always)]
    pub fn tick(&mut self) {
        if self.value < self.limit {
            self.value += 1;
        }
    }

    #[inline(always)]
    pub fn value(&self) -> u8 {
        self.value
    }

    #[inline(always)]
    pub fn is_saturated(&self) -> bool {
        self.value >= self.limit
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Loads an arbitrary start value, clamped to the limit.
    #[inline(always)]
    pub fn preset(&mut self, value: u8) {
        self.value = value.min(self.limit);
    }
}
