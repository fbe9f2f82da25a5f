// Correction history: what the display believed right before each correction.
//
// The core only writes here; nothing in the control path reads the log back.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::math_integer::fifo_buffer::BufferFIFO;

/// Slots kept per record kind.
pub const LOG_SLOTS: usize = 10;

/// Snapshot taken when a valid frame replaced the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DcfRecord {
    pub current_angle: u16,
    /// Target before the frame was applied
    pub target_before: u16,
    pub minutes: u32,
}

/// Snapshot taken when the home sensor re-anchored the position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncRecord {
    /// Position believed right before the correction
    pub current_angle: u16,
    pub target_angle: u16,
}

/// Write-only sink for correction events.
pub trait TelemetrySink {
    fn log_dcf(&mut self, record: &DcfRecord);
    fn log_sync(&mut self, record: &SyncRecord);
}

/// RAM correction log: the last `N` records of each kind plus running totals.
pub struct CorrectionLog<const N: usize = LOG_SLOTS> {
    dcf: BufferFIFO<DcfRecord, N>,
    sync: BufferFIFO<SyncRecord, N>,
    /// Accepted frames since power-up (wraps)
    dcf_total: u16,
    /// Home corrections since power-up (wraps)
    sync_total: u16,
}

impl<const N: usize> CorrectionLog<N> {
    pub fn new() -> Self {
        Self {
            dcf: BufferFIFO::new(),
            sync: BufferFIFO::new(),
            dcf_total: 0,
            sync_total: 0,
        }
    }

    pub fn dcf_total(&self) -> u16 {
        self.dcf_total
    }

    pub fn sync_total(&self) -> u16 {
        self.sync_total
    }

    /// Frame record `age` entries back (0 = latest).
    pub fn dcf(&self, age: usize) -> Option<DcfRecord> {
        self.dcf.get(age)
    }

    /// Home record `age` entries back (0 = latest).
    pub fn sync(&self, age: usize) -> Option<SyncRecord> {
        self.sync.get(age)
    }
}

impl<const N: usize> Default for CorrectionLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TelemetrySink for CorrectionLog<N> {
    fn log_dcf(&mut self, record: &DcfRecord) {
        self.dcf_total = self.dcf_total.wrapping_add(1);
        self.dcf.write(*record);
    }

    fn log_sync(&mut self, record: &SyncRecord) {
        self.sync_total = self.sync_total.wrapping_add(1);
        self.sync.write(*record);
    }
}
