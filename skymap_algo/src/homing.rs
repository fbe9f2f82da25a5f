// Home sensor debounce confirmation.
//
// The home line interrupt restarts a saturating counter on every edge and the
// coarse tick advances it. Once the counter is saturated the line has been
// quiet for the debounce time and its level can be confirmed here. A confirmed
// high-to-low transition re-anchors the motor position, but only when the
// motor was moving forward: the sensor edge sits at a different angle when the
// mark is crossed backwards.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::motion::MotionScheduler;
use crate::telemetry::SyncRecord;

pub struct HomeMonitor {
    /// Last debounced level of the home line
    confirmed: bool,
}

impl HomeMonitor {
    pub fn new(initial_level: bool) -> Self {
        Self {
            confirmed: initial_level,
        }
    }

    /// Confirms a settled level of the home line.
    ///
    /// Call only while the debounce counter is saturated. Returns the record of
    /// the correction when the position was re-anchored.
    pub fn confirm(&mut self, level: bool, motion: &mut MotionScheduler) -> Option<SyncRecord> {
        let falling = self.confirmed && !level;
        self.confirmed = level;

        if !falling {
            return None;
        }
        let record = motion.home();
        if record.is_none() {
            debug!("SYNC: home mark crossed backwards, ignored");
        }
        record
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }
}
