// Periodic update interrupts pacing the sky map: the coarse tick on TIM3
// advances the elapsed-time counters, the fine tick on TIM2 paces the motor.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    pac::{TIM2, TIM3},
    timer::{
        Alignment, CaptureCompareDma, CountDir, Timer, TimerConfig, TimerInterrupt, UpdateReqSrc,
    },
};

/// Free-running up-counter, only the update event is used.
fn tick_config() -> TimerConfig {
    TimerConfig {
        one_pulse_mode: false,
        update_request_source: UpdateReqSrc::Any,
        auto_reload_preload: true,
        alignment: Alignment::Edge,
        capture_compare_dma: CaptureCompareDma::Update,
        direction: CountDir::Up,
    }
}

/// Coarse tick: 50 Hz on TIM3.
pub struct CoarseTick {
    tim: Timer<TIM3>,
}

impl CoarseTick {
    pub fn new(tim3: TIM3, clock_cfg: &Clocks, freq: f32) -> Self {
        let mut timer = Timer::new_tim3(tim3, freq, tick_config(), clock_cfg);
        timer.enable_interrupt(TimerInterrupt::Update);
        timer.enable();
        CoarseTick { tim: timer }
    }

    /// Acknowledges the update interrupt
    #[inline(always)]
    pub fn clear(&mut self) {
        self.tim.clear_interrupt(TimerInterrupt::Update);
    }
}

/// Fine tick: step pacing rate on TIM2 (32-bit, so slow rates keep a fine period).
pub struct FineTick {
    tim: Timer<TIM2>,
}

impl FineTick {
    pub fn new(tim2: TIM2, clock_cfg: &Clocks, freq: f32) -> Self {
        let mut timer = Timer::new_tim2(tim2, freq, tick_config(), clock_cfg);
        timer.enable_interrupt(TimerInterrupt::Update);
        timer.enable();
        FineTick { tim: timer }
    }

    /// Acknowledges the update interrupt
    #[inline(always)]
    pub fn clear(&mut self) {
        self.tim.clear_interrupt(TimerInterrupt::Update);
    }
}
