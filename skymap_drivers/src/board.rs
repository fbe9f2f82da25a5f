// Hardware side of the sky map: motor bridge inputs, sensor lines and the
// status LED, exposed to the core logic through `BoardIo`.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::gpio::{self, Edge, Pin};
use skymap_algo::io::{BoardIo, Indicator, Line};

use crate::pinout;

pub struct Board {
    phases: [Pin; 4],
    time_signal: Pin,
    home: Pin,
    alarm: Pin,
    signal: Pin,
    step: Pin,
}

impl Board {
    /// Configures every pin, enables the motor driver with all channels
    /// released, arms the home sensor interrupt on both edges and shows
    /// the sampled time-signal level on the signal LED.
    pub fn new() -> Self {
        let mut dr_reset = pinout::motor::RESET.init();
        dr_reset.set_high();
        let mut dr_en = pinout::motor::ENABLE.init();
        dr_en.set_high();

        let phases = pinout::motor::PHASES.map(|def| {
            let mut pin = def.init();
            pin.set_low();
            pin
        });

        let mut home = pinout::inputs::HOME.init();
        home.enable_interrupt(Edge::Either);

        let mut board = Board {
            phases,
            time_signal: pinout::inputs::TIME_SIGNAL.init(),
            home,
            alarm: pinout::led::ALARM.init(),
            signal: pinout::led::SIGNAL.init(),
            step: pinout::led::STEP.init(),
        };
        // Alarm is raised until the first frame arrives
        board.set_indicator(Indicator::Alarm, true);
        let signal = board.read_line(Line::TimeSignal);
        board.set_indicator(Indicator::Signal, signal);
        board.set_indicator(Indicator::Step, false);
        board
    }

    /// Acknowledges a pending home sensor edge interrupt
    #[inline(always)]
    pub fn clear_home_interrupt(&mut self) {
        gpio::clear_exti_interrupt(pinout::inputs::HOME.exti_line());
    }
}

impl BoardIo for Board {
    fn set_motor_phase(&mut self, channel: Option<u8>) {
        for (idx, pin) in self.phases.iter_mut().enumerate() {
            if channel == Some(idx as u8) {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
    }

    fn read_line(&self, line: Line) -> bool {
        match line {
            Line::TimeSignal => self.time_signal.is_high(),
            Line::Home => self.home.is_high(),
        }
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        let led = match indicator {
            Indicator::Alarm => &mut self.alarm,
            Indicator::Signal => &mut self.signal,
            Indicator::Step => &mut self.step,
        };
        // LEDs are wired active low
        if on {
            led.set_low();
        } else {
            led.set_high();
        }
    }
}
