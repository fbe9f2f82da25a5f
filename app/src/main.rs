#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use hal::{self, clocks::Clocks, pac};

use skymap_algo::{
    config::{COARSE_TICK_HZ, HOME_DEBOUNCE_TICKS},
    minutes_to_angle, BoardIo, Calibration, CorrectionLog, CounterCommand, Edge,
    FrameAcquisition, HomeMonitor, Indicator, Line, MotionScheduler, PhasePattern,
    SaturatingCounter, SignalTiming, TelemetrySink,
};

use cortex_m;

/// Mechanics of the installed display
const CALIBRATION: Calibration = Calibration::SKYMAP;
/// Coil order of the installed motor
const WIRING: PhasePattern = PhasePattern::DCBA;

#[rtic::app(device = pac, peripherals = true)]
mod app {
    use super::*;

    use skymap_drivers::{Board, CoarseTick, FineTick};

    #[shared]
    struct Shared {
        motion: MotionScheduler,
        board: Board,
        signal_timer: SaturatingCounter, // Coarse ticks since the last time-signal edge
        home_timer: SaturatingCounter,   // Coarse ticks since the last home sensor edge
    }

    #[local]
    struct Local {
        coarse: CoarseTick,
        fine: FineTick,
        acquisition: FrameAcquisition,
        home: HomeMonitor,
        log: CorrectionLog,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        clock_cfg
            .setup()
            .unwrap_or_else(|_| defmt::panic!("SYSTEM: clock setup failed"));

        let sysclk_freq = clock_cfg.sysclk(); // System clock frequency in Hz
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);

        let board = Board::new();
        let timing = SignalTiming::DCF77;
        let acquisition = FrameAcquisition::new(timing, board.read_line(Line::TimeSignal));
        let home = HomeMonitor::new(board.read_line(Line::Home));
        let motion = MotionScheduler::new(CALIBRATION, WIRING);

        let fine_freq = CALIBRATION.fine_tick_hz();
        defmt::info!(
            "SYSTEM: {} steps per rotation, {} ticks per step, fine tick {} Hz",
            CALIBRATION.steps_per_rotation,
            CALIBRATION.ticks_per_step,
            fine_freq
        );

        let coarse = CoarseTick::new(dp.TIM3, &clock_cfg, COARSE_TICK_HZ);
        let fine = FineTick::new(dp.TIM2, &clock_cfg, fine_freq);

        (
            Shared {
                motion,
                board,
                signal_timer: SaturatingCounter::new(timing.overflow),
                home_timer: SaturatingCounter::new(HOME_DEBOUNCE_TICKS),
            },
            Local {
                coarse,
                fine,
                acquisition,
                home,
                log: CorrectionLog::new(),
            },
        )
    }

    /// Polling loop: frame acquisition, decoding and home confirmation.
    /// Every commit into the motion state happens inside a lock, which masks
    /// both ticks.
    #[idle(shared = [motion, board, signal_timer, home_timer], local = [acquisition, home, log])]
    fn idle(mut cx: idle::Context) -> ! {
        let acquisition = cx.local.acquisition;
        let home = cx.local.home;
        let log = cx.local.log;

        loop {
            // Time signal
            let level = cx.shared.board.lock(|board| board.read_line(Line::TimeSignal));
            let elapsed = cx.shared.signal_timer.lock(|timer| timer.value());
            let out = acquisition.poll(level, elapsed);

            match out.counter {
                CounterCommand::Keep => {}
                CounterCommand::Restart => cx.shared.signal_timer.lock(|timer| timer.reset()),
                CounterCommand::Preset(value) => {
                    cx.shared.signal_timer.lock(|timer| timer.preset(value))
                }
            }

            if let Some(edge) = out.edge {
                cx.shared
                    .board
                    .lock(|board| board.set_indicator(Indicator::Signal, edge == Edge::Rising));
            }

            match out.frame {
                Some(Ok(minute)) => {
                    let target = minutes_to_angle(minute.minutes, &CALIBRATION);
                    let record = cx
                        .shared
                        .motion
                        .lock(|motion| motion.accept_frame(minute.minutes, target));
                    log.log_dcf(&record);
                    defmt::info!(
                        "DCF: {} = {} min, target {} -> {} at {}",
                        minute.frame.time(),
                        minute.minutes,
                        record.target_before,
                        target,
                        record.current_angle
                    );
                }
                Some(Err(err)) => defmt::warn!("DCF: frame rejected: {}", err),
                None => {}
            }

            // Home sensor, once its line has been quiet for the debounce time
            let settled = cx.shared.home_timer.lock(|timer| timer.is_saturated());
            if settled {
                let level = cx.shared.board.lock(|board| board.read_line(Line::Home));
                if let Some(record) = cx.shared.motion.lock(|motion| home.confirm(level, motion)) {
                    log.log_sync(&record);
                    defmt::info!(
                        "SYNC: home at {} (target {}), corrections so far: {}",
                        record.current_angle,
                        record.target_angle,
                        log.sync_total()
                    );
                }
            }
        }
    }

    #[task(binds = TIM3, priority = 2, shared = [signal_timer, home_timer], local = [coarse])]
    fn coarse_tick(mut cx: coarse_tick::Context) {
        cx.local.coarse.clear();
        cx.shared.signal_timer.lock(|timer| timer.tick());
        cx.shared.home_timer.lock(|timer| timer.tick());
    }

    #[task(binds = TIM2, priority = 2, shared = [motion, board], local = [fine])]
    fn fine_tick(mut cx: fine_tick::Context) {
        cx.local.fine.clear();
        cx.shared.motion.lock(|motion| {
            cx.shared.board.lock(|board| {
                motion.tick(board);
            })
        });
    }

    #[task(binds = EXTI15_10, priority = 2, shared = [board, home_timer])]
    fn home_edge(mut cx: home_edge::Context) {
        cx.shared.board.lock(|board| board.clear_home_interrupt());
        // Any edge restarts the debounce window
        cx.shared.home_timer.lock(|timer| timer.reset());
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
