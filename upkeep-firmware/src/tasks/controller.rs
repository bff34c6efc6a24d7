//! Main controller task
//!
//! Owns the timer engine and steps it once per millisecond with fresh
//! button levels. Bridge heartbeats and network state are folded into the
//! reporter before each step.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};

use upkeep_core::config::SystemConfig;
use upkeep_core::{BootOutcome, Ports, StepOutcome, TimerEngine, MAX_TIMERS};
use upkeep_drivers::ButtonBank;
use upkeep_hal_rp2040::tone::PwmTone;

use crate::channels::{HEARTBEAT_RECEIVED, NETWORK_STATE};
use crate::ports::{BridgeReporter, QueuedIndicator, QueuedStore};

/// Engine step interval
const STEP_INTERVAL_MS: u64 = 1;

/// Button bank type used by the board
pub type Buttons = ButtonBank<Input<'static>, MAX_TIMERS>;

/// Controller task - main timer loop
#[embassy_executor::task]
pub async fn controller_task(
    config: &'static SystemConfig,
    mut store: QueuedStore,
    mut buttons: Buttons,
    mut tone: PwmTone<'static>,
    mut reporter: BridgeReporter,
) {
    info!("Controller task started");

    let mut indicator = QueuedIndicator;
    let mut last_ms = now_ms();
    let mut engine = TimerEngine::new(config, last_ms);

    let boot = engine.boot(&mut Ports {
        store: &mut store,
        indicator: &mut indicator,
        reporter: &mut reporter,
        tone: &mut tone,
    });
    log_boot(&engine, &boot);

    let mut ticker = Ticker::every(Duration::from_millis(STEP_INTERVAL_MS));
    let mut reported_read_errors: u32 = 0;

    loop {
        ticker.next().await;

        let now = now_ms();
        if HEARTBEAT_RECEIVED.signaled() {
            HEARTBEAT_RECEIVED.reset();
            reporter.heartbeat();
        }
        if let Some(up) = NETWORK_STATE.try_take() {
            reporter.set_network_up(up);
        }
        reporter.update_time(now.wrapping_sub(last_ms));
        last_ms = now;

        let levels = buttons.sample();
        let outcome = engine.step(
            now,
            levels,
            &mut Ports {
                store: &mut store,
                indicator: &mut indicator,
                reporter: &mut reporter,
                tone: &mut tone,
            },
        );

        if !outcome.is_quiet() {
            log_step(&engine, &outcome);
        }

        let read_errors = buttons.read_errors();
        if read_errors != reported_read_errors {
            warn!("Button read errors: {}", read_errors);
            reported_read_errors = read_errors;
        }
    }
}

/// Monotonic milliseconds, wrapping at 2^32
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

fn log_boot(engine: &TimerEngine, boot: &BootOutcome) {
    info!(
        "Boot: {} restored, {} defaulted, {} unreadable",
        boot.loaded, boot.defaulted, boot.load_failures
    );
    if boot.persist_failures > 0 {
        warn!("Boot: {} cleared timers not queued for saving", boot.persist_failures);
    }

    for timer in engine.timers() {
        let state = timer.state();
        info!(
            "Timer '{}': {}/{} {}",
            timer.config().name.as_str(),
            state.current,
            timer.config().period,
            if state.overdue { "OVERDUE" } else { "ok" }
        );
    }
}

fn log_step(engine: &TimerEngine, outcome: &StepOutcome) {
    if outcome.ticks.minute {
        let clock = engine.clock();
        debug!(
            "Clock: day {} hour {} second {}",
            clock.day(),
            clock.hour(),
            clock.second()
        );
    }

    if outcome.muted {
        info!("Alert muted until the next day");
    }

    for (i, timer) in engine.timers().iter().enumerate() {
        if outcome.resets & (1u8 << i) != 0 {
            info!("Timer '{}' reset", timer.config().name.as_str());
        }
    }

    if outcome.persist_failures > 0 {
        warn!("{} timer saves dropped", outcome.persist_failures);
    }
    if outcome.report_failures > 0 {
        debug!("{} reports not sent", outcome.report_failures);
    }

    match outcome.reconnect {
        Some(Ok(())) => info!("Link down, asked bridge to reconnect"),
        Some(Err(e)) => warn!("Reconnect request failed: {:?}", e),
        None => {}
    }

    if outcome.tone_changed {
        trace!("Buzzer {}", if outcome.buzzer_on { "on" } else { "off" });
    }
}
