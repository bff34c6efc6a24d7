//! Upkeep - Maintenance Interval Firmware
//!
//! Main firmware binary for RP2040-based maintenance timer boards.
//! Each configured interval counts minutes, hours or days since its last
//! reset, shows progress on its own LED strip and sounds a shared buzzer
//! once overdue.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use upkeep_core::config::SystemConfig;
use upkeep_hal_rp2040::flash::FlashStorage;
use upkeep_hal_rp2040::tone::PwmTone;
use upkeep_hal_rp2040::ws2812::{PioWs2812, Ws2812Program};
use upkeep_hal_rp2040::FlashStorageTrait;
use upkeep_protocol::{ControllerMessage, RemoteAddress};

use crate::config::{load_config, load_states};
use crate::ports::{BridgeReporter, QueuedStore};
use crate::tasks::controller::Buttons;
use crate::tasks::Strips;

mod board;
mod channels;
mod config;
mod ports;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Configuration is shared with the controller task for the program's lifetime
static SYSTEM_CONFIG: StaticCell<SystemConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Upkeep firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static SystemConfig = SYSTEM_CONFIG.init(load_config());
    let mismatches = board::check_wiring(config);
    if mismatches > 0 {
        warn!("{} wiring mismatches between upkeep.toml and the board", mismatches);
    }

    // Restore timer progress before the controller starts
    let mut storage = FlashStorage::new(p.FLASH, p.DMA_CH0);
    let saved = if config.clear_saved {
        warn!("clear_saved set, erasing stored timer progress");
        if let Err(e) = storage.erase_all().await {
            error!("Failed to erase timer storage: {:?}", e);
        }
        [Ok(None); upkeep_core::MAX_TIMERS]
    } else {
        load_states(&mut storage, config).await
    };
    info!("Timer storage ready");

    // Setup UART for the network bridge
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_16,
        p.PIN_17,
        Irqs,
        tx_buf,
        rx_buf,
        uart_config,
    );
    let (tx, rx) = uart.split();

    info!(
        "UART initialized for bridge (gpio{}/gpio{})",
        board::LINK_TX_PIN,
        board::LINK_RX_PIN
    );

    // Tell the bridge where reports go; queued until the TX task starts
    let remote = RemoteAddress::from(config.link);
    if let Err(e) = ports::queue(ControllerMessage::SetRemote(remote)) {
        warn!("Failed to queue remote address: {:?}", e);
    }

    // Setup PIO0 for the WS2812 strips
    let Pio {
        mut common,
        sm0,
        sm1,
        sm2,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let program = Ws2812Program::new(&mut common);
    let strips = Strips {
        strip0: PioWs2812::new(&mut common, sm0, p.PIN_27, &program),
        strip1: PioWs2812::new(&mut common, sm1, p.PIN_22, &program),
        strip2: PioWs2812::new(&mut common, sm2, p.PIN_18, &program),
    };

    info!("PIO strips initialized ({:?})", board::STRIP_PINS);

    // Buzzer on PWM slice 6 channel A
    let pwm = Pwm::new_output_a(p.PWM_SLICE6, p.PIN_28, PwmConfig::default());
    let tone = PwmTone::new(pwm);

    info!("Buzzer initialized on gpio{}", board::BUZZER_PIN);

    // Reset buttons in timer order
    let mut buttons = Buttons::new();
    let inputs = [
        Input::new(p.PIN_0, Pull::Up),
        Input::new(p.PIN_1, Pull::Up),
        Input::new(p.PIN_2, Pull::Up),
    ];
    for (input, timer) in inputs.into_iter().zip(config.timers.iter()) {
        if buttons.add(input, &timer.button).is_err() {
            warn!("Button bank full, '{}' has no reset button", timer.name.as_str());
        }
    }

    info!("Buttons initialized ({:?})", board::BUTTON_PINS);

    // Spawn tasks
    spawner.spawn(tasks::storage_task(storage)).unwrap();
    spawner
        .spawn(tasks::indicator_task(strips, config.indicator.brightness))
        .unwrap();
    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner.spawn(tasks::link_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::controller_task(
            config,
            QueuedStore::new(saved),
            buttons,
            tone,
            BridgeReporter::new(remote),
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
