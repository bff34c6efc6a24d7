//! Configuration loading and timer persistence
//!
//! The timer configuration is compiled in from upkeep.toml. Timer progress
//! lives in flash, one record per timer slot.

pub mod store;

pub use store::{load_states, save_state, SavedStates};

use defmt::*;
use heapless::String;

use upkeep_core::config::{
    parse_config, Color, PinConfig, SystemConfig, TimeUnit, TimerConfig, PIXELS_PER_UNIT_SCALE,
};

/// Embedded configuration (compiled into firmware)
/// Edit upkeep.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../upkeep.toml");

/// Parse the embedded configuration
///
/// build.rs validates upkeep.toml, so the fallback only matters while the
/// parser and the validator disagree.
pub fn load_config() -> SystemConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) if !config.timers.is_empty() => {
            info!("Parsed embedded configuration: {} timers", config.timers.len());
            config
        }
        Ok(_) => {
            error!("Embedded config has no timers");
            error!("Using minimal fallback configuration");
            fallback_config()
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using minimal fallback configuration");
            fallback_config()
        }
    }
}

/// The three laser-cutter intervals the board ships with
fn fallback_config() -> SystemConfig {
    let mut config = SystemConfig::default();

    let timers = [
        ("LASER LENS CLEAN", TimeUnit::Days, Color::RED, 0, 27),
        ("LASER FILTER CLEAN", TimeUnit::Hours, Color::YELLOW, 1, 22),
        ("LASER DEBRIS CLEAN", TimeUnit::Hours, Color::RED, 2, 18),
    ];

    for (index, (name, unit, normal_color, button, strip)) in timers.into_iter().enumerate() {
        let mut label: String<{ upkeep_core::config::MAX_NAME_LEN }> = String::new();
        let _ = label.push_str(name);

        let timer = TimerConfig {
            slot: index as u8,
            channel: index as u8,
            name: label,
            unit,
            period: 12,
            pixels_total: 12,
            pixels_per_unit_scaled: PIXELS_PER_UNIT_SCALE,
            normal_color,
            alert_color: Color::BLUE,
            button: PinConfig::with_pullup(button),
            strip: PinConfig::new(strip),
            ..TimerConfig::default()
        };
        let _ = config.timers.push(timer);
    }

    config
}
