//! Build script for upkeep-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates upkeep.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Must match `upkeep_core::config::MAX_TIMERS`
const MAX_TIMERS: usize = 8;

/// Must match `upkeep_protocol::MAX_NAME_LEN`
const MAX_NAME_LEN: usize = 24;

/// Must match the indicator task's pixel buffer
const MAX_PIXELS: i64 = 64;

/// Must match `upkeep_core::config::PIXELS_PER_UNIT_SCALE`
const PIXELS_PER_UNIT_SCALE: f64 = 10_000.0;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate upkeep.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=upkeep.toml");

    let config_path = Path::new("upkeep.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: upkeep.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an upkeep.toml timer configuration.       ║\n\
            ║  Please create one in the upkeep-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read upkeep.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in upkeep.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_timers(&config, &mut errors);
    validate_globals(&config, &mut errors);
    report_errors("Invalid timer configuration", &errors);

    println!("cargo:warning=upkeep.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Panic with every collected error
fn report_errors(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate [timer.*] sections
fn validate_timers(config: &toml::Value, errors: &mut Vec<String>) {
    let timers = match config.get("timer") {
        Some(toml::Value::Table(t)) if !t.is_empty() => t,
        _ => {
            errors.push("Missing [timer.*] section - at least one timer is required".into());
            return;
        }
    };

    if timers.len() > MAX_TIMERS {
        errors.push(format!("At most {} timers are supported", MAX_TIMERS));
    }

    for (key, timer) in timers {
        let timer = match timer {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[timer.{}] must be a table", key));
                continue;
            }
        };

        let name = timer
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or(key.as_str());
        if name.len() > MAX_NAME_LEN {
            errors.push(format!(
                "[timer.{}] name longer than {} bytes",
                key, MAX_NAME_LEN
            ));
        }

        match timer.get("unit") {
            Some(toml::Value::String(unit)) => {
                if !["minutes", "hours", "days"].contains(&unit.as_str()) {
                    errors.push(format!(
                        "[timer.{}] unit must be 'minutes', 'hours' or 'days'",
                        key
                    ));
                }
            }
            Some(_) => errors.push(format!("[timer.{}] unit must be a string", key)),
            None => errors.push(format!("[timer.{}] missing 'unit'", key)),
        }

        match timer.get("period") {
            Some(toml::Value::Integer(period)) if *period > 0 && *period <= u32::MAX as i64 => {}
            Some(_) => errors.push(format!("[timer.{}] period must be a positive integer", key)),
            None => errors.push(format!("[timer.{}] missing 'period'", key)),
        }

        if let Some(pixels) = timer.get("pixels") {
            match pixels.as_integer() {
                Some(p) if (1..=MAX_PIXELS).contains(&p) => {}
                _ => errors.push(format!("[timer.{}] pixels must be 1-{}", key, MAX_PIXELS)),
            }
        }

        if let Some(ppu) = timer.get("pixels_per_unit") {
            let valid = match ppu {
                toml::Value::Integer(v) => *v >= 0,
                toml::Value::Float(v) => *v >= 0.0,
                _ => false,
            };
            if !valid {
                errors.push(format!(
                    "[timer.{}] pixels_per_unit must be a non-negative number",
                    key
                ));
            } else if let toml::Value::Float(v) = ppu {
                let scaled = v * PIXELS_PER_UNIT_SCALE;
                if (scaled - scaled.round()).abs() > 1e-6 {
                    errors.push(format!(
                        "[timer.{}] pixels_per_unit allows at most 4 decimal places",
                        key
                    ));
                }
            }
        }

        for field in ["normal_color", "alert_color"] {
            if let Some(color) = timer.get(field) {
                if !is_color(color) {
                    errors.push(format!("[timer.{}] {} must be [r, g, b] 0-255", key, field));
                }
            }
        }

        if let Some(tone) = timer.get("tone") {
            if !is_u16(tone) {
                errors.push(format!("[timer.{}] tone must be 0-65535", key));
            }
        }

        for field in ["button", "strip"] {
            if let Some(pin) = timer.get(field) {
                if !pin.as_str().map(is_pin).unwrap_or(false) {
                    errors.push(format!("[timer.{}] {} must look like \"^!gpio0\"", key, field));
                }
            }
        }
    }
}

/// Validate [buzzer], [indicator] and [link]
fn validate_globals(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(tone) = config.get("buzzer").and_then(|b| b.get("tone")) {
        if !is_u16(tone) {
            errors.push("[buzzer] tone must be 0-65535".into());
        }
    }

    if let Some(brightness) = config.get("indicator").and_then(|i| i.get("brightness")) {
        match brightness.as_integer() {
            Some(b) if (0..=255).contains(&b) => {}
            _ => errors.push("[indicator] brightness must be 0-255".into()),
        }
    }

    if let Some(link) = config.get("link") {
        if let Some(remote) = link.get("remote") {
            if remote.as_str().and_then(|r| r.parse::<Ipv4Addr>().ok()).is_none() {
                errors.push("[link] remote must be an IPv4 address".into());
            }
        }
        if let Some(port) = link.get("port") {
            if !is_u16(port) {
                errors.push("[link] port must be 0-65535".into());
            }
        }
    }
}

fn is_u16(value: &toml::Value) -> bool {
    value
        .as_integer()
        .map(|v| (0..=u16::MAX as i64).contains(&v))
        .unwrap_or(false)
}

fn is_color(value: &toml::Value) -> bool {
    match value.as_array() {
        Some(channels) => {
            channels.len() == 3
                && channels
                    .iter()
                    .all(|c| c.as_integer().map(|v| (0..=255).contains(&v)).unwrap_or(false))
        }
        None => false,
    }
}

/// `gpioN` with optional `^` (pull-up) and `!` (inverted) prefixes
fn is_pin(s: &str) -> bool {
    let s = s.trim_start_matches(['^', '!']);
    match s.strip_prefix("gpio") {
        Some(n) => n.parse::<u8>().map(|n| n <= 29).unwrap_or(false),
        None => false,
    }
}
