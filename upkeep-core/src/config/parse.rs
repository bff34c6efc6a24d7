//! Simple TOML parser for the timer configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the timer configuration. It does NOT support the full TOML grammar and
//! needs no allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer, decimal, boolean)
//! - Inline integer arrays for colours: `normal_color = [255, 0, 0]`
//! - [section] and [section.name] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Nested inline tables
//! - Dotted keys outside section headers

use heapless::String as HString;

use super::hardware::PinConfig;
use super::types::{
    Color, SystemConfig, TimeUnit, TimerConfig, PIXELS_PER_UNIT_DECIMALS, PIXELS_PER_UNIT_SCALE,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many timers (exceeded heapless capacity)
    TooManyItems,
    /// Invalid pin string
    InvalidPin,
    /// Timer name longer than the report field
    NameTooLong,
}

/// Current parsing context
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Root,
    Input,
    Buzzer,
    Indicator,
    Link,
    Timer,
}

/// Parse TOML configuration into SystemConfig
///
/// Timers get their flash slot and strip channel from their order in the file.
pub fn parse_config(input: &str) -> Result<SystemConfig, ParseError> {
    let mut config = SystemConfig::default();
    let mut section = Section::Root;
    let mut current_timer: Option<TimerConfig> = None;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            let header = line
                .strip_suffix(']')
                .map(|l| &l[1..])
                .ok_or(ParseError::InvalidSection)?;

            save_timer(&mut config, &mut current_timer)?;

            let (new_section, timer_key) = parse_section_header(header)?;
            if let Some(key) = timer_key {
                let index = config.timers.len() as u8;
                current_timer = Some(TimerConfig {
                    slot: index,
                    channel: index,
                    name: HString::try_from(key).map_err(|_| ParseError::NameTooLong)?,
                    ..TimerConfig::default()
                });
            }
            section = new_section;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&section, key, value, &mut config, &mut current_timer)?;
        }
    }

    save_timer(&mut config, &mut current_timer)?;

    Ok(config)
}

fn save_timer(
    config: &mut SystemConfig,
    current_timer: &mut Option<TimerConfig>,
) -> Result<(), ParseError> {
    if let Some(timer) = current_timer.take() {
        config
            .timers
            .push(timer)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}

/// Parse section header like "buzzer" or "timer.lens"
///
/// Returns the section and, for timers, the table key.
fn parse_section_header(header: &str) -> Result<(Section, Option<&str>), ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        let name = name.trim();
        if kind.trim() != "timer" || name.is_empty() || name.contains('.') {
            return Err(ParseError::InvalidSection);
        }
        return Ok((Section::Timer, Some(name)));
    }

    match header {
        "input" => Ok((Section::Input, None)),
        "buzzer" => Ok((Section::Buzzer, None)),
        "indicator" => Ok((Section::Indicator, None)),
        "link" => Ok((Section::Link, None)),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Cut a line at the first `#` outside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line (comments already stripped)
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a non-negative decimal like "0.5" or "2" into value × [`PIXELS_PER_UNIT_SCALE`]
///
/// More decimal places than the scale holds is an error rather than a
/// silent truncation.
fn parse_decimal_scaled(value: &str) -> Result<u32, ParseError> {
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };

    let whole: u32 = if whole.is_empty() { 0 } else { parse_int(whole)? };
    if frac.len() > PIXELS_PER_UNIT_DECIMALS || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidValue);
    }

    let mut fraction = 0u32;
    let mut place = PIXELS_PER_UNIT_SCALE;
    for d in frac.bytes() {
        place /= 10;
        fraction += (d - b'0') as u32 * place;
    }

    whole
        .checked_mul(PIXELS_PER_UNIT_SCALE)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(ParseError::InvalidValue)
}

/// Parse a colour like "[255, 0, 0]"
fn parse_color(value: &str) -> Result<Color, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut parts = inner.split(',');
    let mut channel = || -> Result<u8, ParseError> {
        parts.next().ok_or(ParseError::InvalidValue).and_then(parse_int)
    };
    let color = Color::new(channel()?, channel()?, channel()?);

    if parts.next().is_some() {
        return Err(ParseError::InvalidValue);
    }
    Ok(color)
}

/// Parse a time unit name
fn parse_unit(value: &str) -> Result<TimeUnit, ParseError> {
    match parse_string(value) {
        "minutes" | "MINUTES" => Ok(TimeUnit::Minutes),
        "hours" | "HOURS" => Ok(TimeUnit::Hours),
        "days" | "DAYS" => Ok(TimeUnit::Days),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a dotted IPv4 address
fn parse_ipv4(value: &str) -> Result<[u8; 4], ParseError> {
    let mut octets = [0u8; 4];
    let mut parts = parse_string(value).split('.');
    for octet in octets.iter_mut() {
        *octet = parse_int(parts.next().ok_or(ParseError::InvalidValue)?)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::InvalidValue);
    }
    Ok(octets)
}

/// Parse a pin string like "gpio27", "!gpio0", "^!gpio1"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = number.parse().map_err(|_| ParseError::InvalidPin)?;
    if pin > 29 {
        return Err(ParseError::InvalidPin);
    }

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    config: &mut SystemConfig,
    current_timer: &mut Option<TimerConfig>,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {
            if key == "clear_saved" {
                config.clear_saved = parse_bool(value)?;
            }
        }
        Section::Input => match key {
            "debounce_ms" => config.input.debounce_ms = parse_int(value)?,
            "long_press_ms" => config.input.long_press_ms = parse_int(value)?,
            _ => {}
        },
        Section::Buzzer => {
            let b = &mut config.buzzer;
            match key {
                "enabled" => b.enabled = parse_bool(value)?,
                "tone" | "tone_hz" => b.tone_hz = parse_int(value)?,
                "gap_s" => b.gap_s = parse_int(value)?,
                "length_ms" => b.length_ms = parse_int(value)?,
                "per_timer_tone" => b.per_timer_tone = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Indicator => {
            if key == "brightness" {
                config.indicator.brightness = parse_int(value)?;
            }
        }
        Section::Link => match key {
            "remote" => config.link.remote_ip = parse_ipv4(value)?,
            "port" => config.link.remote_port = parse_int(value)?,
            _ => {}
        },
        Section::Timer => {
            let t = current_timer.as_mut().ok_or(ParseError::InvalidSection)?;
            match key {
                "name" => {
                    t.name = HString::try_from(parse_string(value))
                        .map_err(|_| ParseError::NameTooLong)?
                }
                "unit" => t.unit = parse_unit(value)?,
                "enabled" => t.enabled = parse_bool(value)?,
                "period" => t.period = parse_int(value)?,
                "pixels" => t.pixels_total = parse_int(value)?,
                "pixels_per_unit" => t.pixels_per_unit_scaled = parse_decimal_scaled(value)?,
                "normal_color" => t.normal_color = parse_color(value)?,
                "alert_color" => t.alert_color = parse_color(value)?,
                "tone" | "tone_hz" => t.tone_hz = parse_int(value)?,
                "button" => t.button = parse_pin(value)?,
                "strip" => t.strip = parse_pin(value)?,
                _ => {} // Ignore unknown keys
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio27").unwrap();
        assert_eq!(pin.pin, 27);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("\"^!gpio0\"").unwrap();
        assert_eq!(pin.pin, 0);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert_eq!(parse_pin("gpio30"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("pin5"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal_scaled("1"), Ok(10_000));
        assert_eq!(parse_decimal_scaled("0.5"), Ok(5_000));
        assert_eq!(parse_decimal_scaled("1.25"), Ok(12_500));
        assert_eq!(parse_decimal_scaled(".75"), Ok(7_500));
        assert_eq!(parse_decimal_scaled("0.125"), Ok(1_250));
        assert_eq!(parse_decimal_scaled("2.0625"), Ok(20_625));
        assert_eq!(parse_decimal_scaled("0.00001"), Err(ParseError::InvalidValue));
        assert_eq!(parse_decimal_scaled("1.x"), Err(ParseError::InvalidValue));
        assert_eq!(parse_decimal_scaled("-1"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("[255, 255, 0]"), Ok(Color::YELLOW));
        assert_eq!(parse_color("[0,0,255]"), Ok(Color::BLUE));
        assert_eq!(parse_color("[256, 0, 0]"), Err(ParseError::InvalidValue));
        assert_eq!(parse_color("[1, 2]"), Err(ParseError::InvalidValue));
        assert_eq!(parse_color("[1, 2, 3, 4]"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("\"192.168.0.126\""), Ok([192, 168, 0, 126]));
        assert_eq!(parse_ipv4("10.0.0"), Err(ParseError::InvalidValue));
        assert_eq!(parse_ipv4("10.0.0.1.2"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(
            parse_section_header("timer.lens").unwrap(),
            (Section::Timer, Some("lens"))
        );
        assert_eq!(parse_section_header("buzzer").unwrap(), (Section::Buzzer, None));
        assert_eq!(
            parse_section_header("stepper.spin"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_timers_in_order() {
        let config_str = r#"
clear_saved = true

[buzzer]
gap_s = 10  # seconds between pulses
per_timer_tone = true

[timer.lens]
name = "LASER LENS CLEAN"
unit = "days"
period = 12
pixels_per_unit = 0.5
normal_color = [255, 0, 0]
button = "^!gpio0"
strip = "gpio27"

[timer.filter]
unit = "hours"
enabled = false
tone = 1200
"#;

        let config = parse_config(config_str).unwrap();
        assert!(config.clear_saved);
        assert_eq!(config.buzzer.gap_s, 10);
        assert!(config.buzzer.per_timer_tone);
        assert_eq!(config.timers.len(), 2);

        let lens = &config.timers[0];
        assert_eq!(lens.name.as_str(), "LASER LENS CLEAN");
        assert_eq!(lens.slot, 0);
        assert_eq!(lens.channel, 0);
        assert_eq!(lens.unit, TimeUnit::Days);
        assert_eq!(lens.pixels_per_unit_scaled, 5_000);
        assert_eq!(lens.strip.pin, 27);
        assert!(!lens.button.active_high());

        let filter = &config.timers[1];
        assert_eq!(filter.name.as_str(), "filter");
        assert_eq!(filter.slot, 1);
        assert_eq!(filter.unit, TimeUnit::Hours);
        assert!(!filter.enabled);
        assert_eq!(filter.tone_hz, 1200);
    }

    #[test]
    fn test_eighth_pixel_per_unit_fills_strip() {
        let config =
            parse_config("[timer.a]\nperiod = 96\npixels = 12\npixels_per_unit = 0.125\n")
                .unwrap();
        let timer = crate::timer::MaintenanceTimer::new(
            config.timers[0].clone(),
            Some(crate::timer::TimerState {
                current: 96,
                overdue: false,
            }),
        );
        assert_eq!(timer.progress_lit(), 12);
    }

    #[test]
    fn test_header_with_trailing_comment() {
        let config_str = r#"
[timer.lens]  # lens
name = "LENS"  # "quoted" note
[timer.filter]
name = "FILTER # 2"
"#;
        let config = parse_config(config_str).unwrap();
        assert_eq!(config.timers.len(), 2);
        assert_eq!(config.timers[0].name.as_str(), "LENS");
        assert_eq!(config.timers[0].slot, 0);
        assert_eq!(config.timers[1].name.as_str(), "FILTER # 2");
        assert_eq!(config.timers[1].slot, 1);
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert_eq!(
            parse_config("[timer.lens\nname = \"LENS\"\n"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(
            parse_config("[timer.lens] extra\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("gap_s = 10  # seconds"), "gap_s = 10  ");
        assert_eq!(strip_comment("name = \"A # B\""), "name = \"A # B\"");
        assert_eq!(strip_comment("# whole line"), "");
    }

    #[test]
    fn test_name_too_long() {
        let config_str = "[timer.a]\nname = \"THIS NAME IS FAR TOO LONG TO REPORT\"\n";
        assert_eq!(parse_config(config_str), Err(ParseError::NameTooLong));
    }

    #[test]
    fn test_too_many_timers() {
        let mut text: heapless::String<256> = heapless::String::new();
        for i in 0..=crate::config::MAX_TIMERS {
            core::fmt::Write::write_fmt(&mut text, format_args!("[timer.t{}]\n", i)).unwrap();
        }
        assert_eq!(parse_config(&text), Err(ParseError::TooManyItems));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = parse_config(include_str!("../../../upkeep-firmware/upkeep.toml")).unwrap();
        assert_eq!(config.timers.len(), 3);
        assert_eq!(config.timers[0].name.as_str(), "LASER LENS CLEAN");
        assert_eq!(config.timers[1].unit, TimeUnit::Hours);
        assert_eq!(config.timers[2].strip.pin, 18);
        assert_eq!(config.link.remote_port, 31230);
    }
}
