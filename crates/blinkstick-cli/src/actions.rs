//! Device operations behind the command line.
//!
//! Everything here is generic over the backend so it runs against the
//! simulator in tests.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use blinkstick_hw::color::NAMED_COLORS;
use blinkstick_hw::discovery::{find_all_in, find_by_serial_in, find_first_in};
use blinkstick_hw::{Backend, BlinkStick, ColorFormat, LedAddress, Mode, Rgb, Transport};
use serde::Serialize;
use tracing::debug;

/// Which devices a command applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    First,
    Serial(String),
    All,
}

/// Opens the targeted devices. Finding none is an error.
pub fn select<B: Backend>(backend: &B, target: &Target) -> Result<Vec<BlinkStick<B::Transport>>> {
    let sticks = match target {
        Target::First => find_first_in(backend)
            .context("Failed to open BlinkStick")?
            .map(|stick| vec![stick])
            .ok_or_else(|| anyhow!("No BlinkStick found"))?,
        Target::Serial(serial) => find_by_serial_in(backend, serial)
            .with_context(|| format!("Failed to open BlinkStick {serial}"))?
            .map(|stick| vec![stick])
            .ok_or_else(|| anyhow!("BlinkStick {serial} not found"))?,
        Target::All => {
            let sticks = find_all_in(backend).context("Failed to enumerate BlinkSticks")?;
            if sticks.is_empty() {
                bail!("No BlinkStick found");
            }
            sticks
        }
    };
    debug!("Targeting {} device(s)", sticks.len());
    Ok(sticks)
}

/// Converts a brightness limit in percent into a channel maximum.
pub fn limit_to_max(percent: u8) -> u8 {
    (percent.min(100) as u32 * 255 / 100) as u8
}

/// Animation used to show a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Blink,
    Pulse,
    Morph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub effect: Option<Effect>,
    pub repeats: u32,
    pub delay: Duration,
    pub duration: Duration,
    pub steps: u32,
}

/// Shows `color` on one LED, animated when an effect is chosen.
pub fn show_color<T: Transport>(
    stick: &mut BlinkStick<T>,
    address: LedAddress,
    color: Rgb,
    animation: &Animation,
) -> blinkstick_hw::Result<()> {
    match animation.effect {
        None => stick.set_color(address, color),
        Some(Effect::Blink) => stick.blink(address, color, animation.repeats, animation.delay),
        Some(Effect::Pulse) => stick.pulse(
            address,
            color,
            animation.repeats,
            animation.duration,
            animation.steps,
        ),
        Some(Effect::Morph) => stick.morph(address, color, animation.duration, animation.steps),
    }
}

/// Values persisted on the device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub mode: Option<Mode>,
    pub led_count: Option<u8>,
    pub info_block1: Option<String>,
    pub info_block2: Option<String>,
}

impl Settings {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.led_count.is_none()
            && self.info_block1.is_none()
            && self.info_block2.is_none()
    }
}

pub fn apply_settings<T: Transport>(
    stick: &mut BlinkStick<T>,
    settings: &Settings,
) -> Result<()> {
    let serial = stick.serial().to_string();
    if let Some(mode) = settings.mode {
        stick
            .set_mode(mode)
            .with_context(|| format!("Failed to set mode on {serial}"))?;
    }
    if let Some(count) = settings.led_count {
        stick
            .set_led_count(count)
            .with_context(|| format!("Failed to set LED count on {serial}"))?;
    }
    if let Some(text) = &settings.info_block1 {
        stick
            .set_info_block1(text)
            .with_context(|| format!("Failed to write info block 1 on {serial}"))?;
    }
    if let Some(text) = &settings.info_block2 {
        stick
            .set_info_block2(text)
            .with_context(|| format!("Failed to write info block 2 on {serial}"))?;
    }
    Ok(())
}

/// Everything `--info` shows about one device. Queries that fail leave
/// their field empty and record the error.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub serial: String,
    pub manufacturer: String,
    pub description: String,
    pub variant: String,
    pub variant_id: u8,
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_count: Option<u8>,
    pub info_block1: Option<String>,
    pub info_block2: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<&'static str, String>,
}

pub fn describe<T: Transport>(stick: &mut BlinkStick<T>, format: ColorFormat) -> DeviceReport {
    let variant = stick.variant();
    let mut errors = BTreeMap::new();

    let color = query(&mut errors, "color", stick.get_color_formatted(0, format));
    let (mode, led_count) = if variant.is_multi_led() {
        (
            query(&mut errors, "mode", stick.get_mode()).map(|m| m.to_string()),
            query(&mut errors, "led_count", stick.get_led_count()),
        )
    } else {
        (None, None)
    };
    let info_block1 = query(&mut errors, "info_block1", stick.info_block1());
    let info_block2 = query(&mut errors, "info_block2", stick.info_block2());

    DeviceReport {
        serial: stick.serial().to_string(),
        manufacturer: stick.manufacturer().to_string(),
        description: stick.description().to_string(),
        variant: variant.description().to_string(),
        variant_id: variant as u8,
        color,
        mode,
        led_count,
        info_block1,
        info_block2,
        errors,
    }
}

fn query<V>(
    errors: &mut BTreeMap<&'static str, String>,
    field: &'static str,
    result: blinkstick_hw::Result<V>,
) -> Option<V> {
    result
        .map_err(|e| {
            debug!("Query {} failed: {}", field, e);
            errors.insert(field, e.to_string());
        })
        .ok()
}

pub fn print_report(out: &mut impl Write, report: &DeviceReport) -> Result<()> {
    let error = |field: &str| {
        report
            .errors
            .get(field)
            .map(|e| format!("error: {e}"))
            .unwrap_or_default()
    };

    writeln!(out, "{}", report.serial)?;
    writeln!(out, "  Manufacturer:  {}", report.manufacturer)?;
    writeln!(out, "  Description:   {}", report.description)?;
    writeln!(out, "  Variant:       {}", report.variant)?;
    writeln!(
        out,
        "  Color:         {}",
        report.color.clone().unwrap_or_else(|| error("color"))
    )?;
    if report.mode.is_some() || report.errors.contains_key("mode") {
        writeln!(
            out,
            "  Mode:          {}",
            report.mode.clone().unwrap_or_else(|| error("mode"))
        )?;
    }
    if report.led_count.is_some() || report.errors.contains_key("led_count") {
        writeln!(
            out,
            "  LED count:     {}",
            report
                .led_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| error("led_count"))
        )?;
    }
    writeln!(
        out,
        "  Info block 1:  {}",
        report.info_block1.clone().unwrap_or_else(|| error("info_block1"))
    )?;
    writeln!(
        out,
        "  Info block 2:  {}",
        report.info_block2.clone().unwrap_or_else(|| error("info_block2"))
    )?;
    Ok(())
}

/// Sets a fresh random colour on every device and prints it.
pub fn random_colors<T: Transport>(
    sticks: &mut [BlinkStick<T>],
    out: &mut impl Write,
) -> Result<()> {
    for stick in sticks {
        let rgb = stick
            .set_random_color()
            .with_context(|| format!("Failed to set color on {}", stick.serial()))?;
        writeln!(out, "{} {}", stick.serial(), rgb)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ListEntry {
    serial: String,
    variant: &'static str,
    manufacturer: String,
    description: String,
    path: String,
}

/// Prints every attached device without opening it.
pub fn list<B: Backend>(backend: &B, json: bool, out: &mut impl Write) -> Result<()> {
    let entries: Vec<ListEntry> = backend
        .enumerate()
        .context("Failed to enumerate BlinkSticks")?
        .into_iter()
        .map(|info| ListEntry {
            variant: blinkstick_hw::Variant::from_serial(&info.serial, info.version_attribute)
                .description(),
            serial: info.serial,
            manufacturer: info.manufacturer,
            description: info.description,
            path: info.path,
        })
        .collect();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }
    if entries.is_empty() {
        writeln!(out, "No BlinkStick found")?;
    }
    for entry in &entries {
        writeln!(out, "{}  {}", entry.serial, entry.variant)?;
    }
    Ok(())
}

/// Prints the named colour table.
pub fn print_colors(out: &mut impl Write, json: bool) -> Result<()> {
    if json {
        let table: BTreeMap<&str, String> = NAMED_COLORS
            .iter()
            .map(|(name, rgb)| (*name, rgb.to_hex()))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&table)?)?;
        return Ok(());
    }
    for (name, rgb) in NAMED_COLORS {
        writeln!(out, "{:<22}{}", name, rgb)?;
    }
    Ok(())
}
