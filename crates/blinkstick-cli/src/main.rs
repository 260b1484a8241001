//! BlinkStick Control Tool
//!
//! Sets colours, runs animations and reads or writes device settings of
//! BlinkStick USB LED controllers.

mod actions;
mod config;
mod udev;

use std::io::Write;
use std::path::PathBuf;

use actions::{Animation, Effect, Settings, Target};
use anyhow::{Context, Result};
use blinkstick_hw::{Backend, ColorFormat, ColorSpec, HidBackend, LedAddress, Mode, Rgb};
use clap::{Args, Parser, Subcommand};
use config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum CliColorFormat {
    /// Comma separated decimal values, e.g. 255,0,0
    Rgb,
    /// Hex triplet, e.g. #ff0000
    #[default]
    Hex,
}

impl From<CliColorFormat> for ColorFormat {
    fn from(format: CliColorFormat) -> Self {
        match format {
            CliColorFormat::Rgb => ColorFormat::Rgb,
            CliColorFormat::Hex => ColorFormat::Hex,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "blinkstick")]
#[command(about = "Control tool for BlinkStick USB LED devices")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: <config dir>/blinkstick/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Target the device with this serial number
    #[arg(long, global = true, conflicts_with = "all")]
    serial: Option<String>,

    /// Target every attached device
    #[arg(long, global = true)]
    all: bool,

    /// Print machine readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    color: ColorArgs,

    #[command(flatten)]
    effect: EffectArgs,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    query: QueryArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct ColorArgs {
    /// Colour: CSS name, hex value (#RRGGBB, RRGGBB, #RGB), "off" or "random"
    #[arg(value_name = "COLOR")]
    color: Option<String>,

    /// Colour as a hex value
    #[arg(long, value_name = "RRGGBB", conflicts_with = "color")]
    hex: Option<String>,

    /// Output channel: 0=R, 1=G, 2=B (BlinkStick Pro)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    channel: u8,

    /// LED index on the channel
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=63))]
    index: u8,

    /// Brightness limit in percent
    #[arg(
        long,
        global = true,
        value_name = "PERCENT",
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    limit: Option<u8>,

    /// Invert colours (common anode LEDs)
    #[arg(long, global = true)]
    inverse: bool,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct EffectFlags {
    /// Blink the colour
    #[arg(long)]
    blink: bool,

    /// Pulse the colour from black and back
    #[arg(long)]
    pulse: bool,

    /// Fade from the current colour
    #[arg(long)]
    morph: bool,
}

#[derive(Args, Debug)]
struct EffectArgs {
    #[command(flatten)]
    flags: EffectFlags,

    /// Number of blinks or pulses
    #[arg(long)]
    repeats: Option<u32>,

    /// Blink time in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Morph or pulse time in milliseconds
    #[arg(long, value_name = "MS")]
    duration: Option<u64>,

    /// Gradient steps of morph and pulse
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(0..=config::MAX_STEPS as i64)
    )]
    steps: Option<u32>,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Store the Pro mode: 0 normal, 1 inverse, 2 WS2812, 3 WS2812 mirror
    #[arg(long, value_name = "MODE")]
    set_mode: Option<String>,

    /// Store the number of LEDs
    #[arg(long, value_name = "COUNT")]
    set_led_count: Option<u8>,

    /// Write text to info block 1 (device name)
    #[arg(long, value_name = "TEXT")]
    set_infoblock1: Option<String>,

    /// Write text to info block 2
    #[arg(long, value_name = "TEXT")]
    set_infoblock2: Option<String>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Show device information
    #[arg(short, long)]
    info: bool,

    /// Print the current colour of the LED at --index
    #[arg(long)]
    get_color: bool,

    /// Colour output format
    #[arg(long, default_value = "hex", value_enum)]
    format: CliColorFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a random colour
    Random,
    /// List attached devices
    List,
    /// List the named colours
    Colors,
    /// Print the udev rule granting access to BlinkSticks
    Udev {
        /// Write the rule to /etc/udev/rules.d instead of printing it
        #[arg(long)]
        install: bool,
    },
}

impl Cli {
    fn target(&self, config: &Config) -> Target {
        if self.all {
            return Target::All;
        }
        match self.serial.clone().or_else(|| config.serial.clone()) {
            Some(serial) => Target::Serial(serial),
            None => Target::First,
        }
    }

    fn color_spec(&self) -> Result<Option<ColorSpec>> {
        if let Some(hex) = &self.color.hex {
            return Ok(Some(ColorSpec::Rgb(Rgb::from_hex(hex)?)));
        }
        self.color
            .color
            .as_deref()
            .map(|s| s.parse::<ColorSpec>())
            .transpose()
            .map_err(Into::into)
    }

    fn animation(&self, config: &Config) -> Animation {
        let flags = &self.effect.flags;
        let effect = if flags.blink {
            Some(Effect::Blink)
        } else if flags.pulse {
            Some(Effect::Pulse)
        } else if flags.morph {
            Some(Effect::Morph)
        } else {
            None
        };
        let defaults = &config.effects;

        Animation {
            effect,
            repeats: self.effect.repeats.unwrap_or(defaults.repeats),
            delay: self
                .effect
                .delay
                .map_or(defaults.delay(), std::time::Duration::from_millis),
            duration: self
                .effect
                .duration
                .map_or(defaults.duration(), std::time::Duration::from_millis),
            steps: self.effect.steps.unwrap_or(defaults.steps),
        }
    }

    fn device_settings(&self) -> Result<Settings> {
        let mode = self
            .settings
            .set_mode
            .as_deref()
            .map(str::parse::<Mode>)
            .transpose()?;
        Ok(Settings {
            mode,
            led_count: self.settings.set_led_count,
            info_block1: self.settings.set_infoblock1.clone(),
            info_block2: self.settings.set_infoblock2.clone(),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG takes precedence over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Colors) => actions::print_colors(&mut stdout, cli.json),
        Some(Commands::Udev { install: false }) => {
            write!(stdout, "{}", udev::rule())?;
            Ok(())
        }
        Some(Commands::Udev { install: true }) => {
            udev::install(std::path::Path::new(udev::RULE_PATH))?;
            writeln!(stdout, "Installed {}; reconnect your BlinkStick", udev::RULE_PATH)?;
            Ok(())
        }
        _ => {
            let backend = HidBackend::new().context("Failed to initialise USB HID")?;
            run(&cli, &config, &backend, &mut stdout)
        }
    }
}

/// Runs every command that talks to devices.
fn run<B: Backend>(cli: &Cli, config: &Config, backend: &B, out: &mut impl Write) -> Result<()> {
    if let Some(Commands::List) = cli.command {
        return actions::list(backend, cli.json, out);
    }

    let mut sticks = actions::select(backend, &cli.target(config))?;
    let limit = cli.color.limit.or(config.limit);
    for stick in &mut sticks {
        if let Some(percent) = limit {
            stick.set_max_rgb_value(actions::limit_to_max(percent));
        }
        stick.set_inverse(cli.color.inverse || config.inverse);
    }

    if let Some(Commands::Random) = cli.command {
        return actions::random_colors(&mut sticks, out);
    }

    let color = cli.color_spec()?;
    let settings = cli.device_settings()?;
    let animation = cli.animation(config);
    let address = LedAddress::new(cli.color.channel, cli.color.index);
    let format = ColorFormat::from(cli.query.format);
    // Nothing to do means show what is there
    let info = cli.query.info || (color.is_none() && settings.is_empty() && !cli.query.get_color);

    let mut reports = Vec::new();
    let several = sticks.len() > 1;
    for stick in &mut sticks {
        actions::apply_settings(stick, &settings)?;

        if let Some(spec) = color {
            let rgb = spec.resolve();
            actions::show_color(stick, address, rgb, &animation)
                .with_context(|| format!("Failed to set color on {}", stick.serial()))?;
        }

        if cli.query.get_color {
            let value = stick
                .get_color_formatted(address.index, format)
                .with_context(|| format!("Failed to read color from {}", stick.serial()))?;
            if several {
                writeln!(out, "{} {}", stick.serial(), value)?;
            } else {
                writeln!(out, "{}", value)?;
            }
        }

        if info {
            reports.push(actions::describe(stick, format));
        }
    }

    if cli.json && !reports.is_empty() {
        writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
    } else {
        for report in &reports {
            actions::print_report(out, report)?;
        }
    }
    Ok(())
}
