//! udev rule granting unprivileged access to BlinkSticks on Linux.

use std::path::Path;

use anyhow::{Context, Result};
use blinkstick_hw::{PRODUCT_ID, VENDOR_ID};
use tracing::info;

/// Where `udev --install` writes the rule.
pub const RULE_PATH: &str = "/etc/udev/rules.d/85-blinkstick.rules";

/// The rule matching every BlinkStick.
pub fn rule() -> String {
    format!(
        "SUBSYSTEM==\"usb\", ATTR{{idVendor}}==\"{:04x}\", ATTR{{idProduct}}==\"{:04x}\", MODE:=\"0666\"\n",
        VENDOR_ID, PRODUCT_ID
    )
}

/// Writes the rule to `path`.
pub fn install(path: &Path) -> Result<()> {
    std::fs::write(path, rule())
        .with_context(|| format!("Failed to write {} (are you root?)", path.display()))?;
    info!("Installed udev rule to {}", path.display());
    Ok(())
}
