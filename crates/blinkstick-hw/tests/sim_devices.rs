//! Integration tests: discovery and control of simulated BlinkSticks through
//! the public API.

use std::time::Duration;

use blinkstick_hw::discovery::{find_all_in, find_by_serial_in, find_first_in};
use blinkstick_hw::sim::{SimBackend, SimDevice};
use blinkstick_hw::{Error, LedAddress, Mode, ProStrip, Rgb, Variant};

fn two_sticks() -> SimBackend {
    SimBackend::new()
        .with_device(SimDevice::new("BS000100-1.1", 0x0100))
        .with_device(SimDevice::new("BS000200-3.0", 0x0202))
}

#[test]
fn info_block_round_trip() {
    let backend = two_sticks();
    let mut stick = find_first_in(&backend).unwrap().unwrap();

    stick.set_info_block1("desk lamp").unwrap();
    assert_eq!(stick.info_block1().unwrap(), "desk lamp");

    // 32 bytes fit exactly; anything longer is cut
    let long = "x".repeat(40);
    stick.set_info_block2(&long).unwrap();
    assert_eq!(stick.info_block2().unwrap(), "x".repeat(32));
}

#[test]
fn missing_serial_is_none() {
    let backend = two_sticks();
    assert!(find_by_serial_in(&backend, "BS000001-1.0")
        .unwrap()
        .is_none());
}

#[test]
fn hex_color_round_trip() {
    let backend = two_sticks();
    let mut stick = find_by_serial_in(&backend, "BS000200-3.0")
        .unwrap()
        .unwrap();
    assert_eq!(stick.variant(), Variant::Nano);

    let green: Rgb = "00FF00".parse().unwrap();
    stick.set_color(LedAddress::FIRST, green).unwrap();
    assert_eq!(stick.get_color_hex(0).unwrap(), "#00ff00");
}

#[test]
fn random_color_on_every_device() {
    let backend = two_sticks();
    let mut sticks = find_all_in(&backend).unwrap();
    assert_eq!(sticks.len(), 2);

    for (stick, device) in sticks.iter_mut().zip(backend.devices()) {
        let rgb = stick.set_random_color().unwrap();
        assert_eq!(device.led(0, 0), rgb);
    }
}

#[test]
fn unplugged_device_reports_disconnect() {
    let backend = two_sticks();
    let mut stick = find_first_in(&backend).unwrap().unwrap();
    let device = &backend.devices()[0];

    device.unplug();
    let err = stick.set_color(LedAddress::FIRST, Rgb::BLACK).unwrap_err();
    assert!(matches!(err, Error::Disconnected(ref serial) if serial == "BS000100-1.1"));
    assert!(err.to_string().contains("BS000100-1.1"));

    device.plug();
    stick.set_color(LedAddress::FIRST, Rgb::new(1, 1, 1)).unwrap();
    assert_eq!(device.led(0, 0), Rgb::new(1, 1, 1));
}

#[test]
fn transfer_failure_reconnects_and_retries_once() {
    let backend = two_sticks();
    let mut stick = find_first_in(&backend).unwrap().unwrap();
    let device = &backend.devices()[0];

    device.fail_transfers(1);
    stick.set_color(LedAddress::FIRST, Rgb::new(9, 8, 7)).unwrap();
    assert_eq!(device.led(0, 0), Rgb::new(9, 8, 7));
    assert_eq!(device.open_count(), 2);

    device.fail_transfers(3);
    let err = stick.get_color(0).unwrap_err();
    assert!(matches!(err, Error::Hid(_)));
    assert_eq!(device.pending_failures(), 1);
}

#[test]
fn pro_strip_animation_frame() {
    let backend = SimBackend::new().with_device(SimDevice::new("BS000300-2.0", 0));
    let mut stick = find_first_in(&backend).unwrap().unwrap();
    let device = &backend.devices()[0];

    stick.set_mode(Mode::Ws2812).unwrap();
    assert_eq!(stick.get_mode().unwrap(), Mode::Ws2812);

    let mut strip = ProStrip::new([8, 0, 0], Duration::ZERO, 255).unwrap();
    for i in 0..8 {
        strip
            .set_color(0, i, Rgb::new(i as u8 * 30, 0, 0), false)
            .unwrap();
    }
    strip.send_data_all(&mut stick).unwrap();

    for i in 0..8 {
        assert_eq!(device.led(0, i), Rgb::new(i as u8 * 30, 0, 0));
        assert_eq!(stick.get_color(i as u8).unwrap(), Rgb::new(i as u8 * 30, 0, 0));
    }
}
