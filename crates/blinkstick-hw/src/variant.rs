//! Product variant identification.
//!
//! Serial numbers look like `BSnnnnnn-M.m`, where `M` is the firmware major
//! version. Major 1 and 2 are the original BlinkStick and the Pro; major 3
//! covers several products told apart by the USB release number.

/// BlinkStick product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Variant {
    #[default]
    Unknown = 0,
    BlinkStick = 1,
    Pro = 2,
    Strip = 3,
    Square = 4,
    Nano = 5,
    Flex = 6,
}

impl Variant {
    /// Identifies a variant from the firmware major version and the USB
    /// release number (bcdDevice).
    pub fn identify(major: u32, version_attribute: u16) -> Self {
        match (major, version_attribute) {
            (1, _) => Variant::BlinkStick,
            (2, _) => Variant::Pro,
            (3, 0x200) => Variant::Square,
            (3, 0x201) => Variant::Strip,
            (3, 0x202) => Variant::Nano,
            (3, 0x203) => Variant::Flex,
            _ => Variant::Unknown,
        }
    }

    /// Identifies a variant from a serial string.
    pub fn from_serial(serial: &str, version_attribute: u16) -> Self {
        match major_version(serial) {
            Some(major) => Self::identify(major, version_attribute),
            None => Variant::Unknown,
        }
    }

    /// Human readable product name.
    pub fn description(&self) -> &'static str {
        match self {
            Variant::Unknown => "Unknown",
            Variant::BlinkStick => "BlinkStick",
            Variant::Pro => "BlinkStick Pro",
            Variant::Strip => "BlinkStick Strip",
            Variant::Square => "BlinkStick Square",
            Variant::Nano => "BlinkStick Nano",
            Variant::Flex => "BlinkStick Flex",
        }
    }

    /// Returns true for products driving more than one LED.
    pub fn is_multi_led(&self) -> bool {
        matches!(
            self,
            Variant::Pro | Variant::Strip | Variant::Square | Variant::Nano | Variant::Flex
        )
    }
}

/// Extracts the firmware major version: the third character from the end.
pub fn major_version(serial: &str) -> Option<u32> {
    let chars: Vec<char> = serial.chars().collect();
    if chars.len() < 3 {
        return None;
    }
    chars[chars.len() - 3].to_digit(10)
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_from_serial() {
        let cases = [
            ("BS12345-1.0", 0x0000, Variant::BlinkStick, 1),
            ("BS12345-2.0", 0x0000, Variant::Pro, 2),
            ("BS12345-3.0", 0x0200, Variant::Square, 4),
            ("BS12345-3.0", 0x0201, Variant::Strip, 3),
            ("BS12345-3.0", 0x0202, Variant::Nano, 5),
            ("BS12345-3.0", 0x0203, Variant::Flex, 6),
            ("BS12345-4.0", 0x0000, Variant::Unknown, 0),
            ("BS12345-3.0", 0x9999, Variant::Unknown, 0),
            ("BS12345-0.0", 0x0000, Variant::Unknown, 0),
        ];

        for (serial, attribute, expected, value) in cases {
            let variant = Variant::from_serial(serial, attribute);
            assert_eq!(variant, expected, "{serial} {attribute:#x}");
            assert_eq!(variant as u8, value);
        }
    }

    #[test]
    fn test_description() {
        assert_eq!(Variant::BlinkStick.description(), "BlinkStick");
        assert_eq!(Variant::Pro.description(), "BlinkStick Pro");
        assert_eq!(Variant::Strip.description(), "BlinkStick Strip");
        assert_eq!(Variant::Square.description(), "BlinkStick Square");
        assert_eq!(Variant::Nano.description(), "BlinkStick Nano");
        assert_eq!(Variant::Flex.description(), "BlinkStick Flex");
        assert_eq!(Variant::Unknown.description(), "Unknown");
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("BS000001-1.0"), Some(1));
        assert_eq!(major_version("BS000001-3.1"), Some(3));
        assert_eq!(major_version("ab"), None);
        assert_eq!(major_version("BS000001-x.0"), None);
        assert_eq!(Variant::from_serial("", 0x200), Variant::Unknown);
    }
}
