//! Info blocks: two 32-byte user memory slots on every device.
//!
//! Block 1 conventionally holds a human readable device name, block 2 is
//! free-form. Text is stored as UTF-8 and terminated by the first NUL byte
//! (a full 32-byte string has no terminator).

/// Data bytes in one info block.
pub const INFO_BLOCK_SIZE: usize = 32;

/// Size of an info block report (report byte + data).
pub const INFO_BLOCK_REPORT_SIZE: usize = INFO_BLOCK_SIZE + 1;

/// One of the two info block slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InfoBlock {
    /// Usually the device name.
    One = 0x02,
    /// Free-form data.
    Two = 0x03,
}

impl InfoBlock {
    /// Returns the HID report ID for this block.
    pub fn report_id(&self) -> u8 {
        *self as u8
    }

    /// Encodes text into a full report, truncating to 32 bytes on a char
    /// boundary and zero padding the rest.
    pub fn encode(&self, text: &str) -> [u8; INFO_BLOCK_REPORT_SIZE] {
        let mut end = text.len().min(INFO_BLOCK_SIZE);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        let mut buffer = [0u8; INFO_BLOCK_REPORT_SIZE];
        buffer[0] = self.report_id();
        buffer[1..=end].copy_from_slice(&text.as_bytes()[..end]);
        buffer
    }

    /// Decodes the text of a report read back from the device.
    pub fn decode(report: &[u8]) -> String {
        let data = report.get(1..).unwrap_or_default();
        let data = &data[..data.len().min(INFO_BLOCK_SIZE)];
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        String::from_utf8_lossy(&data[..end]).into_owned()
    }
}

impl std::fmt::Display for InfoBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfoBlock::One => write!(f, "infoblock1"),
            InfoBlock::Two => write!(f, "infoblock2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_with_zeros() {
        let report = InfoBlock::One.encode("hello");
        assert_eq!(report[0], 0x02);
        assert_eq!(&report[1..6], b"hello");
        assert!(report[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_empty() {
        let report = InfoBlock::Two.encode("");
        assert_eq!(report[0], 0x03);
        assert!(report[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_truncates() {
        let report = InfoBlock::One.encode(&"a".repeat(40));
        assert_eq!(&report[1..], "a".repeat(32).as_bytes());
    }

    #[test]
    fn test_encode_truncates_on_char_boundary() {
        // 31 ASCII bytes then a 2-byte char that does not fit
        let text = format!("{}é", "a".repeat(31));
        let report = InfoBlock::One.encode(&text);
        assert_eq!(InfoBlock::decode(&report), "a".repeat(31));
    }

    #[test]
    fn test_decode_stops_at_nul() {
        let mut report = [0u8; INFO_BLOCK_REPORT_SIZE];
        report[0] = 0x02;
        report[1..4].copy_from_slice(b"abc");
        report[5] = b'x';
        assert_eq!(InfoBlock::decode(&report), "abc");
    }

    #[test]
    fn test_decode_short_reports() {
        assert_eq!(InfoBlock::decode(&[]), "");
        assert_eq!(InfoBlock::decode(&[0x02]), "");
    }

    #[test]
    fn test_full_block_round_trip() {
        let text = "0123456789abcdef0123456789abcdef";
        assert_eq!(InfoBlock::decode(&InfoBlock::One.encode(text)), text);
    }
}
