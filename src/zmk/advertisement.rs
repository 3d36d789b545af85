//! ZMK Prospector status advertisement parsing.
//!
//! ZMK keyboards running the Prospector status module broadcast a
//! 26-byte manufacturer-data payload in their BLE advertisements:
//!
//! | Offset | Field                | Size | Notes                          |
//! |--------|----------------------|------|--------------------------------|
//! | 0-1    | Manufacturer ID      | 2    | 0xFFFF (custom/local use)      |
//! | 2-3    | Service UUID         | 2    | 0xAB 0xCD (protocol marker)    |
//! | 4      | Protocol version     | 1    | currently 0x01                 |
//! | 5      | Battery level        | 1    | 0-100%                         |
//! | 6      | Active layer         | 1    | 0-15                           |
//! | 7      | Profile slot         | 1    | BLE profile 0-4                |
//! | 8      | Connection count     | 1    | 0-5                            |
//! | 9      | Status flags         | 1    | USB/BLE/charging/caps-word     |
//! | 10     | Device role          | 1    | standalone/central/peripheral  |
//! | 11     | Device index         | 1    | split half index               |
//! | 12-14  | Peripheral batteries | 3    | left/right/aux                 |
//! | 15-18  | Layer name           | 4    | ASCII, NUL-padded              |
//! | 19-22  | Keyboard ID          | 4    | hash of keyboard name, LE      |
//! | 23     | Modifier flags       | 1    | L/R ctrl, shift, alt, gui      |
//! | 24     | WPM                  | 1    |                                |
//! | 25     | Channel              | 1    |                                |
//!
//! Multi-byte integers are little-endian.

use std::fmt;

/// Manufacturer ID used by the Prospector module (custom/local use range).
pub const MANUFACTURER_ID: u16 = 0xFFFF;

/// Service UUID bytes identifying the Prospector protocol.
pub const SERVICE_UUID: [u8; 2] = [0xAB, 0xCD];

/// Full payload length in bytes.
pub const PAYLOAD_LEN: usize = 26;

/// Status flag byte (offset 9).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatusFlags(pub u8);

impl StatusFlags {
    pub const CAPS_WORD: u8 = 1 << 0;
    pub const CHARGING: u8 = 1 << 1;
    pub const USB_CONNECTED: u8 = 1 << 2;
    pub const USB_HID_READY: u8 = 1 << 3;
    pub const BLE_CONNECTED: u8 = 1 << 4;
    pub const BLE_BONDED: u8 = 1 << 5;

    pub fn caps_word(self) -> bool {
        self.0 & Self::CAPS_WORD != 0
    }

    pub fn charging(self) -> bool {
        self.0 & Self::CHARGING != 0
    }

    pub fn usb_connected(self) -> bool {
        self.0 & Self::USB_CONNECTED != 0
    }

    pub fn usb_hid_ready(self) -> bool {
        self.0 & Self::USB_HID_READY != 0
    }

    pub fn ble_connected(self) -> bool {
        self.0 & Self::BLE_CONNECTED != 0
    }

    pub fn ble_bonded(self) -> bool {
        self.0 & Self::BLE_BONDED != 0
    }
}

/// Modifier key flag byte (offset 23).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ModifierFlags(pub u8);

impl ModifierFlags {
    pub const LCTL: u8 = 1 << 0;
    pub const LSFT: u8 = 1 << 1;
    pub const LALT: u8 = 1 << 2;
    pub const LGUI: u8 = 1 << 3;
    pub const RCTL: u8 = 1 << 4;
    pub const RSFT: u8 = 1 << 5;
    pub const RALT: u8 = 1 << 6;
    pub const RGUI: u8 = 1 << 7;

    /// Names of all active modifiers, for logs.
    pub fn active(self) -> Vec<&'static str> {
        const NAMES: [(u8, &str); 8] = [
            (ModifierFlags::LCTL, "LCTL"),
            (ModifierFlags::LSFT, "LSFT"),
            (ModifierFlags::LALT, "LALT"),
            (ModifierFlags::LGUI, "LGUI"),
            (ModifierFlags::RCTL, "RCTL"),
            (ModifierFlags::RSFT, "RSFT"),
            (ModifierFlags::RALT, "RALT"),
            (ModifierFlags::RGUI, "RGUI"),
        ];

        NAMES
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Device role in a split keyboard configuration (offset 10).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceRole {
    Standalone,
    Central,
    Peripheral,
    /// Forward-compatible catch-all for roles this version doesn't know.
    Unknown(u8),
}

impl From<u8> for DeviceRole {
    fn from(value: u8) -> Self {
        match value {
            0 => DeviceRole::Standalone,
            1 => DeviceRole::Central,
            2 => DeviceRole::Peripheral,
            other => DeviceRole::Unknown(other),
        }
    }
}

impl DeviceRole {
    fn to_byte(self) -> u8 {
        match self {
            DeviceRole::Standalone => 0,
            DeviceRole::Central => 1,
            DeviceRole::Peripheral => 2,
            DeviceRole::Unknown(other) => other,
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Standalone => write!(f, "standalone"),
            DeviceRole::Central => write!(f, "central"),
            DeviceRole::Peripheral => write!(f, "peripheral"),
            DeviceRole::Unknown(value) => write!(f, "unknown({value})"),
        }
    }
}

/// A parsed ZMK status advertisement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusAdvertisement {
    pub version: u8,
    pub battery_level: u8,
    pub active_layer: u8,
    pub profile_slot: u8,
    pub connection_count: u8,
    pub status: StatusFlags,
    pub role: DeviceRole,
    pub device_index: u8,
    pub peripheral_batteries: [u8; 3],
    /// Advertised layer name, at most four ASCII characters.
    pub layer_name: String,
    pub keyboard_id: u32,
    pub modifiers: ModifierFlags,
    pub wpm: u8,
    pub channel: u8,
}

impl StatusAdvertisement {
    /// Parses a raw manufacturer-data payload.
    ///
    /// Returns `None` for payloads that are not Prospector
    /// advertisements: wrong length or wrong service UUID.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() != PAYLOAD_LEN {
            return None;
        }
        if data[2..4] != SERVICE_UUID {
            return None;
        }

        let name_bytes = &data[15..19];
        let name_len = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let layer_name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

        Some(Self {
            version: data[4],
            battery_level: data[5],
            active_layer: data[6],
            profile_slot: data[7],
            connection_count: data[8],
            status: StatusFlags(data[9]),
            role: DeviceRole::from(data[10]),
            device_index: data[11],
            peripheral_batteries: [data[12], data[13], data[14]],
            layer_name,
            keyboard_id: u32::from_le_bytes([data[19], data[20], data[21], data[22]]),
            modifiers: ModifierFlags(data[23]),
            wpm: data[24],
            channel: data[25],
        })
    }

    /// Encodes back to the 26-byte wire form.
    ///
    /// Used by the simulated scanner so its advertisements travel the
    /// same path real ones would, and for round-trip testing.
    pub fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let mut buf = [0u8; PAYLOAD_LEN];

        buf[0..2].copy_from_slice(&MANUFACTURER_ID.to_le_bytes());
        buf[2..4].copy_from_slice(&SERVICE_UUID);
        buf[4] = self.version;
        buf[5] = self.battery_level;
        buf[6] = self.active_layer;
        buf[7] = self.profile_slot;
        buf[8] = self.connection_count;
        buf[9] = self.status.0;
        buf[10] = self.role.to_byte();
        buf[11] = self.device_index;
        buf[12..15].copy_from_slice(&self.peripheral_batteries);

        // Layer name: four bytes, ASCII, NUL-padded
        for (slot, byte) in buf[15..19].iter_mut().zip(self.layer_name.bytes()) {
            *slot = byte;
        }

        buf[19..23].copy_from_slice(&self.keyboard_id.to_le_bytes());
        buf[23] = self.modifiers.0;
        buf[24] = self.wpm;
        buf[25] = self.channel;

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatusAdvertisement {
        StatusAdvertisement {
            version: 1,
            battery_level: 87,
            active_layer: 2,
            profile_slot: 1,
            connection_count: 1,
            status: StatusFlags(StatusFlags::BLE_CONNECTED | StatusFlags::BLE_BONDED),
            role: DeviceRole::Central,
            device_index: 0,
            peripheral_batteries: [82, 84, 0],
            layer_name: "Nav".to_string(),
            keyboard_id: 0x1234_5678,
            modifiers: ModifierFlags(ModifierFlags::LSFT),
            wpm: 42,
            channel: 0,
        }
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let adv = sample();
        let parsed = StatusAdvertisement::parse(&adv.encode()).unwrap();
        assert_eq!(parsed, adv);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let adv = sample();
        let bytes = adv.encode();

        assert!(StatusAdvertisement::parse(&bytes[..25]).is_none());
        assert!(StatusAdvertisement::parse(&[]).is_none());

        let mut long = bytes.to_vec();
        long.push(0);
        assert!(StatusAdvertisement::parse(&long).is_none());
    }

    #[test]
    fn test_wrong_service_uuid_is_rejected() {
        let mut bytes = sample().encode();
        bytes[2] = 0x00;
        assert!(StatusAdvertisement::parse(&bytes).is_none());
    }

    #[test]
    fn test_layer_name_stops_at_nul() {
        let mut bytes = sample().encode();
        // "Na\0v" should read as "Na"
        bytes[15..19].copy_from_slice(b"Na\0v");

        let parsed = StatusAdvertisement::parse(&bytes).unwrap();
        assert_eq!(parsed.layer_name, "Na");
    }

    #[test]
    fn test_layer_name_is_truncated_to_four_bytes_on_encode() {
        let mut adv = sample();
        adv.layer_name = "Symbols".to_string();

        let parsed = StatusAdvertisement::parse(&adv.encode()).unwrap();
        assert_eq!(parsed.layer_name, "Symb");
    }

    #[test]
    fn test_status_flag_accessors() {
        let flags = StatusFlags(StatusFlags::CHARGING | StatusFlags::USB_CONNECTED);

        assert!(flags.charging());
        assert!(flags.usb_connected());
        assert!(!flags.ble_connected());
        assert!(!flags.caps_word());
    }

    #[test]
    fn test_active_modifier_names() {
        let mods = ModifierFlags(ModifierFlags::LCTL | ModifierFlags::RSFT);
        assert_eq!(mods.active(), vec!["LCTL", "RSFT"]);

        assert!(ModifierFlags::default().active().is_empty());
    }

    #[test]
    fn test_unknown_role_survives_round_trip() {
        let mut adv = sample();
        adv.role = DeviceRole::Unknown(7);

        let parsed = StatusAdvertisement::parse(&adv.encode()).unwrap();
        assert_eq!(parsed.role, DeviceRole::Unknown(7));
    }
}
