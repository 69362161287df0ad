//! Identifiers and status codes shared by the GAP and GATT server sides.
//!
//! They mirror the Bluedroid types exposed by `esp-idf-svc` so that the
//! controllers stay target independent; the ESP-IDF backend converts at the
//! boundary.

use std::fmt;

pub type AppId = u16;
pub type GattInterface = u8;
pub type ConnectionId = u16;
pub type TransferId = u32;
pub type Handle = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uuid16(pub u16);

impl fmt::Display for Uuid16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr(pub [u8; 6]);

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

/// Completion status reported by GAP events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtStatus {
    Success,
    Fail,
    Busy,
    Other,
}

/// Completion status reported by GATT server events, and sent back in read
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattStatus {
    Ok,
    /// Attribute not found.
    NotFound,
    Busy,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Bt(BtStatus),
    Gatt(GattStatus),
}

impl From<BtStatus> for Status {
    fn from(status: BtStatus) -> Self {
        Status::Bt(status)
    }
}

impl From<GattStatus> for Status {
    fn from(status: GattStatus) -> Self {
        Status::Gatt(status)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Bt(status) => write!(f, "{:?}", status),
            Status::Gatt(status) => write!(f, "{:?}", status),
        }
    }
}

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::bt::{self as svc_bt, ble::gatt};

    impl From<svc_bt::BtStatus> for super::BtStatus {
        fn from(status: svc_bt::BtStatus) -> Self {
            match status {
                svc_bt::BtStatus::Success => super::BtStatus::Success,
                svc_bt::BtStatus::Fail => super::BtStatus::Fail,
                svc_bt::BtStatus::Busy => super::BtStatus::Busy,
                _ => super::BtStatus::Other,
            }
        }
    }

    impl From<gatt::GattStatus> for super::GattStatus {
        fn from(status: gatt::GattStatus) -> Self {
            match status {
                gatt::GattStatus::Ok => super::GattStatus::Ok,
                gatt::GattStatus::NotFound => super::GattStatus::NotFound,
                gatt::GattStatus::Busy => super::GattStatus::Busy,
                _ => super::GattStatus::Error,
            }
        }
    }

    impl From<super::GattStatus> for gatt::GattStatus {
        fn from(status: super::GattStatus) -> Self {
            match status {
                super::GattStatus::Ok => gatt::GattStatus::Ok,
                super::GattStatus::NotFound => gatt::GattStatus::NotFound,
                super::GattStatus::Busy => gatt::GattStatus::Busy,
                super::GattStatus::Error => gatt::GattStatus::Error,
            }
        }
    }
}
