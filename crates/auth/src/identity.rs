//! Device identity
//!
//! A stable serial for the running instance. During early startup the serial may
//! not be known yet; providers report that as `None`.

use std::sync::RwLock;

use sha2::{Digest, Sha256};

pub const ENV_SERIAL: &str = "SHUTTER_SERIAL";

/// Length in bytes of the serial checksum before hex encoding
const CHECKSUM_BYTES: usize = 4;

/// Derive the checksum of a serial (first 4 bytes of SHA-256, lowercase hex)
pub fn serial_checksum(serial: &str) -> String {
    let digest = Sha256::digest(serial.as_bytes());
    hex::encode(&digest[..CHECKSUM_BYTES])
}

/// Source of the instance serial and its checksum
pub trait DeviceIdentity: Send + Sync {
    /// The instance serial, or `None` while it is unavailable.
    /// An empty serial is treated the same as `None`.
    fn serial(&self) -> Option<String>;

    fn serial_checksum(&self) -> Option<String> {
        self.serial().map(|serial| serial_checksum(&serial))
    }
}

/// Identity that never becomes available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl DeviceIdentity for NoIdentity {
    fn serial(&self) -> Option<String> {
        None
    }
}

/// In-memory serial that can be published once storage has been initialized
#[derive(Debug, Default)]
pub struct SharedSerial {
    serial: RwLock<Option<String>>,
}

impl SharedSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serial(serial: impl Into<String>) -> Self {
        let shared = Self::new();
        shared.set_serial(serial);
        shared
    }

    /// Read the serial from `SHUTTER_SERIAL` (unset or empty means unavailable)
    pub fn from_env() -> Self {
        let shared = Self::new();
        if let Ok(serial) = std::env::var(ENV_SERIAL) {
            shared.set_serial(serial);
        }
        shared
    }

    /// Publish the serial. Empty values are ignored.
    pub fn set_serial(&self, serial: impl Into<String>) {
        let serial = serial.into();
        let serial = serial.trim();
        if serial.is_empty() {
            return;
        }

        match self.serial.write() {
            Ok(mut guard) => *guard = Some(serial.to_string()),
            Err(poisoned) => *poisoned.into_inner() = Some(serial.to_string()),
        }
    }
}

impl DeviceIdentity for SharedSerial {
    fn serial(&self) -> Option<String> {
        let guard = match self.serial.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone().filter(|serial| !serial.is_empty())
    }
}
