use crate::{
    error::{PeripheralError, Result},
    gap::config::{AdvertisingData, AdvertisingParams},
};

/// Longest name that still fits a legacy advertisement next to the flags.
pub const DEVICE_NAME_CAPACITY: usize = 29;

pub type DeviceName = heapless::String<DEVICE_NAME_CAPACITY>;

#[derive(Debug, Clone)]
pub struct PeripheralConfig {
    pub device_name: DeviceName,

    // Extra start attempts after the stack reports an advertising start
    // failure, per attempt.
    pub advertising_retries: u8,

    pub advertising: AdvertisingData,
    pub advertising_params: AdvertisingParams,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        let mut device_name = DeviceName::new();
        // Fits: five bytes into a 29 byte buffer.
        let _ = device_name.push_str("ESP32");

        Self {
            device_name,
            advertising_retries: 1,
            advertising: AdvertisingData::default(),
            advertising_params: AdvertisingParams::default(),
        }
    }
}

impl PeripheralConfig {
    pub fn with_device_name(mut self, name: &str) -> Result<Self> {
        let mut device_name = DeviceName::new();
        device_name.push_str(name).map_err(|_| {
            PeripheralError::InvalidConfig(format!(
                "device name {:?} is longer than {} bytes",
                name, DEVICE_NAME_CAPACITY
            ))
        })?;
        self.device_name = device_name;

        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.device_name.is_empty() {
            return Err(PeripheralError::InvalidConfig(
                "device name is empty".to_string(),
            ));
        }

        let params = &self.advertising_params;
        let range = AdvertisingParams::INTERVAL_RANGE;
        if !range.contains(&params.interval_min) || !range.contains(&params.interval_max) {
            return Err(PeripheralError::InvalidConfig(format!(
                "advertising interval [{:#x}, {:#x}] outside [{:#x}, {:#x}]",
                params.interval_min,
                params.interval_max,
                range.start(),
                range.end()
            )));
        }
        if params.interval_min > params.interval_max {
            return Err(PeripheralError::InvalidConfig(format!(
                "advertising interval min {:#x} above max {:#x}",
                params.interval_min, params.interval_max
            )));
        }
        if params.channel_map.is_empty() {
            return Err(PeripheralError::InvalidConfig(
                "advertising channel map is empty".to_string(),
            ));
        }

        Ok(())
    }
}
