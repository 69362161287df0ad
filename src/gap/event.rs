use crate::bt::BtStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapEvent {
    AdvertisingConfigured(BtStatus),
    AdvertisingStarted(BtStatus),
    AdvertisingStopped(BtStatus),

    Other,
}

#[cfg(target_os = "espidf")]
impl<'d> From<esp_idf_svc::bt::ble::gap::BleGapEvent<'d>> for GapEvent {
    fn from(event: esp_idf_svc::bt::ble::gap::BleGapEvent<'d>) -> Self {
        use esp_idf_svc::bt::ble::gap::BleGapEvent;

        match event {
            BleGapEvent::AdvertisingConfigured(bt_status) => {
                GapEvent::AdvertisingConfigured(bt_status.into())
            }
            BleGapEvent::AdvertisingStarted(bt_status) => {
                GapEvent::AdvertisingStarted(bt_status.into())
            }
            BleGapEvent::AdvertisingStopped(bt_status) => {
                GapEvent::AdvertisingStopped(bt_status.into())
            }
            _ => GapEvent::Other,
        }
    }
}
