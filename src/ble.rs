//! Bluedroid backend: bootstraps the controller and forwards the core's
//! commands to `esp-idf-svc`.

use std::sync::Arc;

use crossbeam_channel::Sender;
use enumset::EnumSet;
use esp_idf_svc as svc;
use esp_idf_svc::hal::modem::Modem;

use svc::bt::{
    ble::{
        gap::{AdvConfiguration, EspBleGap},
        gatt::{
            self,
            server::{AppId, ConnectionId, EspGatts, TransferId},
            AutoResponse, GattCharacteristic, GattId, GattInterface, GattResponse,
            GattServiceId, Handle,
        },
    },
    BtDriver, BtUuid,
};
use svc::nvs::EspDefaultNvsPartition;
use svc::sys;

use crate::{
    bt::{self, GattStatus, Uuid16},
    config::PeripheralConfig,
    gap::{
        config::{AdvertisingData, AdvertisingParams, AdvertisingType, FilterPolicy, OwnAddressType},
        event::GapEvent,
    },
    gatts::{
        characteristic::{CharacteristicDescriptor, Permission, Property},
        event::{GattsEvent, GattsEventMessage},
        service::ServiceDescriptor,
        ReadResponse,
    },
    peripheral::StackEvent,
    stack::{GapCommands, GattsCommands},
};

pub type ExtBtDriver = Arc<BtDriver<'static, svc::bt::Ble>>;

#[derive(Clone)]
pub struct Ble(pub Arc<BleInner>);

pub struct BleInner {
    _bt: ExtBtDriver,
    gap: EspBleGap<'static, svc::bt::Ble, ExtBtDriver>,
    gatts: EspGatts<'static, svc::bt::Ble, ExtBtDriver>,
}

impl Ble {
    /// Takes the NVS partition and brings the controller up in BLE-only mode.
    pub fn new(modem: Modem, config: &PeripheralConfig) -> anyhow::Result<Self> {
        let nvs = EspDefaultNvsPartition::take()?;
        let bt = Arc::new(BtDriver::<svc::bt::Ble>::new(modem, Some(nvs.clone()))?);

        let gap = EspBleGap::new(bt.clone())?;
        let gatts = EspGatts::new(bt.clone())?;

        gap.set_device_name(config.device_name.as_str())
            .map_err(|err| anyhow::anyhow!("Failed to set device name: {:?}", err))?;
        log::info!("BLE stack enabled as {:?}", config.device_name.as_str());

        Ok(Self(Arc::new(BleInner {
            _bt: bt,
            gap,
            gatts,
        })))
    }

    /// Forwards every GAP and GATT server callback into `events`.
    pub fn subscribe(&self, events: Sender<StackEvent>) -> anyhow::Result<()> {
        let gap_events = events.clone();
        self.0.gap.subscribe(move |e| {
            log::debug!("Received GAP event {:?}", e);

            let event = GapEvent::from(e);
            if event == GapEvent::Other {
                return;
            }

            gap_events.send(event.into()).unwrap_or_else(|err| {
                log::error!("Failed to send GAP event to channel: {:?}", err);
            });
        })?;

        self.0.gatts.subscribe(move |(interface, e)| {
            log::debug!("Received GATTS event {:?}", (interface, &e));

            let event = GattsEvent::from(e);
            if event == GattsEvent::Other {
                return;
            }

            events
                .send(GattsEventMessage(interface, event).into())
                .unwrap_or_else(|err| {
                    log::error!("Failed to send GATTS event to channel: {:?}", err);
                });
        })?;

        Ok(())
    }
}

impl GapCommands for Ble {
    fn configure_advertising(&self, data: &AdvertisingData) -> anyhow::Result<()> {
        self.0
            .gap
            .set_adv_conf(&AdvConfiguration {
                set_scan_rsp: false,
                include_name: data.include_name,
                include_txpower: data.include_txpower,
                flag: data.flag_bits(),
                ..Default::default()
            })
            .map_err(|err| anyhow::anyhow!("Failed to configure advertising: {:?}", err))
    }

    fn start_advertising(&self, params: &AdvertisingParams) -> anyhow::Result<()> {
        // EspBleGap::start_advertising uses fixed parameters, so go to the
        // Bluedroid API directly.
        let mut raw = sys::esp_ble_adv_params_t {
            adv_int_min: params.interval_min,
            adv_int_max: params.interval_max,
            adv_type: match params.adv_type {
                AdvertisingType::ConnectableUndirected => sys::esp_ble_adv_type_t_ADV_TYPE_IND,
                AdvertisingType::ConnectableDirectedHighDuty => {
                    sys::esp_ble_adv_type_t_ADV_TYPE_DIRECT_IND_HIGH
                }
                AdvertisingType::Scannable => sys::esp_ble_adv_type_t_ADV_TYPE_SCAN_IND,
                AdvertisingType::NonConnectable => sys::esp_ble_adv_type_t_ADV_TYPE_NONCONN_IND,
                AdvertisingType::ConnectableDirectedLowDuty => {
                    sys::esp_ble_adv_type_t_ADV_TYPE_DIRECT_IND_LOW
                }
            },
            own_addr_type: match params.own_addr_type {
                OwnAddressType::Public => sys::esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
                OwnAddressType::Random => sys::esp_ble_addr_type_t_BLE_ADDR_TYPE_RANDOM,
                OwnAddressType::ResolvablePublic => {
                    sys::esp_ble_addr_type_t_BLE_ADDR_TYPE_RPA_PUBLIC
                }
                OwnAddressType::ResolvableRandom => {
                    sys::esp_ble_addr_type_t_BLE_ADDR_TYPE_RPA_RANDOM
                }
            },
            channel_map: params.channel_bits() as _,
            adv_filter_policy: match params.filter_policy {
                FilterPolicy::AllowScanAnyConnectAny => {
                    sys::esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY
                }
                FilterPolicy::AllowScanWhitelistConnectAny => {
                    sys::esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_WLST_CON_ANY
                }
                FilterPolicy::AllowScanAnyConnectWhitelist => {
                    sys::esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_WLST
                }
                FilterPolicy::AllowScanWhitelistConnectWhitelist => {
                    sys::esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_WLST_CON_WLST
                }
            },
            ..Default::default()
        };

        sys::esp!(unsafe { sys::esp_ble_gap_start_advertising(&mut raw) })
            .map_err(|err| anyhow::anyhow!("Failed to start advertising: {:?}", err))
    }
}

impl GattsCommands for Ble {
    fn register_app(&self, app_id: AppId) -> anyhow::Result<()> {
        self.0.gatts.register_app(app_id).map_err(|err| {
            anyhow::anyhow!("Failed to register GATT app {:?}: {:?}", app_id, err)
        })
    }

    fn create_service(
        &self,
        interface: GattInterface,
        service: &ServiceDescriptor,
    ) -> anyhow::Result<()> {
        let service_id = GattServiceId {
            id: GattId {
                uuid: BtUuid::uuid16(service.uuid.0),
                inst_id: service.inst_id,
            },
            is_primary: service.is_primary,
        };

        self.0
            .gatts
            .create_service(interface, &service_id, service.num_handles as _)
            .map_err(|err| {
                anyhow::anyhow!("Failed to create service {}: {:?}", service.uuid, err)
            })
    }

    fn start_service(&self, service_handle: Handle) -> anyhow::Result<()> {
        self.0.gatts.start_service(service_handle).map_err(|err| {
            anyhow::anyhow!("Failed to start service {:?}: {:?}", service_handle, err)
        })
    }

    fn add_characteristic(
        &self,
        service_handle: Handle,
        characteristic: &CharacteristicDescriptor,
    ) -> anyhow::Result<()> {
        let mut permissions = EnumSet::new();
        for permission in characteristic.permissions {
            permissions.insert(match permission {
                Permission::Read => gatt::Permission::Read,
                Permission::ReadEncrypted => gatt::Permission::ReadEncrypted,
                Permission::Write => gatt::Permission::Write,
                Permission::WriteEncrypted => gatt::Permission::WriteEncrypted,
            });
        }

        let mut properties = EnumSet::new();
        for property in characteristic.properties {
            properties.insert(match property {
                Property::Broadcast => gatt::Property::Broadcast,
                Property::Read => gatt::Property::Read,
                Property::WriteNoResponse => gatt::Property::WriteNoResponse,
                Property::Write => gatt::Property::Write,
                Property::Notify => gatt::Property::Notify,
                Property::Indicate => gatt::Property::Indicate,
            });
        }

        let config = GattCharacteristic {
            uuid: BtUuid::uuid16(characteristic.uuid.0),
            permissions,
            properties,
            max_len: characteristic.max_len(),
            auto_rsp: AutoResponse::ByApp,
        };

        self.0
            .gatts
            .add_characteristic(service_handle, &config, characteristic.value())
            .map_err(|err| {
                anyhow::anyhow!(
                    "Failed to register GATT characteristic {}: {:?}",
                    characteristic.uuid,
                    err
                )
            })
    }

    fn send_response(
        &self,
        interface: GattInterface,
        conn_id: ConnectionId,
        trans_id: TransferId,
        status: GattStatus,
        response: Option<&ReadResponse>,
    ) -> anyhow::Result<()> {
        let response = match response {
            Some(response) => {
                let mut raw = GattResponse::new();
                raw.attr_handle(response.handle)
                    .auth_req(0)
                    .offset(response.offset)
                    .value(&response.value)?;
                Some(raw)
            }
            None => None,
        };

        self.0
            .gatts
            .send_response(interface, conn_id, trans_id, status.into(), response.as_ref())
            .map_err(|err| anyhow::anyhow!("Failed to send response: {:?}", err))
    }
}

pub(crate) fn uuid16(uuid: &BtUuid) -> Option<Uuid16> {
    match uuid.as_bytes() {
        [lo, hi] => Some(Uuid16(u16::from_le_bytes([*lo, *hi]))),
        _ => None,
    }
}

pub(crate) fn bd_addr(addr: &svc::bt::BdAddr) -> bt::BdAddr {
    bt::BdAddr(addr.addr())
}
