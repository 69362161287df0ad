use crate::bt::{AppId, BdAddr, ConnectionId, GattInterface, GattStatus, Handle, TransferId, Uuid16};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GattsEvent {
    ServiceRegistered {
        status: GattStatus,
        app_id: AppId,
    },
    ServiceCreated {
        status: GattStatus,
        service_handle: Handle,
    },
    ServiceStarted {
        status: GattStatus,
        service_handle: Handle,
    },
    CharacteristicAdded {
        status: GattStatus,
        attr_handle: Handle,
        service_handle: Handle,
        // `None` when the stack reports a 128-bit UUID.
        char_uuid: Option<Uuid16>,
    },
    Read {
        conn_id: ConnectionId,
        trans_id: TransferId,
        addr: BdAddr,
        handle: Handle,
        offset: u16,
        need_rsp: bool,
    },
    PeerConnected {
        conn_id: ConnectionId,
        addr: BdAddr,
    },
    PeerDisconnected {
        conn_id: ConnectionId,
        addr: BdAddr,
    },
    ResponseComplete {
        status: GattStatus,
        handle: Handle,
    },

    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattsEventMessage(pub GattInterface, pub GattsEvent);

#[cfg(target_os = "espidf")]
impl<'d> From<esp_idf_svc::bt::ble::gatt::server::GattsEvent<'d>> for GattsEvent {
    fn from(event: esp_idf_svc::bt::ble::gatt::server::GattsEvent<'d>) -> Self {
        use esp_idf_svc::bt::ble::gatt::server::GattsEvent as EspGattsEvent;

        match event {
            EspGattsEvent::ServiceRegistered { status, app_id } => GattsEvent::ServiceRegistered {
                status: status.into(),
                app_id,
            },
            EspGattsEvent::ServiceCreated {
                status,
                service_handle,
                ..
            } => GattsEvent::ServiceCreated {
                status: status.into(),
                service_handle,
            },
            EspGattsEvent::ServiceStarted {
                status,
                service_handle,
            } => GattsEvent::ServiceStarted {
                status: status.into(),
                service_handle,
            },
            EspGattsEvent::CharacteristicAdded {
                status,
                attr_handle,
                service_handle,
                char_uuid,
            } => GattsEvent::CharacteristicAdded {
                status: status.into(),
                attr_handle,
                service_handle,
                char_uuid: crate::ble::uuid16(&char_uuid),
            },
            EspGattsEvent::Read {
                conn_id,
                trans_id,
                addr,
                handle,
                offset,
                need_rsp,
                ..
            } => GattsEvent::Read {
                conn_id,
                trans_id,
                addr: crate::ble::bd_addr(&addr),
                handle,
                offset,
                need_rsp,
            },
            EspGattsEvent::PeerConnected { conn_id, addr, .. } => GattsEvent::PeerConnected {
                conn_id,
                addr: crate::ble::bd_addr(&addr),
            },
            EspGattsEvent::PeerDisconnected { conn_id, addr, .. } => {
                GattsEvent::PeerDisconnected {
                    conn_id,
                    addr: crate::ble::bd_addr(&addr),
                }
            }
            EspGattsEvent::ResponseComplete { status, handle } => GattsEvent::ResponseComplete {
                status: status.into(),
                handle,
            },
            _ => GattsEvent::Other,
        }
    }
}
