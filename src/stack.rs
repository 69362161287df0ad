//! Commands the controllers issue into the BLE stack.
//!
//! Every command only queues work inside the stack; completion is reported
//! later through a [`GapEvent`](crate::gap::event::GapEvent) or
//! [`GattsEvent`](crate::gatts::event::GattsEvent).

#[cfg(test)]
pub mod recording;

use crate::{
    bt::{AppId, ConnectionId, GattInterface, GattStatus, Handle, TransferId},
    gap::config::{AdvertisingData, AdvertisingParams},
    gatts::{characteristic::CharacteristicDescriptor, service::ServiceDescriptor, ReadResponse},
};

pub trait GapCommands {
    fn configure_advertising(&self, data: &AdvertisingData) -> anyhow::Result<()>;

    fn start_advertising(&self, params: &AdvertisingParams) -> anyhow::Result<()>;
}

pub trait GattsCommands {
    fn register_app(&self, app_id: AppId) -> anyhow::Result<()>;

    fn create_service(
        &self,
        interface: GattInterface,
        service: &ServiceDescriptor,
    ) -> anyhow::Result<()>;

    fn start_service(&self, service_handle: Handle) -> anyhow::Result<()>;

    fn add_characteristic(
        &self,
        service_handle: Handle,
        characteristic: &CharacteristicDescriptor,
    ) -> anyhow::Result<()>;

    fn send_response(
        &self,
        interface: GattInterface,
        conn_id: ConnectionId,
        trans_id: TransferId,
        status: GattStatus,
        response: Option<&ReadResponse>,
    ) -> anyhow::Result<()>;
}

/// Both halves of a peripheral stack.
pub trait BleStack: GapCommands + GattsCommands {}

impl<T: GapCommands + GattsCommands + ?Sized> BleStack for T {}
