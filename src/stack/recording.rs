use std::sync::{Arc, Mutex};

use super::{GapCommands, GattsCommands};
use crate::{
    bt::{AppId, ConnectionId, GattInterface, GattStatus, Handle, TransferId},
    gap::config::{AdvertisingData, AdvertisingParams},
    gatts::{characteristic::CharacteristicDescriptor, service::ServiceDescriptor, ReadResponse},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ConfigureAdvertising(AdvertisingData),
    StartAdvertising(AdvertisingParams),
    RegisterApp(AppId),
    CreateService {
        interface: GattInterface,
        service: ServiceDescriptor,
    },
    StartService(Handle),
    AddCharacteristic {
        service_handle: Handle,
        characteristic: CharacteristicDescriptor,
    },
    SendResponse {
        interface: GattInterface,
        conn_id: ConnectionId,
        trans_id: TransferId,
        status: GattStatus,
        response: Option<ReadResponse>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::ConfigureAdvertising(_) => "configure_advertising",
            Command::StartAdvertising(_) => "start_advertising",
            Command::RegisterApp(_) => "register_app",
            Command::CreateService { .. } => "create_service",
            Command::StartService(_) => "start_service",
            Command::AddCharacteristic { .. } => "add_characteristic",
            Command::SendResponse { .. } => "send_response",
        }
    }
}

/// Stack double that records every issued command. Clones share the log.
#[derive(Clone, Default)]
pub struct RecordingStack {
    commands: Arc<Mutex<Vec<Command>>>,
    rejecting: Arc<Mutex<Option<&'static str>>>,
}

impl RecordingStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }

    /// Makes every later command with the given name fail synchronously.
    pub fn reject(&self, command: &'static str) {
        *self.rejecting.lock().unwrap() = Some(command);
    }

    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.commands.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, command: Command) -> anyhow::Result<()> {
        if *self.rejecting.lock().unwrap() == Some(command.name()) {
            return Err(anyhow::anyhow!("{} rejected by stack", command.name()));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

impl GapCommands for RecordingStack {
    fn configure_advertising(&self, data: &AdvertisingData) -> anyhow::Result<()> {
        self.record(Command::ConfigureAdvertising(data.clone()))
    }

    fn start_advertising(&self, params: &AdvertisingParams) -> anyhow::Result<()> {
        self.record(Command::StartAdvertising(params.clone()))
    }
}

impl GattsCommands for RecordingStack {
    fn register_app(&self, app_id: AppId) -> anyhow::Result<()> {
        self.record(Command::RegisterApp(app_id))
    }

    fn create_service(
        &self,
        interface: GattInterface,
        service: &ServiceDescriptor,
    ) -> anyhow::Result<()> {
        self.record(Command::CreateService {
            interface,
            service: service.clone(),
        })
    }

    fn start_service(&self, service_handle: Handle) -> anyhow::Result<()> {
        self.record(Command::StartService(service_handle))
    }

    fn add_characteristic(
        &self,
        service_handle: Handle,
        characteristic: &CharacteristicDescriptor,
    ) -> anyhow::Result<()> {
        self.record(Command::AddCharacteristic {
            service_handle,
            characteristic: characteristic.clone(),
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
        self.record(Command::SendResponse {
            interface,
            conn_id,
            trans_id,
            status,
            response: response.cloned(),
        })
    }
}
