pub mod characteristic;
pub mod connection;
pub mod event;
pub mod profile;
pub mod service;

use characteristic::{AttributeValue, CharacteristicDescriptor};
use connection::Connection;
use event::{GattsEvent, GattsEventMessage};
use profile::Profile;
use service::ServiceDescriptor;

use crate::{
    bt::{AppId, ConnectionId, GattInterface, GattStatus, Handle, TransferId, Uuid16},
    error::{PeripheralError, Result, SetupStage},
    peripheral::Outcome,
    stack::GattsCommands,
};

pub const PROFILE_APP_ID: AppId = 0;
pub const SERVICE_UUID: Uuid16 = Uuid16(0x4242);
pub const CHAR_UUID: Uuid16 = Uuid16(0x6969);
pub const SERVICE_NUM_HANDLES: u16 = 4;
pub const HELLO_WORLD: &[u8; 12] = b"Hello World\0";

/// Interface value the stack uses for events not bound to one application.
pub const GATT_IF_NONE: GattInterface = 0xff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    pub handle: Handle,
    pub offset: u16,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattsState {
    Unregistered,
    Registering,
    ServiceCreating,
    CharacteristicAdding,
    Ready,
    Failed(SetupStage),
}

/// Builds the single service of the profile one confirmation at a time and
/// answers reads once its characteristic exists.
pub struct GattServerController {
    profile: Profile,
    state: GattsState,

    service: ServiceDescriptor,
    characteristic: CharacteristicDescriptor,
}

impl GattServerController {
    pub fn new(
        app_id: AppId,
        service: ServiceDescriptor,
        characteristic: CharacteristicDescriptor,
    ) -> Self {
        Self {
            profile: Profile::new(app_id),
            state: GattsState::Unregistered,
            service,
            characteristic,
        }
    }

    pub fn hello_world() -> anyhow::Result<Self> {
        Ok(Self::new(
            PROFILE_APP_ID,
            ServiceDescriptor::primary(SERVICE_UUID, SERVICE_NUM_HANDLES),
            CharacteristicDescriptor::read_only(CHAR_UUID, HELLO_WORLD)?,
        ))
    }

    pub fn state(&self) -> GattsState {
        self.state
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_connected(&self) -> bool {
        self.profile.is_connected()
    }

    /// Registers the application; everything else follows from the
    /// registration confirmation.
    pub fn start<G: GattsCommands + ?Sized>(&mut self, gatts: &G) -> Result<Outcome> {
        if self.state != GattsState::Unregistered {
            log::warn!("GATT application already registering, state {:?}", self.state);
            return Ok(Outcome::Ignored);
        }

        gatts
            .register_app(self.profile.app_id)
            .map_err(PeripheralError::command("register app"))?;
        self.state = GattsState::Registering;

        Ok(Outcome::Handled)
    }

    /// Forgets every handle and connection so that `start` can run again.
    pub fn reset(&mut self) {
        self.profile.reset();
        self.state = GattsState::Unregistered;
    }

    pub fn handle_event<G: GattsCommands + ?Sized>(
        &mut self,
        gatts: &G,
        message: &GattsEventMessage,
    ) -> Result<Outcome> {
        let GattsEventMessage(interface, event) = message;
        let interface = *interface;

        if let Some(own) = self.profile.interface {
            if interface != own && interface != GATT_IF_NONE {
                log::debug!("Ignoring event {:?} for interface {}", event, interface);
                return Ok(Outcome::Ignored);
            }
        }

        match (self.state, event) {
            (
                GattsState::Unregistered | GattsState::Registering,
                GattsEvent::ServiceRegistered { status, app_id },
            ) => {
                if *app_id != self.profile.app_id {
                    log::warn!("Ignoring registration of foreign app {}", app_id);
                    return Ok(Outcome::Ignored);
                }
                if *status != GattStatus::Ok {
                    return self.fail(SetupStage::Registration, *status);
                }

                log::info!("Registered GATT application {} on interface {}", app_id, interface);
                self.profile.interface = Some(interface);

                gatts
                    .create_service(interface, &self.service)
                    .map_err(PeripheralError::command("create service"))?;
                self.state = GattsState::ServiceCreating;

                Ok(Outcome::Registered)
            }
            (
                GattsState::ServiceCreating,
                GattsEvent::ServiceCreated {
                    status,
                    service_handle,
                },
            ) => {
                if *status != GattStatus::Ok {
                    return self.fail(SetupStage::ServiceCreation, *status);
                }

                log::info!(
                    "Service {} created with handle {}",
                    self.service.uuid,
                    service_handle
                );
                self.profile.service_handle = Some(*service_handle);

                gatts
                    .start_service(*service_handle)
                    .map_err(PeripheralError::command("start service"))?;
                gatts
                    .add_characteristic(*service_handle, &self.characteristic)
                    .map_err(PeripheralError::command("add characteristic"))?;
                self.state = GattsState::CharacteristicAdding;

                Ok(Outcome::Handled)
            }
            (
                GattsState::CharacteristicAdding | GattsState::Ready,
                GattsEvent::ServiceStarted {
                    status,
                    service_handle,
                },
            ) if self.profile.service_handle == Some(*service_handle) => {
                if *status != GattStatus::Ok {
                    return self.fail(SetupStage::ServiceStart, *status);
                }

                log::info!("Service with handle {} started", service_handle);
                self.profile.service_started = true;

                Ok(Outcome::Handled)
            }
            (
                GattsState::CharacteristicAdding,
                GattsEvent::CharacteristicAdded {
                    status,
                    attr_handle,
                    service_handle,
                    char_uuid,
                },
            ) => {
                if self.profile.service_handle != Some(*service_handle) {
                    log::warn!(
                        "Ignoring characteristic added to foreign service {}",
                        service_handle
                    );
                    return Ok(Outcome::Ignored);
                }
                if char_uuid.is_some_and(|uuid| uuid != self.characteristic.uuid) {
                    log::warn!("Ignoring unexpected characteristic {:?}", char_uuid);
                    return Ok(Outcome::Ignored);
                }
                if *status != GattStatus::Ok {
                    return self.fail(SetupStage::CharacteristicAdd, *status);
                }

                log::info!(
                    "Characteristic {} added with handle {}",
                    self.characteristic.uuid,
                    attr_handle
                );
                self.profile.characteristic_handle = Some(*attr_handle);
                self.state = GattsState::Ready;

                Ok(Outcome::Handled)
            }
            (
                GattsState::Ready | GattsState::Failed(_),
                GattsEvent::Read {
                    conn_id,
                    trans_id,
                    handle,
                    offset,
                    need_rsp,
                    ..
                },
            ) => {
                if !need_rsp {
                    log::warn!("Read event without response, ignoring");
                    return Ok(Outcome::Ignored);
                }

                self.respond_read(gatts, interface, *conn_id, *trans_id, *handle, *offset)
            }
            (GattsState::Ready | GattsState::Failed(_), GattsEvent::PeerConnected { conn_id, addr }) => {
                if let Some(current) = self.profile.connection {
                    log::warn!(
                        "Ignoring connection {} from {}, already connected to {}",
                        conn_id,
                        addr,
                        current.address
                    );
                    return Ok(Outcome::Ignored);
                }

                log::info!("Device {} connected, connection {}", addr, conn_id);
                self.profile.connection = Some(Connection {
                    id: *conn_id,
                    address: *addr,
                });

                Ok(Outcome::Connected)
            }
            (
                GattsState::Ready | GattsState::Failed(_),
                GattsEvent::PeerDisconnected { conn_id, addr },
            ) => {
                if self.profile.connection.map(|c| c.id) != Some(*conn_id) {
                    log::warn!("Ignoring disconnect of unknown connection {}", conn_id);
                    return Ok(Outcome::Ignored);
                }

                log::info!("Device {} disconnected", addr);
                self.profile.connection = None;

                Ok(Outcome::Disconnected)
            }
            (_, GattsEvent::ResponseComplete { status, handle }) => {
                if *status != GattStatus::Ok {
                    log::warn!("Response for handle {} completed with {:?}", handle, status);
                }

                Ok(Outcome::Handled)
            }
            (state, event) => {
                log::debug!("Ignoring GATT event {:?} in state {:?}", event, state);
                Ok(Outcome::Ignored)
            }
        }
    }

    fn respond_read<G: GattsCommands + ?Sized>(
        &self,
        gatts: &G,
        interface: GattInterface,
        conn_id: ConnectionId,
        trans_id: TransferId,
        handle: Handle,
        offset: u16,
    ) -> Result<Outcome> {
        if self.profile.characteristic_handle != Some(handle) {
            log::warn!("Read request for unknown handle {}", handle);
            gatts
                .send_response(interface, conn_id, trans_id, GattStatus::NotFound, None)
                .map_err(PeripheralError::command("send response"))?;
            return Ok(Outcome::Handled);
        }

        let value = self.characteristic.value();
        let Some(tail) = value.get(offset as usize..) else {
            log::warn!("Read offset {} past value of {} bytes", offset, value.len());
            gatts
                .send_response(interface, conn_id, trans_id, GattStatus::Error, None)
                .map_err(PeripheralError::command("send response"))?;
            return Ok(Outcome::Handled);
        };

        let response = ReadResponse {
            handle,
            offset,
            // A tail of the characteristic value always fits the same buffer.
            value: AttributeValue::from_slice(tail).unwrap_or_default(),
        };

        log::info!(
            "Sending read response with handle: {:?}, bytes: {:?}",
            handle,
            tail
        );
        gatts
            .send_response(interface, conn_id, trans_id, GattStatus::Ok, Some(&response))
            .map_err(PeripheralError::command("send response"))?;

        Ok(Outcome::Handled)
    }

    fn fail(&mut self, stage: SetupStage, status: GattStatus) -> Result<Outcome> {
        log::error!("GATT setup failed at {} with {:?}", stage, status);
        self.state = GattsState::Failed(stage);

        Err(PeripheralError::SetupFailed {
            stage,
            status: status.into(),
        })
    }
}
