use crate::bt::{AppId, GattInterface, Handle};

use super::connection::Connection;

/// The application's registration with the GATT server and everything the
/// stack assigned to it.
///
/// Handles only ever go from unset to assigned; [`Profile::reset`] is the one
/// way back.
#[derive(Debug)]
pub struct Profile {
    pub app_id: AppId,
    pub interface: Option<GattInterface>,
    pub connection: Option<Connection>,

    pub service_handle: Option<Handle>,
    pub service_started: bool,

    pub characteristic_handle: Option<Handle>,
}

impl Profile {
    pub fn new(app_id: AppId) -> Self {
        Self {
            app_id,
            interface: None,
            connection: None,
            service_handle: None,
            service_started: false,
            characteristic_handle: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.app_id);
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}
