use crate::{
    config::PeripheralConfig,
    error::{PeripheralError, Result},
    gap::{event::GapEvent, AdvertisingController},
    gatts::{event::GattsEventMessage, GattServerController},
    stack::BleStack,
};

/// Everything the BLE stack reports back, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    Gap(GapEvent),
    Gatts(GattsEventMessage),
}

impl From<GapEvent> for StackEvent {
    fn from(event: GapEvent) -> Self {
        StackEvent::Gap(event)
    }
}

impl From<GattsEventMessage> for StackEvent {
    fn from(message: GattsEventMessage) -> Self {
        StackEvent::Gatts(message)
    }
}

/// What handling a single event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    /// Not valid in the current state; nothing changed and nothing was sent.
    Ignored,
    Registered,
    Connected,
    Disconnected,
}

/// The peripheral's complete state. One owner feeds it events one at a time.
pub struct Peripheral {
    advertising: AdvertisingController,
    gatts: GattServerController,
}

impl Peripheral {
    pub fn new(config: PeripheralConfig) -> Result<Self> {
        config.validate()?;

        let gatts = GattServerController::hello_world()
            .map_err(|err| PeripheralError::InvalidConfig(err.to_string()))?;
        let advertising = AdvertisingController::new(
            config.advertising,
            config.advertising_params,
            config.advertising_retries,
        );

        Ok(Self {
            advertising,
            gatts,
        })
    }

    pub fn advertising(&self) -> &AdvertisingController {
        &self.advertising
    }

    pub fn gatts(&self) -> &GattServerController {
        &self.gatts
    }

    /// Kicks off the setup chain by registering the GATT application.
    pub fn start<S: BleStack + ?Sized>(&mut self, stack: &S) -> Result<Outcome> {
        log::info!("Registering GATT application");
        self.gatts.start(stack)
    }

    pub fn handle<S: BleStack + ?Sized>(&mut self, stack: &S, event: &StackEvent) -> Result<Outcome> {
        match event {
            StackEvent::Gap(event) => self.advertising.handle_event(stack, event),
            StackEvent::Gatts(message) => {
                let outcome = self.gatts.handle_event(stack, message)?;

                match outcome {
                    Outcome::Registered => {
                        self.advertising.configure(stack)?;
                    }
                    Outcome::Connected => self.advertising.suspend(),
                    Outcome::Disconnected => {
                        self.advertising.restart(stack)?;
                    }
                    Outcome::Handled | Outcome::Ignored => {}
                }

                Ok(outcome)
            }
        }
    }
}
