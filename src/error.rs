use std::fmt;

use crate::bt::Status;

/// The asynchronous setup step whose confirmation reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    Registration,
    ServiceCreation,
    ServiceStart,
    CharacteristicAdd,
    AdvertisingPayload,
    AdvertisingStart,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupStage::Registration => "app registration",
            SetupStage::ServiceCreation => "service creation",
            SetupStage::ServiceStart => "service start",
            SetupStage::CharacteristicAdd => "characteristic add",
            SetupStage::AdvertisingPayload => "advertising payload",
            SetupStage::AdvertisingStart => "advertising start",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PeripheralError {
    #[error("{stage} failed with status {status}")]
    SetupFailed { stage: SetupStage, status: Status },

    #[error("failed to issue {command} command")]
    Command {
        command: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PeripheralError {
    pub(crate) fn command(command: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| PeripheralError::Command {
            command,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PeripheralError>;
