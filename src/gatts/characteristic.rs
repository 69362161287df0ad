use enumset::{enum_set, EnumSet, EnumSetType};

use crate::bt::Uuid16;

/// Largest attribute value the server keeps in memory.
pub const VALUE_CAPACITY: usize = 64;

pub type AttributeValue = heapless::Vec<u8, VALUE_CAPACITY>;

#[derive(EnumSetType, Debug)]
pub enum Permission {
    Read,
    ReadEncrypted,
    Write,
    WriteEncrypted,
}

#[derive(EnumSetType, Debug)]
pub enum Property {
    Broadcast,
    Read,
    WriteNoResponse,
    Write,
    Notify,
    Indicate,
}

/// A characteristic with a fixed value. The maximum length the stack
/// reserves is the length of the value it was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicDescriptor {
    pub uuid: Uuid16,
    pub permissions: EnumSet<Permission>,
    pub properties: EnumSet<Property>,
    value: AttributeValue,
}

impl CharacteristicDescriptor {
    pub fn read_only(uuid: Uuid16, value: &[u8]) -> anyhow::Result<Self> {
        let value = AttributeValue::from_slice(value).map_err(|_| {
            anyhow::anyhow!(
                "Characteristic value of {} bytes exceeds {} bytes",
                value.len(),
                VALUE_CAPACITY
            )
        })?;

        Ok(Self {
            uuid,
            permissions: enum_set!(Permission::Read),
            properties: enum_set!(Property::Read),
            value,
        })
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn max_len(&self) -> usize {
        self.value.len()
    }

    pub fn is_readable(&self) -> bool {
        self.permissions.contains(Permission::Read) && self.properties.contains(Property::Read)
    }
}
