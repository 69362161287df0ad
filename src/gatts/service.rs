use crate::bt::Uuid16;

/// Identity of the exposed GATT service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub uuid: Uuid16,
    pub is_primary: bool,
    pub inst_id: u8,
    // Attribute handles the stack reserves for the service.
    pub num_handles: u16,
}

impl ServiceDescriptor {
    pub fn primary(uuid: Uuid16, num_handles: u16) -> Self {
        Self {
            uuid,
            is_primary: true,
            inst_id: 0,
            num_handles,
        }
    }
}
