use crate::bt::{BdAddr, ConnectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub address: BdAddr,
}
