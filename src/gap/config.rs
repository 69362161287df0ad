use enumset::{enum_set, EnumSet, EnumSetType};

/// Bits of the advertisement Flags AD structure.
#[derive(EnumSetType, Debug)]
#[enumset(repr = "u8")]
pub enum AdvertisingFlag {
    LimitedDiscoverable,
    GeneralDiscoverable,
    BrEdrNotSupported,
    SimultaneousLeBrEdrController,
    SimultaneousLeBrEdrHost,
}

#[derive(EnumSetType, Debug)]
#[enumset(repr = "u8")]
pub enum AdvertisingChannel {
    Channel37,
    Channel38,
    Channel39,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingType {
    ConnectableUndirected,
    ConnectableDirectedHighDuty,
    Scannable,
    NonConnectable,
    ConnectableDirectedLowDuty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnAddressType {
    Public,
    Random,
    ResolvablePublic,
    ResolvableRandom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    AllowScanAnyConnectAny,
    AllowScanWhitelistConnectAny,
    AllowScanAnyConnectWhitelist,
    AllowScanWhitelistConnectWhitelist,
}

/// Advertisement payload content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingData {
    pub flags: EnumSet<AdvertisingFlag>,
    pub include_name: bool,
    pub include_txpower: bool,
}

impl AdvertisingData {
    /// Flags as the single byte carried over the air.
    pub fn flag_bits(&self) -> u8 {
        self.flags.as_repr()
    }
}

impl Default for AdvertisingData {
    fn default() -> Self {
        Self {
            flags: enum_set!(
                AdvertisingFlag::GeneralDiscoverable | AdvertisingFlag::BrEdrNotSupported
            ),
            include_name: true,
            include_txpower: false,
        }
    }
}

/// Advertising timing and filter parameters. Intervals are in 0.625 ms units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingParams {
    pub interval_min: u16,
    pub interval_max: u16,
    pub adv_type: AdvertisingType,
    pub own_addr_type: OwnAddressType,
    pub channel_map: EnumSet<AdvertisingChannel>,
    pub filter_policy: FilterPolicy,
}

impl AdvertisingParams {
    pub const INTERVAL_RANGE: std::ops::RangeInclusive<u16> = 0x20..=0x4000;

    pub fn channel_bits(&self) -> u8 {
        self.channel_map.as_repr()
    }
}

impl Default for AdvertisingParams {
    fn default() -> Self {
        Self {
            interval_min: 0x20,
            interval_max: 0x40,
            adv_type: AdvertisingType::ConnectableUndirected,
            own_addr_type: OwnAddressType::Public,
            channel_map: EnumSet::all(),
            filter_policy: FilterPolicy::AllowScanAnyConnectAny,
        }
    }
}
