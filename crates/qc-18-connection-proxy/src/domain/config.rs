//! Proxy configuration.

/// Mainnet message start (`f9 be b4 d9` on the wire).
pub const MAINNET_MAGIC: u32 = 0xD9B4_BEF9;
/// Testnet message start (`0b 11 09 07` on the wire).
pub const TESTNET_MAGIC: u32 = 0x0709_110B;
/// Regtest message start (`fa bf b5 da` on the wire).
pub const REGTEST_MAGIC: u32 = 0xDAB5_BFFA;

/// Largest payload accepted from a peer unless configured otherwise.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 4_000_000;

/// Known networks and their magic constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn magic(self) -> u32 {
        match self {
            Self::Mainnet => MAINNET_MAGIC,
            Self::Testnet => TESTNET_MAGIC,
            Self::Regtest => REGTEST_MAGIC,
        }
    }

    /// Look up a network by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Some(Self::Mainnet),
            "testnet" | "test" => Some(Self::Testnet),
            "regtest" => Some(Self::Regtest),
            _ => None,
        }
    }
}

/// Framing parameters shared by every proxy of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Network magic written to, and required on, every heading.
    pub magic: u32,
    /// Upper bound on a declared payload length (inbound and outbound).
    pub max_payload_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

impl ProxyConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            magic: network.magic(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }

    /// Regtest framing with a small payload limit.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            magic: REGTEST_MAGIC,
            max_payload_size: 1024,
        }
    }
}
