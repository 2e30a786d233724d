/// Settings shared by the storage adapters.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Number of pairs fetched per scan round trip.
    pub scan_page_size: u32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            scan_page_size: 128,
        }
    }
}

/// Connection settings for [`TikvAdapter`](crate::TikvAdapter).
#[cfg(feature = "tikv")]
#[derive(Debug, Clone, Default)]
pub struct TikvConfig {
    pub pd_endpoints: Vec<String>,
    pub adapter: AdapterConfig,
}
