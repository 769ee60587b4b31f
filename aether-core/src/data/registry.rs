//! Provider capability probe.
//!
//! At startup each provider is checked once: is its client compiled into this
//! build (cargo features `yahoo`, `alpha-vantage`, `polygon`), and are its
//! credentials configured? The result is a fixed slot per provider in
//! priority order. The orchestrator reads the slots and never deals with
//! missing clients or keys inline.

use super::provider::DataProvider;
#[cfg(any(feature = "yahoo", feature = "alpha-vantage", feature = "polygon"))]
use super::provider::DataError;
use crate::domain::ProviderId;
use std::fmt;
use std::time::Duration;

/// Settings the adapters need at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub alpha_vantage_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
    /// Per-call HTTP timeout.
    pub request_timeout: Duration,
    /// Minimum spacing between calls to a quota-bound provider.
    pub min_request_interval: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            polygon_api_key: None,
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_secs(1),
        }
    }
}

impl ProviderConfig {
    /// Configured key for `provider`, ignoring blank values.
    pub fn api_key(&self, provider: ProviderId) -> Option<&str> {
        let key = match provider {
            ProviderId::Yahoo => None,
            ProviderId::AlphaVantage => self.alpha_vantage_api_key.as_deref(),
            ProviderId::Polygon => self.polygon_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Why a provider cannot be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The client was left out of this build.
    NotCompiled,
    /// The provider needs an API key and none is configured.
    MissingCredentials,
    /// The client could not be constructed.
    ClientError(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NotCompiled => f.write_str("client not available in this build"),
            Unavailable::MissingCredentials => f.write_str("API key not configured"),
            Unavailable::ClientError(msg) => write!(f, "client setup failed: {msg}"),
        }
    }
}

pub enum SlotState {
    Ready(Box<dyn DataProvider>),
    Unavailable(Unavailable),
}

pub struct ProviderSlot {
    pub id: ProviderId,
    pub state: SlotState,
}

impl ProviderSlot {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SlotState::Ready(_))
    }
}

impl fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            SlotState::Ready(_) => "ready".to_string(),
            SlotState::Unavailable(reason) => reason.to_string(),
        };
        f.debug_struct("ProviderSlot")
            .field("id", &self.id)
            .field("state", &state)
            .finish()
    }
}

/// One slot per provider, always in `ProviderId::PRIORITY` order.
#[derive(Debug)]
pub struct ProviderRegistry {
    slots: Vec<ProviderSlot>,
}

impl ProviderRegistry {
    /// Probe every provider against the build features and `config`.
    pub fn probe(config: &ProviderConfig) -> Self {
        let mut registry = Self::empty();
        for id in ProviderId::PRIORITY {
            let state = match build_provider(id, config) {
                Ok(provider) => SlotState::Ready(provider),
                Err(reason) => SlotState::Unavailable(reason),
            };
            registry.set(id, state);
        }
        let ready: Vec<&str> = registry.available().into_iter().map(|p| p.key()).collect();
        tracing::info!(providers = ?ready, "provider capability probe complete");
        registry
    }

    /// Registry with every slot marked not compiled. Useful as a base for
    /// tests and for offline runs.
    pub fn empty() -> Self {
        let slots = ProviderId::PRIORITY
            .into_iter()
            .map(|id| ProviderSlot {
                id,
                state: SlotState::Unavailable(Unavailable::NotCompiled),
            })
            .collect();
        Self { slots }
    }

    /// Install `provider` in its own slot, replacing whatever was there.
    pub fn with_provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        let id = provider.id();
        self.set(id, SlotState::Ready(provider));
        self
    }

    pub fn with_unavailable(mut self, id: ProviderId, reason: Unavailable) -> Self {
        self.set(id, SlotState::Unavailable(reason));
        self
    }

    fn set(&mut self, id: ProviderId, state: SlotState) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            slot.state = state;
        }
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    pub fn slot(&self, id: ProviderId) -> Option<&ProviderSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Providers that can be attempted, in priority order.
    pub fn available(&self) -> Vec<ProviderId> {
        self.slots
            .iter()
            .filter(|s| s.is_ready())
            .map(|s| s.id)
            .collect()
    }
}

#[cfg(any(feature = "yahoo", feature = "alpha-vantage", feature = "polygon"))]
fn client_error(err: DataError) -> Unavailable {
    match err {
        DataError::MissingApiKey => Unavailable::MissingCredentials,
        other => Unavailable::ClientError(other.to_string()),
    }
}

fn build_provider(
    id: ProviderId,
    config: &ProviderConfig,
) -> Result<Box<dyn DataProvider>, Unavailable> {
    match id {
        ProviderId::Yahoo => build_yahoo(config),
        ProviderId::AlphaVantage => build_alpha_vantage(config),
        ProviderId::Polygon => build_polygon(config),
    }
}

#[cfg(feature = "yahoo")]
fn build_yahoo(config: &ProviderConfig) -> Result<Box<dyn DataProvider>, Unavailable> {
    let provider = super::yahoo::YahooProvider::new(config.request_timeout).map_err(client_error)?;
    Ok(Box::new(provider))
}

#[cfg(not(feature = "yahoo"))]
fn build_yahoo(_config: &ProviderConfig) -> Result<Box<dyn DataProvider>, Unavailable> {
    Err(Unavailable::NotCompiled)
}

#[cfg(feature = "alpha-vantage")]
fn build_alpha_vantage(config: &ProviderConfig) -> Result<Box<dyn DataProvider>, Unavailable> {
    let key = config
        .api_key(ProviderId::AlphaVantage)
        .ok_or(Unavailable::MissingCredentials)?;
    let provider = super::alpha_vantage::AlphaVantageProvider::new(
        key,
        config.request_timeout,
        config.min_request_interval,
    )
    .map_err(client_error)?;
    Ok(Box::new(provider))
}

#[cfg(not(feature = "alpha-vantage"))]
fn build_alpha_vantage(_config: &ProviderConfig) -> Result<Box<dyn DataProvider>, Unavailable> {
    Err(Unavailable::NotCompiled)
}

#[cfg(feature = "polygon")]
fn build_polygon(config: &ProviderConfig) -> Result<Box<dyn DataProvider>, Unavailable> {
    let key = config
        .api_key(ProviderId::Polygon)
        .ok_or(Unavailable::MissingCredentials)?;
    let provider = super::polygon::PolygonProvider::new(
        key,
        config.request_timeout,
        config.min_request_interval,
    )
    .map_err(client_error)?;
    Ok(Box::new(provider))
}

#[cfg(not(feature = "polygon"))]
fn build_polygon(_config: &ProviderConfig) -> Result<Box<dyn DataProvider>, Unavailable> {
    Err(Unavailable::NotCompiled)
}
