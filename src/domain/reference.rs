//! Carriers and destination states, loaded once per session.

use tracing::{info, warn};

use super::entities::{Carrier, State};
use crate::infra::api::ShippingApi;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceData {
    pub carriers: Vec<Carrier>,
    pub states: Vec<State>,
}

impl ReferenceData {
    pub fn carrier(&self, id: &str) -> Option<&Carrier> {
        self.carriers.iter().find(|carrier| carrier.id == id)
    }

    /// Display name for a carrier id, falling back to the id itself.
    pub fn carrier_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.carrier(id).map(|carrier| carrier.name.as_str()).unwrap_or(id)
    }
}

/// Fetches carriers and states concurrently. A failed fetch leaves that list empty.
pub async fn load_reference_data(api: &dyn ShippingApi) -> ReferenceData {
    let (carriers, states) = tokio::join!(api.list_carriers(), api.list_states());

    let carriers = carriers.unwrap_or_else(|err| {
        warn!(error = %err, "failed to load carriers; continuing without them");
        Vec::new()
    });
    let states = states.unwrap_or_else(|err| {
        warn!(error = %err, "failed to load states; continuing without them");
        Vec::new()
    });

    info!(
        carriers = carriers.len(),
        states = states.len(),
        "reference data loaded"
    );
    ReferenceData { carriers, states }
}
