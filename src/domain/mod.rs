//! Shipping domain: entities, the package directory and the hire workflow.

pub mod app_state;
pub mod directory;
pub mod entities;
pub mod hire;
pub mod reference;
pub mod validation;

#[allow(unused_imports)]
pub use app_state::AppState;
#[allow(unused_imports)]
pub use directory::{fetch_packages, LoadState, PackageDirectory};
#[allow(unused_imports)]
pub use entities::{
    price_text, weight_text, Carrier, CarrierId, HireRequest, HiredCarrier, NewPackage, Package,
    PackageId, PackageStatus, Quote, State, StatusUpdate,
};
#[allow(unused_imports)]
pub use hire::{
    fetch_quotes, HireCommand, HireError, HireWorkflow, LookupOutcome, QuoteLookup,
    StaleQuotePolicy,
};
#[allow(unused_imports)]
pub use reference::{load_reference_data, ReferenceData};
#[allow(unused_imports)]
pub use validation::{new_package_from_form, tracking_code_from_form, QuoteQuery, ValidationError};
