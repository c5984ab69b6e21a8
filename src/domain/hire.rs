//! Package/carrier/quote reconciliation for hiring a carrier.
//!
//! `HireWorkflow` owns the selection state and never performs I/O itself. Selecting a
//! package or carrier hands back a [`QuoteLookup`] ticket when a lookup is due; the caller
//! runs [`fetch_quotes`] and returns the result through [`HireWorkflow::finish_lookup`].
//! Every issued ticket must be finished exactly once, which is what keeps
//! [`HireWorkflow::quote_loading`] honest on both the success and the failure path.
//! Hires follow the same split: [`send_hire`] does the request and
//! [`HireWorkflow::finish_hire`] applies its result.
//!
//! Quotes carry only a carrier display name, so the resolved quote is the first one
//! whose name equals the selected carrier's name. Two carriers sharing a name can
//! therefore bind each other's quote.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::directory::PackageDirectory;
use super::entities::{price_text, CarrierId, HireRequest, PackageId, Quote};
use super::reference::ReferenceData;
use super::validation::ValidationError;
use crate::infra::api::{ApiError, ShippingApi};

pub const HIRE_FAILED_MESSAGE: &str = "Erro ao contratar transportadora.";

/// What happens to a lookup that completes after the selection moved on.
///
/// Chosen through the `stale_quotes` config key (`discard_stale` or `last_arrival_wins`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleQuotePolicy {
    /// Completions issued under an older selection are dropped.
    #[default]
    DiscardStale,
    /// Whatever completes last writes the quote, even for an old selection.
    LastArrivalWins,
}

impl StaleQuotePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "discard_stale" => Some(Self::DiscardStale),
            "last_arrival_wins" => Some(Self::LastArrivalWins),
            _ => None,
        }
    }
}

/// Selection a lookup was issued under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub package_id: PackageId,
    pub carrier_id: CarrierId,
}

/// One in-flight quote lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteLookup {
    generation: u64,
    pub selection: SelectionSnapshot,
    pub destination_state: String,
    pub weight_kg: f64,
    pub carrier_name: String,
}

#[derive(Debug)]
pub enum LookupOutcome {
    /// A quote for the selected carrier was found and bound.
    Bound(Quote),
    /// The service answered but had nothing for this carrier.
    NoMatch,
    /// The selection changed while the lookup was in flight.
    Discarded,
    Failed(ApiError),
}

/// Hire command ready to send.
#[derive(Clone, Debug, PartialEq)]
pub struct HireCommand {
    pub package_id: PackageId,
    pub request: HireRequest,
}

#[derive(Debug, Error)]
pub enum HireError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] ApiError),
}

impl HireError {
    /// Text for the error toast.
    pub fn user_message(&self) -> String {
        match self {
            HireError::Validation(err) => err.to_string(),
            HireError::Request(err) => err.user_message(HIRE_FAILED_MESSAGE),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HireWorkflow {
    selected_package: Option<PackageId>,
    selected_carrier: Option<CarrierId>,
    resolved_quote: Option<Quote>,
    in_flight: usize,
    generation: u64,
    policy: StaleQuotePolicy,
}

impl HireWorkflow {
    pub fn new(policy: StaleQuotePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn selected_package(&self) -> Option<&str> {
        self.selected_package.as_deref()
    }

    pub fn selected_carrier(&self) -> Option<&str> {
        self.selected_carrier.as_deref()
    }

    pub fn resolved_quote(&self) -> Option<&Quote> {
        self.resolved_quote.as_ref()
    }

    pub fn quote_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// True iff package, carrier and resolved quote are all present.
    pub fn can_submit(&self) -> bool {
        self.selected_package.is_some()
            && self.selected_carrier.is_some()
            && self.resolved_quote.is_some()
    }

    /// Changes the package selection; `None` clears it.
    ///
    /// Returns a lookup ticket when both selections are present and the package can be
    /// quoted.
    pub fn select_package(
        &mut self,
        package_id: Option<PackageId>,
        directory: &PackageDirectory,
        reference: &ReferenceData,
    ) -> Option<QuoteLookup> {
        self.selected_package = package_id.filter(|id| !id.is_empty());
        self.selection_changed();
        self.issue_lookup(directory, reference)
    }

    /// Changes the carrier selection; `None` clears it.
    pub fn select_carrier(
        &mut self,
        carrier_id: Option<CarrierId>,
        directory: &PackageDirectory,
        reference: &ReferenceData,
    ) -> Option<QuoteLookup> {
        self.selected_carrier = carrier_id.filter(|id| !id.is_empty());
        self.selection_changed();
        self.issue_lookup(directory, reference)
    }

    fn selection_changed(&mut self) {
        self.resolved_quote = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Issues a lookup for the current selection, or nothing when the package lacks a
    /// weight or destination. Issuing does not touch the resolved quote.
    pub fn issue_lookup(
        &mut self,
        directory: &PackageDirectory,
        reference: &ReferenceData,
    ) -> Option<QuoteLookup> {
        let package_id = self.selected_package.as_deref()?;
        let carrier_id = self.selected_carrier.as_deref()?;

        let package = directory.get(package_id)?;
        let carrier = reference.carrier(carrier_id)?;
        let (Some(weight_kg), Some(destination)) =
            (package.quotable_weight(), package.quotable_destination())
        else {
            debug!(package = %package_id, "package lacks weight or destination; no quote lookup");
            return None;
        };

        self.in_flight += 1;
        Some(QuoteLookup {
            generation: self.generation,
            selection: SelectionSnapshot {
                package_id: package_id.to_string(),
                carrier_id: carrier_id.to_string(),
            },
            destination_state: destination.to_string(),
            weight_kg,
            carrier_name: carrier.name.clone(),
        })
    }

    /// Applies the result of a lookup and releases its loading slot.
    pub fn finish_lookup(
        &mut self,
        lookup: QuoteLookup,
        result: Result<Vec<Quote>, ApiError>,
    ) -> LookupOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.policy == StaleQuotePolicy::DiscardStale && lookup.generation != self.generation {
            debug!(
                package = %lookup.selection.package_id,
                carrier = %lookup.selection.carrier_id,
                "discarding quote for a superseded selection"
            );
            return LookupOutcome::Discarded;
        }

        let quotes = match result {
            Ok(quotes) => quotes,
            Err(err) => {
                warn!(error = %err, "quote lookup failed");
                return LookupOutcome::Failed(err);
            }
        };

        match match_quote(&quotes, &lookup.carrier_name) {
            Some(quote) => {
                self.resolved_quote = Some(quote.clone());
                LookupOutcome::Bound(quote.clone())
            }
            None => {
                debug!(carrier = %lookup.carrier_name, offered = quotes.len(), "no quote for carrier");
                LookupOutcome::NoMatch
            }
        }
    }

    /// Builds the hire command, or says which selection is missing.
    pub fn prepare_hire(&self) -> Result<HireCommand, ValidationError> {
        let package_id = self
            .selected_package
            .as_ref()
            .ok_or(ValidationError::MissingPackage)?;
        let carrier_id = self
            .selected_carrier
            .as_ref()
            .ok_or(ValidationError::MissingCarrier)?;
        let quote = self
            .resolved_quote
            .as_ref()
            .ok_or(ValidationError::MissingQuote)?;

        Ok(HireCommand {
            package_id: package_id.clone(),
            request: HireRequest {
                carrier_id: carrier_id.clone(),
                price: price_text(quote.estimated_price),
                delivery_days: quote.estimated_days,
            },
        })
    }

    /// Records a successful hire: every selection is cleared and pending lookups become
    /// stale.
    pub fn hire_succeeded(&mut self) {
        self.selected_package = None;
        self.selected_carrier = None;
        self.selection_changed();
    }

    /// Folds the answer to a sent hire command back into the workflow. Success clears
    /// the selection; on failure the selection is left as it was so the user can retry.
    pub fn finish_hire(&mut self, result: Result<(), ApiError>) -> Result<(), HireError> {
        result?;
        self.hire_succeeded();
        Ok(())
    }

    /// Drops the package selection once that package is no longer a hire candidate,
    /// e.g. after a refresh shows it hired elsewhere. Returns true when it was dropped.
    pub fn retain_hireable(&mut self, directory: &PackageDirectory) -> bool {
        let Some(package_id) = self.selected_package.as_deref() else {
            return false;
        };
        if directory
            .get(package_id)
            .is_some_and(|package| package.is_hireable())
        {
            return false;
        }
        debug!(package = %package_id, "selected package is no longer hireable");
        self.selected_package = None;
        self.selection_changed();
        true
    }
}

/// First quote, in service order, whose carrier name equals `carrier_name`.
pub fn match_quote<'a>(quotes: &'a [Quote], carrier_name: &str) -> Option<&'a Quote> {
    quotes.iter().find(|quote| quote.carrier_name == carrier_name)
}

pub async fn fetch_quotes(
    api: &dyn ShippingApi,
    lookup: &QuoteLookup,
) -> Result<Vec<Quote>, ApiError> {
    debug!(
        state = %lookup.destination_state,
        weight = lookup.weight_kg,
        carrier = %lookup.carrier_name,
        "requesting quotes"
    );
    api.get_quotes(&lookup.destination_state, lookup.weight_kg)
        .await
}

pub async fn send_hire(api: &dyn ShippingApi, command: &HireCommand) -> Result<(), ApiError> {
    match api
        .hire_carrier(&command.package_id, command.request.clone())
        .await
    {
        Ok(()) => {
            info!(
                package = %command.package_id,
                carrier = %command.request.carrier_id,
                price = %command.request.price,
                days = command.request.delivery_days,
                "carrier hired"
            );
            Ok(())
        }
        Err(err) => {
            warn!(package = %command.package_id, error = %err, "hire request failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::domain::directory::tests::{hired, package};
    use crate::domain::Carrier;
    use crate::domain::fetch_packages;
    use crate::infra::api::{MockShippingApi, ShippingClient, CONNECTION_ERROR_MESSAGE};

    fn quote(carrier: &str, price: &str, days: u32) -> Quote {
        Quote {
            carrier_name: carrier.into(),
            estimated_price: Decimal::from_str(price).unwrap(),
            estimated_days: days,
        }
    }

    fn carrier(id: &str, name: &str) -> Carrier {
        Carrier {
            id: id.into(),
            name: name.into(),
        }
    }

    fn fixtures() -> (PackageDirectory, ReferenceData) {
        let mut directory = PackageDirectory::default();
        directory.replace(vec![
            package("p1", Some(0.6), Some("SP")),
            package("p2", Some(2.0), Some("RJ")),
            package("no-weight", None, Some("SP")),
            package("no-state", Some(1.0), None),
            hired(package("done", Some(1.0), Some("MG")), "c1"),
        ]);
        let reference = ReferenceData {
            carriers: vec![carrier("c1", "FastEx"), carrier("c2", "Lenta")],
            states: Vec::new(),
        };
        (directory, reference)
    }

    /// The hire page's submit path: validate, send, fold the answer back.
    async fn submit(
        workflow: &mut HireWorkflow,
        api: &dyn ShippingApi,
    ) -> Result<HireCommand, HireError> {
        let command = workflow.prepare_hire()?;
        let result = send_hire(api, &command).await;
        workflow.finish_hire(result)?;
        Ok(command)
    }

    fn api_error(status: u16, message: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            message: message.map(Into::into),
        }
    }

    #[test]
    fn lookup_waits_for_both_selections() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();

        assert!(workflow
            .select_package(Some("p1".into()), &directory, &reference)
            .is_none());
        assert!(!workflow.quote_loading());

        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        assert!(workflow.quote_loading());
        assert_eq!(lookup.destination_state, "SP");
        assert_eq!(lookup.weight_kg, 0.6);
        assert_eq!(lookup.carrier_name, "FastEx");
        assert_eq!(
            lookup.selection,
            SelectionSnapshot {
                package_id: "p1".into(),
                carrier_id: "c1".into()
            }
        );
    }

    #[test]
    fn missing_weight_or_destination_is_a_no_op() {
        let (directory, reference) = fixtures();
        for id in ["no-weight", "no-state"] {
            let mut workflow = HireWorkflow::default();
            workflow.select_carrier(Some("c1".into()), &directory, &reference);
            assert!(workflow
                .select_package(Some(id.into()), &directory, &reference)
                .is_none());
            assert!(!workflow.quote_loading());
            assert!(workflow.resolved_quote().is_none());

            let before = workflow.clone();
            assert!(workflow.issue_lookup(&directory, &reference).is_none());
            assert_eq!(workflow, before);
        }
    }

    #[tokio::test]
    async fn missing_weight_sends_no_request() {
        let (directory, reference) = fixtures();
        let mut api = MockShippingApi::new();
        api.expect_get_quotes().never();

        let mut workflow = HireWorkflow::default();
        workflow.select_carrier(Some("c1".into()), &directory, &reference);
        let ticket = workflow.select_package(Some("no-weight".into()), &directory, &reference);
        assert!(ticket.is_none());
        if let Some(lookup) = ticket {
            let _ = fetch_quotes(&api, &lookup).await;
        }
        assert!(!workflow.quote_loading());
    }

    #[test]
    fn clearing_a_selection_clears_the_quote_without_lookup() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        assert!(workflow.can_submit());

        assert!(workflow
            .select_carrier(None, &directory, &reference)
            .is_none());
        assert!(workflow.resolved_quote().is_none());
        assert!(!workflow.can_submit());

        assert!(workflow
            .select_carrier(Some(String::new()), &directory, &reference)
            .is_none());
        assert_eq!(workflow.selected_carrier(), None);
    }

    #[test]
    fn resolves_example_quote_and_builds_command() -> TestResult {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();

        let outcome = workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        assert!(matches!(outcome, LookupOutcome::Bound(_)));
        assert!(!workflow.quote_loading());
        assert!(workflow.can_submit());

        let command = workflow.prepare_hire()?;
        assert_eq!(command.package_id, "p1");
        let body = serde_json::to_value(&command.request)?;
        assert_eq!(
            body,
            serde_json::json!({ "transportadora_id": "c1", "preco": "23.50", "prazo_dias": 3 })
        );
        Ok(())
    }

    #[test]
    fn empty_quote_list_keeps_submission_disabled() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();

        let outcome = workflow.finish_lookup(lookup, Ok(Vec::new()));
        assert!(matches!(outcome, LookupOutcome::NoMatch));
        assert!(workflow.resolved_quote().is_none());
        assert!(!workflow.can_submit());
        assert_eq!(workflow.prepare_hire(), Err(ValidationError::MissingQuote));
    }

    #[test]
    fn other_carriers_quotes_do_not_match() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c2".into()), &directory, &reference)
            .unwrap();

        let outcome = workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        assert!(matches!(outcome, LookupOutcome::NoMatch));
        assert!(!workflow.can_submit());
    }

    #[test]
    fn duplicate_carrier_names_bind_first_positional_match() {
        let quotes = vec![
            quote("Lenta", "9.90", 12),
            quote("FastEx", "23.5", 3),
            quote("FastEx", "19.0", 5),
        ];
        let matched = match_quote(&quotes, "FastEx").unwrap();
        assert_eq!(matched.estimated_price, Decimal::from_str("23.5").unwrap());

        // Two carriers sharing a display name resolve to the same quote.
        let mut directory = PackageDirectory::default();
        directory.replace(vec![package("p1", Some(0.6), Some("SP"))]);
        let reference = ReferenceData {
            carriers: vec![carrier("c1", "FastEx"), carrier("c9", "FastEx")],
            states: Vec::new(),
        };
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c9".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(quotes.clone()));
        assert_eq!(workflow.resolved_quote(), Some(&quotes[1]));
    }

    #[test]
    fn submit_requires_all_three() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        assert_eq!(workflow.prepare_hire(), Err(ValidationError::MissingPackage));
        assert!(!workflow.can_submit());

        workflow.select_package(Some("p1".into()), &directory, &reference);
        assert_eq!(workflow.prepare_hire(), Err(ValidationError::MissingCarrier));

        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        assert_eq!(workflow.prepare_hire(), Err(ValidationError::MissingQuote));
        assert!(!workflow.can_submit());

        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        assert!(workflow.can_submit());
        assert!(workflow.prepare_hire().is_ok());
    }

    #[tokio::test]
    async fn validation_error_makes_no_request() {
        let mut api = MockShippingApi::new();
        api.expect_hire_carrier().never();

        let mut workflow = HireWorkflow::default();
        let err = submit(&mut workflow, &api).await.unwrap_err();
        assert!(matches!(
            err,
            HireError::Validation(ValidationError::MissingPackage)
        ));
        assert_eq!(err.user_message(), "Selecione um pacote.");
    }

    #[test]
    fn late_stale_response_is_discarded_by_default() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);

        let slow_a = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        let fast_b = workflow
            .select_carrier(Some("c2".into()), &directory, &reference)
            .unwrap();
        assert!(workflow.quote_loading());

        let quotes = vec![quote("FastEx", "23.5", 3), quote("Lenta", "9.90", 12)];
        let outcome_b = workflow.finish_lookup(fast_b, Ok(quotes.clone()));
        assert!(matches!(outcome_b, LookupOutcome::Bound(_)));
        assert!(workflow.quote_loading());

        let outcome_a = workflow.finish_lookup(slow_a, Ok(quotes));
        assert!(matches!(outcome_a, LookupOutcome::Discarded));
        assert!(!workflow.quote_loading());
        assert_eq!(workflow.selected_carrier(), Some("c2"));
        assert_eq!(
            workflow.resolved_quote().map(|q| q.carrier_name.as_str()),
            Some("Lenta")
        );
    }

    #[test]
    fn last_arrival_policy_reproduces_cross_bound_quote() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::new(StaleQuotePolicy::LastArrivalWins);
        workflow.select_package(Some("p1".into()), &directory, &reference);

        let slow_a = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        let fast_b = workflow
            .select_carrier(Some("c2".into()), &directory, &reference)
            .unwrap();

        let quotes = vec![quote("FastEx", "23.5", 3), quote("Lenta", "9.90", 12)];
        workflow.finish_lookup(fast_b, Ok(quotes.clone()));
        workflow.finish_lookup(slow_a, Ok(quotes));

        // Carrier B is selected while carrier A's quote is bound.
        assert_eq!(workflow.selected_carrier(), Some("c2"));
        assert_eq!(
            workflow.resolved_quote().map(|q| q.carrier_name.as_str()),
            Some("FastEx")
        );
        let command = workflow.prepare_hire().unwrap();
        assert_eq!(command.request.carrier_id, "c2");
        assert_eq!(command.request.price, "23.50");
    }

    #[test]
    fn failed_lookup_releases_loading() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        assert!(workflow.quote_loading());

        let outcome = workflow.finish_lookup(lookup, Err(api_error(500, None)));
        assert!(matches!(outcome, LookupOutcome::Failed(_)));
        assert!(!workflow.quote_loading());
        assert!(workflow.resolved_quote().is_none());
    }

    #[tokio::test]
    async fn lookup_queries_destination_and_weight() {
        let (directory, reference) = fixtures();
        let mut api = MockShippingApi::new();
        api.expect_get_quotes()
            .once()
            .withf(|state, weight| state == "RJ" && *weight == 2.0)
            .returning(|_, _| Ok(vec![quote("Lenta", "31.2", 7)]));

        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p2".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c2".into()), &directory, &reference)
            .unwrap();

        let result = fetch_quotes(&api, &lookup).await;
        let outcome = workflow.finish_lookup(lookup, result);
        assert!(matches!(outcome, LookupOutcome::Bound(_)));
        assert!(!workflow.quote_loading());
        assert_eq!(
            workflow.resolved_quote().map(|q| q.estimated_days),
            Some(7)
        );
    }

    #[tokio::test]
    async fn successful_hire_clears_selection_and_refresh_shows_carrier() -> TestResult {
        let (mut directory, reference) = fixtures();
        let mut api = MockShippingApi::new();
        api.expect_hire_carrier()
            .once()
            .withf(|package_id, request| {
                package_id == "p1"
                    && *request
                        == HireRequest {
                            carrier_id: "c1".into(),
                            price: "23.50".into(),
                            delivery_days: 3,
                        }
            })
            .returning(|_, _| Ok(()));
        api.expect_list_packages().once().returning(|| {
            let mut p1 = package("p1", Some(0.6), Some("SP"));
            p1.hired = Some(crate::domain::HiredCarrier {
                carrier_id: "c1".into(),
                price: Some(Decimal::from_str("23.50").unwrap()),
                delivery_days: Some(3),
            });
            Ok(vec![p1])
        });

        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));

        let command = workflow.prepare_hire()?;
        let result = send_hire(&api, &command).await;
        workflow.finish_hire(result)?;
        assert_eq!(workflow.selected_package(), None);
        assert_eq!(workflow.selected_carrier(), None);
        assert!(workflow.resolved_quote().is_none());

        directory.apply_refresh(fetch_packages(&api).await)?;
        let refreshed = directory.get("p1").unwrap();
        assert_eq!(refreshed.hired_carrier_id(), Some("c1"));
        assert_eq!(directory.hireable().count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn failed_hire_preserves_selection() {
        let (directory, reference) = fixtures();
        let mut api = MockShippingApi::new();
        api.expect_hire_carrier()
            .once()
            .returning(|_, _| Err(api_error(400, Some("prazo_dias deve ser maior que 0"))));

        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        let before = workflow.clone();

        let err = submit(&mut workflow, &api).await.unwrap_err();
        assert_eq!(err.user_message(), "prazo_dias deve ser maior que 0");
        assert_eq!(workflow, before);
        assert!(workflow.can_submit());
    }

    #[tokio::test]
    async fn bare_failure_uses_generic_message() {
        let (directory, reference) = fixtures();
        let mut api = MockShippingApi::new();
        api.expect_hire_carrier()
            .once()
            .returning(|_, _| Err(api_error(502, None)));

        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));

        let err = submit(&mut workflow, &api).await.unwrap_err();
        assert_eq!(err.user_message(), HIRE_FAILED_MESSAGE);
        assert!(workflow.can_submit());
    }

    #[tokio::test]
    async fn undecodable_answer_uses_connectivity_message() {
        let (directory, reference) = fixtures();
        let mut api = MockShippingApi::new();
        api.expect_hire_carrier()
            .once()
            .returning(|_, _| Err(ApiError::Decode("expected value at line 1".into())));

        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));

        let err = submit(&mut workflow, &api).await.unwrap_err();
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
        assert_eq!(workflow.selected_package(), Some("p1"));
    }

    #[tokio::test]
    async fn unreachable_api_uses_connectivity_message() -> TestResult {
        let (directory, reference) = fixtures();
        let client = ShippingClient::with_base_url("http://127.0.0.1:1")?;

        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));

        let err = submit(&mut workflow, &client).await.unwrap_err();
        assert!(matches!(err, HireError::Request(ApiError::Connection(_))));
        assert_eq!(err.user_message(), CONNECTION_ERROR_MESSAGE);
        assert!(workflow.can_submit());
        Ok(())
    }

    #[test]
    fn dropped_candidate_clears_package_selection() {
        let (mut directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        let late = workflow.issue_lookup(&directory, &reference).unwrap();

        assert!(!workflow.retain_hireable(&directory));
        assert!(workflow.can_submit());

        directory.replace(vec![hired(package("p1", Some(0.6), Some("SP")), "c2")]);
        assert!(workflow.retain_hireable(&directory));
        assert_eq!(workflow.selected_package(), None);
        assert_eq!(workflow.selected_carrier(), Some("c1"));
        assert!(!workflow.can_submit());
        assert_eq!(workflow.prepare_hire(), Err(ValidationError::MissingPackage));

        let outcome = workflow.finish_lookup(late, Ok(vec![quote("FastEx", "23.5", 3)]));
        assert!(matches!(outcome, LookupOutcome::Discarded));
    }

    #[test]
    fn vanished_package_clears_selection() {
        let (mut directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p2".into()), &directory, &reference);
        directory.replace(vec![package("p1", Some(0.6), Some("SP"))]);
        assert!(workflow.retain_hireable(&directory));
        assert_eq!(workflow.selected_package(), None);
        assert!(!HireWorkflow::default().retain_hireable(&directory));
    }

    #[test]
    fn stale_policy_names_parse() {
        assert_eq!(
            StaleQuotePolicy::parse("last_arrival_wins"),
            Some(StaleQuotePolicy::LastArrivalWins)
        );
        assert_eq!(
            StaleQuotePolicy::parse(" discard_stale "),
            Some(StaleQuotePolicy::DiscardStale)
        );
        assert_eq!(StaleQuotePolicy::parse("newest"), None);
    }

    #[test]
    fn lookups_in_flight_at_hire_time_are_discarded() {
        let (directory, reference) = fixtures();
        let mut workflow = HireWorkflow::default();
        workflow.select_package(Some("p1".into()), &directory, &reference);
        let lookup = workflow
            .select_carrier(Some("c1".into()), &directory, &reference)
            .unwrap();
        workflow.finish_lookup(lookup, Ok(vec![quote("FastEx", "23.5", 3)]));
        let late = workflow.issue_lookup(&directory, &reference).unwrap();

        workflow.hire_succeeded();
        let outcome = workflow.finish_lookup(late, Ok(vec![quote("FastEx", "99", 1)]));
        assert!(matches!(outcome, LookupOutcome::Discarded));
        assert!(workflow.resolved_quote().is_none());
        assert!(!workflow.quote_loading());
    }
}
