//! Thin asynchronous client for the shipping API v1.
//!
//! - `ShippingApi` is the seam the workflows talk to; `ShippingClient` implements it over reqwest.
//! - Every response arrives in a `{ code, message, data }` envelope. A missing or `null`
//!   `data` decodes to an empty result.

use std::str::FromStr;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, Method, RequestBuilder, Url};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, warn};

use crate::domain::{
    Carrier, HireRequest, HiredCarrier, NewPackage, Package, PackageStatus, Quote, State,
    StatusUpdate,
};
use crate::util::version::user_agent;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Shown whenever the API could not be reached or answered garbage.
pub const CONNECTION_ERROR_MESSAGE: &str = "Erro de conexão com a API.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("base URL cannot carry API paths: {0}")]
    InvalidBase(String),
    #[error("could not reach the API: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("api error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
}

impl ApiError {
    /// Text for a toast: the server message when present, `fallback` for bare non-2xx
    /// answers, and the connectivity message for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status { message: None, .. } => fallback.to_string(),
            ApiError::InvalidUrl(_)
            | ApiError::InvalidBase(_)
            | ApiError::Connection(_)
            | ApiError::Decode(_) => CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

/// Operations offered by the shipping backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ShippingApi: Send + Sync {
    async fn list_carriers(&self) -> Result<Vec<Carrier>, ApiError>;

    async fn list_states(&self) -> Result<Vec<State>, ApiError>;

    async fn list_packages(&self) -> Result<Vec<Package>, ApiError>;

    async fn get_package(&self, id: &str) -> Result<Option<Package>, ApiError>;

    async fn find_by_tracking_code(&self, code: &str) -> Result<Option<Package>, ApiError>;

    async fn create_package(&self, package: NewPackage) -> Result<Option<Package>, ApiError>;

    async fn update_status(&self, id: &str, status: PackageStatus) -> Result<(), ApiError>;

    async fn hire_carrier(&self, package_id: &str, request: HireRequest) -> Result<(), ApiError>;

    async fn get_quotes(&self, destination_state: &str, weight_kg: f64)
        -> Result<Vec<Quote>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ShippingClient {
    http: Client,
    base_url: Url,
}

impl ShippingClient {
    pub fn with_base_url(base: &str) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base)?;
        let http = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(ApiError::Connection)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        build_endpoint(&self.base_url, segments)
    }

    async fn fetch_data<T>(&self, builder: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let response = builder.send().await.map_err(ApiError::Connection)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Connection)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        decode_envelope(&body)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "shipping api request");
        self.http.request(method, url)
    }

    fn json_request<B>(&self, method: Method, url: Url, body: &B) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        self.request(method, url).json(body)
    }
}

#[async_trait]
impl ShippingApi for ShippingClient {
    async fn list_carriers(&self) -> Result<Vec<Carrier>, ApiError> {
        let url = self.endpoint(&["carriers"])?;
        let dtos: Vec<CarrierDto> = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(dtos.into_iter().filter_map(CarrierDto::into_carrier).collect())
    }

    async fn list_states(&self) -> Result<Vec<State>, ApiError> {
        let url = self.endpoint(&["states"])?;
        let dtos: Vec<StateDto> = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(dtos.into_iter().filter_map(StateDto::into_state).collect())
    }

    async fn list_packages(&self) -> Result<Vec<Package>, ApiError> {
        let url = self.endpoint(&["packages"])?;
        let dtos: Vec<PackageDto> = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(dtos.into_iter().filter_map(PackageDto::into_package).collect())
    }

    async fn get_package(&self, id: &str) -> Result<Option<Package>, ApiError> {
        let url = self.endpoint(&["packages", id])?;
        let dto: Option<PackageDto> = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(dto.and_then(PackageDto::into_package))
    }

    async fn find_by_tracking_code(&self, code: &str) -> Result<Option<Package>, ApiError> {
        let url = self.endpoint(&["packages", "tracking", code])?;
        let dto: Option<PackageDto> = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(dto.and_then(PackageDto::into_package))
    }

    async fn create_package(&self, package: NewPackage) -> Result<Option<Package>, ApiError> {
        let url = self.endpoint(&["packages"])?;
        let dto: Option<PackageDto> = self
            .fetch_data(self.json_request(Method::POST, url, &package))
            .await?;
        Ok(dto.and_then(PackageDto::into_package))
    }

    async fn update_status(&self, id: &str, status: PackageStatus) -> Result<(), ApiError> {
        let url = self.endpoint(&["packages", id, "status"])?;
        let _: serde_json::Value = self
            .fetch_data(self.json_request(Method::PATCH, url, &StatusUpdate { status }))
            .await?;
        Ok(())
    }

    async fn hire_carrier(&self, package_id: &str, request: HireRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["packages", package_id, "hire"])?;
        let _: serde_json::Value = self
            .fetch_data(self.json_request(Method::POST, url, &request))
            .await?;
        Ok(())
    }

    async fn get_quotes(
        &self,
        destination_state: &str,
        weight_kg: f64,
    ) -> Result<Vec<Quote>, ApiError> {
        let url = quotes_url(&self.base_url, destination_state, weight_kg)?;
        let dtos: Vec<QuoteDto> = self.fetch_data(self.request(Method::GET, url)).await?;
        Ok(dtos.into_iter().filter_map(QuoteDto::into_quote).collect())
    }
}

fn parse_base_url(base: &str) -> Result<Url, ApiError> {
    let trimmed = base.trim();
    let mut url = if trimmed.ends_with('/') {
        Url::parse(trimmed)?
    } else {
        Url::parse(&format!("{trimmed}/"))?
    };
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBase(trimmed.to_string()));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Appends `api/v1/<segments>` to the base, percent-encoding each segment.
fn build_endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidBase(base.to_string()))?
        .pop_if_empty()
        .extend(["api", "v1"])
        .extend(segments);
    Ok(url)
}

fn quotes_url(base: &Url, destination_state: &str, weight_kg: f64) -> Result<Url, ApiError> {
    let mut url = build_endpoint(base, &["quotes"])?;
    url.query_pairs_mut()
        .append_pair("estado_destino", destination_state)
        .append_pair("peso_kg", &crate::domain::weight_text(weight_kg));
    Ok(url)
}

fn decode_envelope<T>(body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))?;
    Ok(envelope.data.unwrap_or_default())
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|error| error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

#[derive(Debug, Deserialize)]
struct CarrierDto {
    #[serde(default, deserialize_with = "optional_string_from_json")]
    id: Option<String>,
    #[serde(default)]
    nome: Option<String>,
}

impl CarrierDto {
    fn into_carrier(self) -> Option<Carrier> {
        let id = self.id?;
        Some(Carrier {
            name: self.nome.unwrap_or_else(|| id.clone()),
            id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StateDto {
    #[serde(default)]
    codigo: Option<String>,
    #[serde(default)]
    nome: Option<String>,
    #[serde(default)]
    nome_regiao: Option<String>,
}

impl StateDto {
    fn into_state(self) -> Option<State> {
        let code = self.codigo?;
        Some(State {
            name: self.nome.unwrap_or_else(|| code.clone()),
            code,
            region: self.nome_regiao,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PackageDto {
    #[serde(default, deserialize_with = "optional_string_from_json")]
    id: Option<String>,
    #[serde(default)]
    codigo_rastreio: Option<String>,
    #[serde(default)]
    produto: Option<String>,
    #[serde(default)]
    peso_kg: Option<f64>,
    #[serde(default)]
    estado_destino: Option<String>,
    #[serde(default)]
    status: Option<PackageStatus>,
    #[serde(default, deserialize_with = "optional_string_from_json")]
    transportadora_id: Option<String>,
    #[serde(default, deserialize_with = "optional_string_from_json")]
    preco_contratado: Option<String>,
    #[serde(default)]
    prazo_contratado_dias: Option<u32>,
    #[serde(default)]
    criado_em: Option<String>,
    #[serde(default)]
    atualizado_em: Option<String>,
}

impl PackageDto {
    fn into_package(self) -> Option<Package> {
        let Some(id) = self.id else {
            warn!("dropping package record without id");
            return None;
        };

        let price = self
            .preco_contratado
            .as_deref()
            .and_then(|raw| Decimal::from_str(raw.trim()).ok());

        let hired = match self.transportadora_id.filter(|carrier| !carrier.is_empty()) {
            Some(carrier_id) => Some(HiredCarrier {
                carrier_id,
                price,
                delivery_days: self.prazo_contratado_dias,
            }),
            None => {
                if price.is_some() || self.prazo_contratado_dias.is_some() {
                    warn!(package = %id, "contract terms without a hired carrier; ignoring them");
                }
                None
            }
        };

        Some(Package {
            tracking_code: self.codigo_rastreio.unwrap_or_default(),
            product: self.produto.unwrap_or_default(),
            weight_kg: self.peso_kg,
            destination_state: self.estado_destino,
            status: self.status.unwrap_or_default(),
            hired,
            created_at: parse_timestamp(self.criado_em.as_deref()),
            updated_at: parse_timestamp(self.atualizado_em.as_deref()),
            id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QuoteDto {
    #[serde(default)]
    transportadora: Option<String>,
    #[serde(default)]
    preco_estimado: Option<f64>,
    #[serde(default)]
    prazo_estimado_dias: Option<u32>,
}

impl QuoteDto {
    fn into_quote(self) -> Option<Quote> {
        let carrier_name = self.transportadora?;
        let estimated_price = self.preco_estimado.and_then(Decimal::from_f64);
        match (estimated_price, self.prazo_estimado_dias) {
            (Some(estimated_price), Some(estimated_days)) => Some(Quote {
                carrier_name,
                estimated_price,
                estimated_days,
            }),
            _ => {
                debug!(carrier = %carrier_name, "skipping incomplete quote");
                None
            }
        }
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<OffsetDateTime> {
    raw.and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
}

fn optional_string_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string, a number or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
