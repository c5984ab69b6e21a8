use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier for packages returned by the shipping API.
pub type PackageId = String;

/// Identifier for carriers returned by the shipping API.
pub type CarrierId = String;

/// Delivery status of a package.
///
/// The API accepts any status on update; ordering is a domain convention only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    #[default]
    Criado,
    EsperandoColeta,
    Coletado,
    Enviado,
    Entregue,
    Extraviado,
    #[serde(other)]
    Unknown,
}

impl PackageStatus {
    /// Statuses a user may pick when updating a package, in lifecycle order.
    pub const SELECTABLE: [PackageStatus; 6] = [
        PackageStatus::Criado,
        PackageStatus::EsperandoColeta,
        PackageStatus::Coletado,
        PackageStatus::Enviado,
        PackageStatus::Entregue,
        PackageStatus::Extraviado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Criado => "criado",
            PackageStatus::EsperandoColeta => "esperando_coleta",
            PackageStatus::Coletado => "coletado",
            PackageStatus::Enviado => "enviado",
            PackageStatus::Entregue => "entregue",
            PackageStatus::Extraviado => "extraviado",
            PackageStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PackageStatus::Criado => "Criado",
            PackageStatus::EsperandoColeta => "Esperando Coleta",
            PackageStatus::Coletado => "Coletado",
            PackageStatus::Enviado => "Enviado",
            PackageStatus::Entregue => "Entregue",
            PackageStatus::Extraviado => "Extraviado",
            PackageStatus::Unknown => "Desconhecido",
        }
    }

    /// Parses the wire value used by `<select>` options.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::SELECTABLE
            .into_iter()
            .find(|status| status.as_str() == raw)
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Carrier, price and lead time bound to a package by a hire.
///
/// Price and lead time only exist together with the carrier id.
#[derive(Clone, Debug, PartialEq)]
pub struct HiredCarrier {
    pub carrier_id: CarrierId,
    pub price: Option<Decimal>,
    pub delivery_days: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    pub id: PackageId,
    pub tracking_code: String,
    pub product: String,
    pub weight_kg: Option<f64>,
    pub destination_state: Option<String>,
    pub status: PackageStatus,
    pub hired: Option<HiredCarrier>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

impl Package {
    /// Returns true while no carrier has been hired for this package.
    pub fn is_hireable(&self) -> bool {
        self.hired.is_none()
    }

    pub fn hired_carrier_id(&self) -> Option<&str> {
        self.hired.as_ref().map(|hire| hire.carrier_id.as_str())
    }

    /// Weight usable for a quote lookup; zero or negative weights count as unknown.
    pub fn quotable_weight(&self) -> Option<f64> {
        self.weight_kg.filter(|weight| *weight > 0.0)
    }

    /// Destination usable for a quote lookup; blank codes count as unknown.
    pub fn quotable_destination(&self) -> Option<&str> {
        self.destination_state
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Carrier {
    pub id: CarrierId,
    pub name: String,
}

/// Destination state (Brazilian UF).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub code: String,
    pub name: String,
    pub region: Option<String>,
}

/// Carrier-specific estimate for one destination/weight pair.
///
/// Quotes identify their carrier by display name only.
#[derive(Clone, Debug, PartialEq)]
pub struct Quote {
    pub carrier_name: String,
    pub estimated_price: Decimal,
    pub estimated_days: u32,
}

/// Payload for `POST /packages`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewPackage {
    #[serde(rename = "produto")]
    pub product: String,
    #[serde(rename = "peso_kg")]
    pub weight_kg: f64,
    #[serde(rename = "estado_destino")]
    pub destination_state: String,
}

/// Payload for `PATCH /packages/{id}/status`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: PackageStatus,
}

/// Payload for `POST /packages/{id}/hire`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HireRequest {
    #[serde(rename = "transportadora_id")]
    pub carrier_id: CarrierId,
    #[serde(rename = "preco")]
    pub price: String,
    #[serde(rename = "prazo_dias")]
    pub delivery_days: u32,
}

/// Renders a price as decimal text with exactly two fractional digits.
pub fn price_text(price: Decimal) -> String {
    let mut scaled = price;
    scaled.rescale(2);
    scaled.to_string()
}

/// Formats a weight the way the API expects it in query strings (`0.6`, `12`).
pub fn weight_text(weight_kg: f64) -> String {
    weight_kg.to_string()
}
