//! Local checks that run before any request leaves the client.

use thiserror::Error;

use super::entities::NewPackage;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Selecione um pacote.")]
    MissingPackage,
    #[error("Selecione uma transportadora.")]
    MissingCarrier,
    #[error("Nenhuma cotação disponível para o pacote e a transportadora selecionados.")]
    MissingQuote,
    #[error("Informe o produto.")]
    MissingProduct,
    #[error("Informe um peso maior que zero.")]
    InvalidWeight,
    #[error("Selecione o estado de destino.")]
    MissingDestination,
    #[error("Por favor, informe o código de rastreamento.")]
    MissingTrackingCode,
}

/// Parses a weight typed by the user. Accepts `,` as decimal separator.
pub fn parse_weight(raw: &str) -> Result<f64, ValidationError> {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 => Ok(weight),
        _ => Err(ValidationError::InvalidWeight),
    }
}

fn required_state(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim();
    if code.is_empty() {
        Err(ValidationError::MissingDestination)
    } else {
        Ok(code.to_uppercase())
    }
}

/// Builds the create-package payload from raw form fields.
pub fn new_package_from_form(
    product: &str,
    weight: &str,
    destination_state: &str,
) -> Result<NewPackage, ValidationError> {
    let product = product.trim();
    if product.is_empty() {
        return Err(ValidationError::MissingProduct);
    }
    Ok(NewPackage {
        product: product.to_string(),
        weight_kg: parse_weight(weight)?,
        destination_state: required_state(destination_state)?,
    })
}

/// Destination/weight pair for a free-form quote search.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteQuery {
    pub destination_state: String,
    pub weight_kg: f64,
}

impl QuoteQuery {
    pub fn from_form(destination_state: &str, weight: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            destination_state: required_state(destination_state)?,
            weight_kg: parse_weight(weight)?,
        })
    }
}

pub fn tracking_code_from_form(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim();
    if code.is_empty() {
        Err(ValidationError::MissingTrackingCode)
    } else {
        Ok(code.to_string())
    }
}
