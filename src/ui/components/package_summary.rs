use dioxus::prelude::*;
use time::{macros::format_description, OffsetDateTime};

use crate::{
    domain::{price_text, AppState, Package},
    ui::components::status_badge::StatusBadge,
};

#[component]
pub fn PackageSummary(package: Package) -> Element {
    let state = use_context::<Signal<AppState>>();

    let weight = package
        .weight_kg
        .map(|weight| format!("{weight} kg"))
        .unwrap_or_else(|| "-".to_string());
    let destination = package
        .destination_state
        .clone()
        .unwrap_or_else(|| "-".to_string());
    let carrier = package.hired.as_ref().map(|hire| {
        let name = state.with(|st| st.carrier_name(&hire.carrier_id).to_string());
        let price = hire
            .price
            .map(|price| format!("R$ {}", price_text(price)))
            .unwrap_or_else(|| "-".to_string());
        let days = hire
            .delivery_days
            .map(|days| format!("{days} dias"))
            .unwrap_or_else(|| "-".to_string());
        (name, price, days)
    });
    let created = package.created_at.map(timestamp_label);
    let updated = package.updated_at.map(timestamp_label);

    rsx! {
        div { class: "card",
            div { class: "row",
                h3 { "{package.product}" }
                span { class: "spacer" }
                StatusBadge { status: package.status }
            }
            div { class: "grid",
                Field { label: "Código de rastreamento", value: package.tracking_code.clone(), mono: true }
                Field { label: "Peso", value: weight }
                Field { label: "Estado de destino", value: destination }
                if let Some(created) = created {
                    Field { label: "Criado em", value: created }
                }
                if let Some(updated) = updated {
                    Field { label: "Atualizado em", value: updated }
                }
            }
            if let Some((name, price, days)) = carrier {
                div { class: "card success",
                    p { class: "subtitle", "Transportadora contratada" }
                    div { class: "grid",
                        Field { label: "Transportadora", value: name }
                        Field { label: "Preço", value: price }
                        Field { label: "Prazo", value: days }
                    }
                }
            } else {
                p { class: "muted", "Nenhuma transportadora contratada." }
            }
        }
    }
}

#[component]
fn Field(label: &'static str, value: String, #[props(default)] mono: bool) -> Element {
    let value_class = if mono { "value mono" } else { "value" };
    rsx! {
        div { class: "field",
            span { class: "label", "{label}" }
            span { class: "{value_class}", "{value}" }
        }
    }
}

fn timestamp_label(at: OffsetDateTime) -> String {
    at.format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_else(|_| at.to_string())
}
