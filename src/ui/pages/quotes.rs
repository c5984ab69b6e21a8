use dioxus::prelude::*;
use tracing::info;

use crate::{
    domain::{price_text, AppState, Quote, QuoteQuery},
    infra::api::{ShippingApi, ShippingClient},
    ui::{
        components::toast::{push_toast, ToastKind, ToastMessage},
        theme,
    },
};

const NO_QUOTES_MESSAGE: &str = "Nenhuma cotação encontrada para os parâmetros informados.";

#[component]
pub fn QuotesPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let client = use_context::<ShippingClient>();

    let mut destination = use_signal(String::new);
    let mut weight = use_signal(String::new);
    let quotes = use_signal(Vec::<Quote>::new);
    let loading = use_signal(|| false);

    let states = state.with(|st| st.reference.states.clone());

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        match QuoteQuery::from_form(&destination(), &weight()) {
            Ok(query) => {
                spawn(search_quotes(client.clone(), toasts, quotes, loading, query));
            }
            Err(err) => push_toast(toasts, ToastKind::Warning, err.to_string()),
        }
    };

    let rows = quotes();

    rsx! {
        div { class: "grid",
            form { class: "card", onsubmit: on_submit,
                h2 { "Cotação de frete" }
                div { class: "grid",
                    div { class: "field",
                        label { class: "label", "Estado de destino" }
                        select {
                            value: destination(),
                            onchange: move |evt| destination.set(evt.value()),
                            option { value: "", "Selecione o estado" }
                            for uf in states {
                                option { key: "{uf.code}", value: "{uf.code}", "{uf.name} ({uf.code})" }
                            }
                        }
                    }
                    div { class: "field",
                        label { class: "label", "Peso (kg)" }
                        input {
                            inputmode: "decimal",
                            value: weight(),
                            oninput: move |evt| weight.set(evt.value()),
                            placeholder: "1,5",
                        }
                    }
                }
                button {
                    class: theme::button(true),
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Consultando..." } else { "Consultar cotações" }
                }
            }
            if !rows.is_empty() {
                section { class: "card",
                    h2 { "Cotações disponíveis" }
                    ul {
                        for (index, quote) in rows.into_iter().enumerate() {
                            li { key: "{index}", class: "row",
                                span { class: "value", "{quote.carrier_name}" }
                                span { class: "spacer" }
                                span { class: "mono", "R$ {price_text(quote.estimated_price)}" }
                                span { class: "muted", "{quote.estimated_days} dias" }
                            }
                        }
                    }
                }
            }
        }
    }
}

async fn search_quotes(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    mut quotes: Signal<Vec<Quote>>,
    mut loading: Signal<bool>,
    query: QuoteQuery,
) {
    loading.set(true);
    match client
        .get_quotes(&query.destination_state, query.weight_kg)
        .await
    {
        Ok(found) => {
            info!(
                state = %query.destination_state,
                weight = query.weight_kg,
                count = found.len(),
                "quotes loaded"
            );
            if found.is_empty() {
                push_toast(toasts, ToastKind::Info, NO_QUOTES_MESSAGE);
            }
            quotes.set(found);
        }
        Err(err) => {
            quotes.set(Vec::new());
            push_toast(
                toasts,
                ToastKind::Error,
                err.user_message("Erro ao consultar cotações."),
            );
        }
    }
    loading.set(false);
}
