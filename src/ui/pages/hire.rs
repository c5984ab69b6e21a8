use dioxus::prelude::*;

use crate::{
    app::PackagesRefresh,
    domain::{
        fetch_quotes, hire::send_hire, price_text, AppState, HireCommand, HireWorkflow,
        LoadState, LookupOutcome, QuoteLookup,
    },
    infra::api::ShippingClient,
    ui::{
        components::toast::{push_toast, ToastKind, ToastMessage},
        pages::packages::ReloadButton,
        theme,
    },
    util::config::AppConfig,
};

#[component]
pub fn HirePage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let client = use_context::<ShippingClient>();
    let refresh = use_context::<PackagesRefresh>();

    let config = use_context::<AppConfig>();

    let mut workflow = use_signal(|| HireWorkflow::new(config.stale_quotes));
    let submitting = use_signal(|| false);

    use_effect(move || refresh.request());

    // A refresh can take the selected package out of the candidate list.
    use_effect(move || {
        state.with(|st| {
            workflow.with_mut(|flow| flow.retain_hireable(&st.directory));
        });
    });

    let (hireable, carriers, load_state) = state.with(|st| {
        (
            st.directory.hireable().cloned().collect::<Vec<_>>(),
            st.reference.carriers.clone(),
            st.directory.load_state(),
        )
    });

    if hireable.is_empty() {
        return match load_state {
            LoadState::Pending => rsx! {
                div { class: "card empty", "Carregando..." }
            },
            LoadState::Failed => rsx! {
                div { class: "card empty",
                    h3 { "Não foi possível carregar os pacotes." }
                    ReloadButton {}
                }
            },
            LoadState::Loaded => rsx! {
                div { class: "card empty",
                    h3 { "Nenhum pacote disponível" }
                    p { class: "muted",
                        "Todos os pacotes já possuem transportadora contratada ou não há pacotes cadastrados."
                    }
                    ReloadButton {}
                }
            },
        };
    }

    let on_package = {
        let client = client.clone();
        move |evt: FormEvent| {
            let value = evt.value();
            let lookup = state.with(|st| {
                workflow.with_mut(|flow| flow.select_package(Some(value), &st.directory, &st.reference))
            });
            if let Some(lookup) = lookup {
                spawn(resolve_quote(client.clone(), toasts, workflow, lookup));
            }
        }
    };

    let on_carrier = {
        let client = client.clone();
        move |evt: FormEvent| {
            let value = evt.value();
            let lookup = state.with(|st| {
                workflow.with_mut(|flow| flow.select_carrier(Some(value), &st.directory, &st.reference))
            });
            if let Some(lookup) = lookup {
                spawn(resolve_quote(client.clone(), toasts, workflow, lookup));
            }
        }
    };

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if submitting() {
            return;
        }
        match workflow.with(|flow| flow.prepare_hire()) {
            Ok(command) => {
                spawn(submit_hire(client.clone(), toasts, refresh, workflow, submitting, command));
            }
            Err(err) => push_toast(toasts, ToastKind::Warning, err.to_string()),
        }
    };

    let flow = workflow();
    let selected_package = flow.selected_package().unwrap_or_default().to_string();
    let selected_carrier = flow.selected_carrier().unwrap_or_default().to_string();
    let loading = flow.quote_loading();
    let quote = flow.resolved_quote().cloned();
    let both_selected = flow.selected_package().is_some() && flow.selected_carrier().is_some();
    let submit_enabled = flow.can_submit() && !loading && !submitting();

    rsx! {
        form { class: "card", onsubmit: on_submit,
            h2 { "Contratar transportadora" }
            div { class: "grid",
                div { class: "field",
                    label { class: "label", "Selecionar Pacote" }
                    select {
                        value: "{selected_package}",
                        onchange: on_package,
                        option { value: "", "Escolha um pacote" }
                        for package in hireable {
                            option {
                                key: "{package.id}",
                                value: "{package.id}",
                                selected: package.id == selected_package,
                                {package_label(&package.tracking_code, &package.product, package.weight_kg)}
                            }
                        }
                    }
                }
                div { class: "field",
                    label { class: "label", "Selecionar Transportadora" }
                    select {
                        value: "{selected_carrier}",
                        onchange: on_carrier,
                        option { value: "", "Escolha uma transportadora" }
                        for carrier in carriers {
                            option {
                                key: "{carrier.id}",
                                value: "{carrier.id}",
                                selected: carrier.id == selected_carrier,
                                "{carrier.name}"
                            }
                        }
                    }
                }
            }
            match (loading, quote) {
                (true, _) => rsx! { p { class: "muted", "Buscando cotação..." } },
                (false, Some(quote)) => rsx! {
                    div { class: "card success",
                        p { class: "subtitle", "Cotação" }
                        div { class: "grid",
                            div { class: "field",
                                span { class: "label", "Preço" }
                                span { class: "value", "R$ {price_text(quote.estimated_price)}" }
                            }
                            div { class: "field",
                                span { class: "label", "Prazo" }
                                span { class: "value", "{quote.estimated_days} dias" }
                            }
                        }
                    }
                },
                (false, None) if both_selected => rsx! {
                    p { class: "muted", "Nenhuma cotação disponível para esta transportadora." }
                },
                (false, None) => rsx! {},
            }
            button {
                class: theme::button(true),
                r#type: "submit",
                disabled: !submit_enabled,
                if submitting() { "Contratando..." } else { "Contratar" }
            }
        }
    }
}

fn package_label(tracking_code: &str, product: &str, weight_kg: Option<f64>) -> String {
    match weight_kg {
        Some(weight) => format!("{tracking_code} - {product} ({weight}kg)"),
        None => format!("{tracking_code} - {product}"),
    }
}

async fn resolve_quote(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    mut workflow: Signal<HireWorkflow>,
    lookup: QuoteLookup,
) {
    let result = fetch_quotes(&client, &lookup).await;
    let outcome = workflow.with_mut(|flow| flow.finish_lookup(lookup, result));
    if let LookupOutcome::Failed(err) = outcome {
        push_toast(
            toasts,
            ToastKind::Error,
            err.user_message("Erro ao consultar cotações."),
        );
    }
}

async fn submit_hire(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    refresh: PackagesRefresh,
    mut workflow: Signal<HireWorkflow>,
    mut submitting: Signal<bool>,
    command: HireCommand,
) {
    submitting.set(true);
    let result = send_hire(&client, &command).await;
    match workflow.with_mut(|flow| flow.finish_hire(result)) {
        Ok(()) => {
            push_toast(
                toasts,
                ToastKind::Success,
                "Transportadora contratada com sucesso.",
            );
            refresh.request();
        }
        Err(err) => push_toast(toasts, ToastKind::Error, err.user_message()),
    }
    submitting.set(false);
}
