use dioxus::prelude::*;
use tracing::info;

use crate::{
    app::PackagesRefresh,
    domain::{new_package_from_form, AppState, LoadState, NewPackage, Package, PackageStatus},
    infra::api::{ShippingApi, ShippingClient},
    ui::{
        components::{
            package_summary::PackageSummary,
            status_badge::StatusBadge,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn PackagesPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let client = use_context::<ShippingClient>();
    let refresh = use_context::<PackagesRefresh>();

    let details = use_signal(|| None::<Package>);

    use_effect(move || refresh.request());

    let on_status = use_callback({
        let client = client.clone();
        move |(id, status): (String, PackageStatus)| {
            spawn(update_status(client.clone(), toasts, refresh, id, status));
        }
    });

    let on_details = use_callback({
        let client = client.clone();
        move |id: String| {
            spawn(load_details(client.clone(), toasts, details, id));
        }
    });

    let mut close_details = details;
    let (packages, load_state) = state.with(|st| {
        (
            st.directory.packages().to_vec(),
            st.directory.load_state(),
        )
    });

    rsx! {
        div { class: "grid",
            CreatePackageForm {}
            section { class: "card",
                div { class: "row",
                    h2 { "Pacotes" }
                    span { class: "spacer" }
                    ReloadButton {}
                }
                if packages.is_empty() {
                    p { class: "empty", "{empty_list_text(load_state)}" }
                } else {
                    ul {
                        for package in packages {
                            PackageRow {
                                key: "{package.id}",
                                package,
                                on_status,
                                on_details,
                            }
                        }
                    }
                }
            }
            if let Some(package) = details() {
                section {
                    div { class: "row",
                        h2 { "Detalhes do pacote" }
                        span { class: "spacer" }
                        button {
                            class: theme::button(false),
                            onclick: move |_| close_details.set(None),
                            "Fechar"
                        }
                    }
                    PackageSummary { package }
                }
            }
        }
    }
}

/// Asks the app root to refetch the package list.
#[component]
pub fn ReloadButton() -> Element {
    let refresh = use_context::<PackagesRefresh>();
    rsx! {
        button {
            class: theme::button(false),
            onclick: move |_| refresh.request(),
            "Recarregar"
        }
    }
}

fn empty_list_text(load_state: LoadState) -> &'static str {
    match load_state {
        LoadState::Pending => "Carregando...",
        LoadState::Loaded => "Nenhum pacote encontrado",
        LoadState::Failed => "Não foi possível carregar os pacotes.",
    }
}

#[component]
fn PackageRow(
    package: Package,
    on_status: EventHandler<(String, PackageStatus)>,
    on_details: EventHandler<String>,
) -> Element {
    let state = use_context::<Signal<AppState>>();
    let carrier = package
        .hired_carrier_id()
        .map(|id| state.with(|st| st.carrier_name(id).to_string()));
    let weight = package
        .weight_kg
        .map(|weight| format!("{weight} kg"))
        .unwrap_or_else(|| "-".to_string());
    let destination = package.destination_state.clone().unwrap_or_default();
    let current = package.status;
    let status_id = package.id.clone();
    let details_id = package.id.clone();
    let row_class = if carrier.is_some() {
        "card success"
    } else {
        "card pending"
    };

    rsx! {
        li { class: row_class,
            div { class: "row",
                span { class: "mono", "{package.tracking_code}" }
                StatusBadge { status: current }
                span { class: "spacer" }
                select {
                    value: current.as_str(),
                    onchange: move |evt: FormEvent| {
                        match PackageStatus::parse(&evt.value()) {
                            Some(status) if status != current => on_status.call((status_id.clone(), status)),
                            _ => {}
                        }
                    },
                    if current == PackageStatus::Unknown {
                        option { value: current.as_str(), disabled: true, "{current.label()}" }
                    }
                    for status in PackageStatus::SELECTABLE {
                        option {
                            value: status.as_str(),
                            selected: status == current,
                            "{status.label()}"
                        }
                    }
                }
                button {
                    class: theme::button(false),
                    onclick: move |_| on_details.call(details_id.clone()),
                    "Detalhes"
                }
            }
            p { "{package.product}" }
            p { class: "muted", "{weight} · {destination}" }
            if let Some(name) = carrier {
                p { class: "subtitle", "Transportadora: {name}" }
            }
        }
    }
}

#[component]
fn CreatePackageForm() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let client = use_context::<ShippingClient>();
    let refresh = use_context::<PackagesRefresh>();

    let mut product = use_signal(String::new);
    let mut weight = use_signal(String::new);
    let mut destination = use_signal(String::new);
    let saving = use_signal(|| false);

    let states = state.with(|st| st.reference.states.clone());

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let new_package = match new_package_from_form(&product(), &weight(), &destination()) {
            Ok(new_package) => new_package,
            Err(err) => {
                push_toast(toasts, ToastKind::Warning, err.to_string());
                return;
            }
        };
        let form = CreateForm {
            product,
            weight,
            destination,
            saving,
        };
        spawn(create_package(client.clone(), toasts, refresh, form, new_package));
    };

    rsx! {
        form { class: "card", onsubmit: on_submit,
            h2 { "Novo pacote" }
            div { class: "grid",
                div { class: "field",
                    label { class: "label", "Produto" }
                    input {
                        value: product(),
                        oninput: move |evt| product.set(evt.value()),
                        placeholder: "Ex.: Camisa tamanho G",
                    }
                }
                div { class: "field",
                    label { class: "label", "Peso (kg)" }
                    input {
                        inputmode: "decimal",
                        value: weight(),
                        oninput: move |evt| weight.set(evt.value()),
                        placeholder: "0,6",
                    }
                }
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
            }
            button {
                class: theme::button(true),
                r#type: "submit",
                disabled: saving(),
                if saving() { "Criando..." } else { "Criar pacote" }
            }
        }
    }
}

/// Form signals cleared once the package is created.
#[derive(Clone, Copy)]
struct CreateForm {
    product: Signal<String>,
    weight: Signal<String>,
    destination: Signal<String>,
    saving: Signal<bool>,
}

async fn create_package(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    refresh: PackagesRefresh,
    mut form: CreateForm,
    new_package: NewPackage,
) {
    form.saving.set(true);
    match client.create_package(new_package).await {
        Ok(created) => {
            let message = match created {
                Some(package) => {
                    info!(id = %package.id, code = %package.tracking_code, "package created");
                    format!(
                        "Pacote criado com sucesso. Código de rastreamento: {}",
                        package.tracking_code
                    )
                }
                None => "Pacote criado com sucesso.".to_string(),
            };
            push_toast(toasts, ToastKind::Success, message);
            form.product.set(String::new());
            form.weight.set(String::new());
            form.destination.set(String::new());
            refresh.request();
        }
        Err(err) => push_toast(
            toasts,
            ToastKind::Error,
            err.user_message("Erro ao criar pacote."),
        ),
    }
    form.saving.set(false);
}

async fn update_status(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    refresh: PackagesRefresh,
    id: String,
    status: PackageStatus,
) {
    match client.update_status(&id, status).await {
        Ok(()) => {
            info!(package = %id, status = %status, "status updated");
            push_toast(toasts, ToastKind::Success, "Status atualizado com sucesso.");
            refresh.request();
        }
        Err(err) => push_toast(
            toasts,
            ToastKind::Error,
            err.user_message("Erro ao atualizar status."),
        ),
    }
}

async fn load_details(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    mut details: Signal<Option<Package>>,
    id: String,
) {
    match client.get_package(&id).await {
        Ok(Some(package)) => details.set(Some(package)),
        Ok(None) => push_toast(toasts, ToastKind::Warning, "Pacote não encontrado."),
        Err(err) => push_toast(
            toasts,
            ToastKind::Error,
            err.user_message("Erro ao carregar detalhes do pacote."),
        ),
    }
}
