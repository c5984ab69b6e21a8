use dioxus::prelude::*;

use crate::{
    domain::{tracking_code_from_form, Package},
    infra::api::{ApiError, ShippingApi, ShippingClient},
    ui::{
        components::{
            package_summary::PackageSummary,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

const NOT_FOUND_MESSAGE: &str = "Nenhum pacote foi encontrado com este código de rastreamento.";

#[derive(Clone, Debug, PartialEq)]
enum Lookup {
    Idle,
    Searching,
    Found(Package),
    NotFound(String),
}

#[component]
pub fn TrackingPage() -> Element {
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let client = use_context::<ShippingClient>();

    let mut code = use_signal(String::new);
    let result = use_signal(|| Lookup::Idle);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        match tracking_code_from_form(&code()) {
            Ok(code) => {
                spawn(search(client.clone(), toasts, result, code));
            }
            Err(err) => push_toast(toasts, ToastKind::Warning, err.to_string()),
        }
    };

    let searching = result() == Lookup::Searching;

    rsx! {
        div { class: "grid",
            form { class: "card", onsubmit: on_submit,
                h2 { "Rastrear pacote" }
                div { class: "row",
                    input {
                        class: "mono",
                        value: code(),
                        oninput: move |evt| code.set(evt.value()),
                        placeholder: "Código de rastreamento",
                    }
                    button {
                        class: theme::button(true),
                        r#type: "submit",
                        disabled: searching,
                        if searching { "Buscando..." } else { "Buscar" }
                    }
                }
            }
            match result() {
                Lookup::Found(package) => rsx! { PackageSummary { package } },
                Lookup::NotFound(code) => rsx! {
                    p { class: "empty", "Nenhum pacote encontrado com o código \"{code}\"" }
                },
                Lookup::Idle | Lookup::Searching => rsx! {},
            }
        }
    }
}

async fn search(
    client: ShippingClient,
    toasts: Signal<Vec<ToastMessage>>,
    mut result: Signal<Lookup>,
    code: String,
) {
    result.set(Lookup::Searching);
    let outcome = client.find_by_tracking_code(&code).await;
    let (lookup, toast) = classify(outcome, code);
    if let Some((kind, message)) = toast {
        push_toast(toasts, kind, message);
    }
    result.set(lookup);
}

/// Maps a lookup result to what the page shows. A 404 is a miss, not an error.
fn classify(
    outcome: Result<Option<Package>, ApiError>,
    code: String,
) -> (Lookup, Option<(ToastKind, String)>) {
    match outcome {
        Ok(Some(package)) => (Lookup::Found(package), None),
        Ok(None) => (
            Lookup::NotFound(code),
            Some((ToastKind::Warning, NOT_FOUND_MESSAGE.to_string())),
        ),
        Err(err) if err.is_not_found() => (
            Lookup::NotFound(code),
            Some((ToastKind::Warning, NOT_FOUND_MESSAGE.to_string())),
        ),
        Err(err) => (
            Lookup::Idle,
            Some((ToastKind::Error, err.user_message("Erro ao buscar pacote."))),
        ),
    }
}
