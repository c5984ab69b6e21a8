use dioxus::prelude::*;
use tracing::info;

use crate::{
    domain::{fetch_packages, load_reference_data, AppState},
    infra::api::ShippingClient,
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{HirePage, PackagesPage, QuotesPage, TrackingPage},
        shell::Shell,
    },
    util::assets,
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Packages {},
    #[route("/tracking")]
    Tracking {},
    #[route("/quotes")]
    Quotes {},
    #[route("/hire")]
    Hire {},
}

/// Bumped after every mutation; the package list refetches when it changes.
#[derive(Clone, Copy, PartialEq)]
pub struct PackagesRefresh(pub Signal<u64>);

impl PackagesRefresh {
    pub fn request(mut self) {
        *self.0.write() += 1;
    }
}

#[component]
pub fn App() -> Element {
    let client = use_context::<ShippingClient>();

    let state = use_signal(AppState::default);
    use_context_provider(|| state);

    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    let refresh = use_signal(|| 0_u64);
    use_context_provider(|| PackagesRefresh(refresh));

    let _reference = use_resource({
        let client = client.clone();
        move || {
            let client = client.clone();
            async move { load_reference(state, client).await }
        }
    });

    let _packages = use_resource({
        let client = client.clone();
        move || {
            let revision = refresh();
            let client = client.clone();
            async move { refresh_packages(state, toasts, client, revision).await }
        }
    });

    let ready = state.with(|st| st.is_ready());

    rsx! {
        document::Style { "{assets::main_css()}" }
        if ready {
            Router::<Route> {}
        } else {
            div { class: "empty", "Carregando..." }
        }
        Toast {}
    }
}

async fn load_reference(mut state: Signal<AppState>, client: ShippingClient) {
    let reference = load_reference_data(&client).await;
    state.with_mut(|st| {
        st.reference = reference;
        st.reference_loaded = true;
    });
}

async fn refresh_packages(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    client: ShippingClient,
    revision: u64,
) -> Option<usize> {
    info!(revision, "refreshing package directory");
    let result = fetch_packages(&client).await;
    match state.with_mut(|st| st.directory.apply_refresh(result)) {
        Ok(count) => Some(count),
        Err(err) => {
            push_toast(
                toasts,
                ToastKind::Error,
                err.user_message("Erro ao carregar pacotes."),
            );
            None
        }
    }
}

#[component]
pub fn Packages() -> Element {
    rsx! { Shell { PackagesPage {} } }
}

#[component]
pub fn Tracking() -> Element {
    rsx! { Shell { TrackingPage {} } }
}

#[component]
pub fn Quotes() -> Element {
    rsx! { Shell { QuotesPage {} } }
}

#[component]
pub fn Hire() -> Element {
    rsx! { Shell { HirePage {} } }
}
