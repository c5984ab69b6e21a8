use dioxus::prelude::*;

use crate::{
    app::Route,
    infra::api::ShippingClient,
    ui::theme,
    util::version::{version_label, APP_NAME},
};

#[component]
pub fn Shell(children: Element) -> Element {
    let current_route = use_route::<Route>();
    let nav = use_navigator();
    let client = use_context::<ShippingClient>();
    let base_url = client.base_url().to_string();

    rsx! {
        header { class: "shell-header",
            div {
                h1 { "{APP_NAME}" }
                p { class: "subtitle", "Pacotes, cotações e contratação de transportadoras" }
            }
            nav { class: "tabs",
                NavButton { active: matches!(current_route, Route::Packages {}), onclick: move |_| { nav.push(Route::Packages {}); }, label: "📦 Pacotes" }
                NavButton { active: matches!(current_route, Route::Tracking {}), onclick: move |_| { nav.push(Route::Tracking {}); }, label: "🔎 Rastreamento" }
                NavButton { active: matches!(current_route, Route::Quotes {}), onclick: move |_| { nav.push(Route::Quotes {}); }, label: "💲 Cotações" }
                NavButton { active: matches!(current_route, Route::Hire {}), onclick: move |_| { nav.push(Route::Hire {}); }, label: "🚚 Contratar" }
            }
        }
        main { class: "shell-main",
            {children}
        }
        footer { class: "shell-footer",
            span { class: "muted", "{version_label()}" }
            span { class: "spacer" }
            span { class: "mono muted", "{base_url}" }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: theme::tab(active),
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
