use dioxus::prelude::*;

use crate::{domain::PackageStatus, ui::theme};

#[component]
pub fn StatusBadge(status: PackageStatus) -> Element {
    let class = theme::status_badge(status);
    rsx! {
        span { class: "{class}", "{status.label()}" }
    }
}
