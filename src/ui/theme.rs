//! Class names shared by pages, matching `assets/main.css`.

use crate::domain::PackageStatus;

pub fn status_badge(status: PackageStatus) -> String {
    format!("badge badge-{}", status.as_str())
}

pub fn tab(active: bool) -> &'static str {
    if active {
        "tab active"
    } else {
        "tab"
    }
}

pub fn button(primary: bool) -> &'static str {
    if primary {
        "btn"
    } else {
        "btn secondary"
    }
}
