pub mod package_summary;
pub mod status_badge;
pub mod toast;
