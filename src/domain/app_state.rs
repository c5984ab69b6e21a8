use super::directory::PackageDirectory;
use super::reference::ReferenceData;

/// Session-scoped copies of server data shared by every tab.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub reference: ReferenceData,
    pub directory: PackageDirectory,
    /// True once carriers and states have settled, successfully or not.
    pub reference_loaded: bool,
}

impl AppState {
    pub fn is_ready(&self) -> bool {
        self.reference_loaded
    }

    pub fn carrier_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.reference.carrier_name(id)
    }
}
