pub mod hire;
pub mod packages;
pub mod quotes;
pub mod tracking;

pub use hire::HirePage;
pub use packages::PackagesPage;
pub use quotes::QuotesPage;
pub use tracking::TrackingPage;
