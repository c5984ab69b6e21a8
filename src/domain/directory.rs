//! In-memory copy of the package list, refreshed wholesale from the API.

use tracing::{info, warn};

use super::entities::Package;
use crate::infra::api::{ApiError, ShippingApi};

/// Outcome of the most recent refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing has come back yet.
    #[default]
    Pending,
    Loaded,
    /// The last refresh failed; whatever list was there is kept.
    Failed,
}

/// Packages in the order the server returned them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackageDirectory {
    packages: Vec<Package>,
    state: LoadState,
}

impl PackageDirectory {
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn get(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|package| package.id == id)
    }

    /// Packages without a hired carrier; hired ones are left out entirely.
    pub fn hireable(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|package| package.is_hireable())
    }

    pub fn replace(&mut self, packages: Vec<Package>) {
        self.packages = packages;
        self.state = LoadState::Loaded;
    }

    /// Applies the result of [`fetch_packages`]. On error the current list is kept, the
    /// directory is marked failed and the error is handed back for reporting.
    pub fn apply_refresh(
        &mut self,
        result: Result<Vec<Package>, ApiError>,
    ) -> Result<usize, ApiError> {
        match result {
            Ok(packages) => {
                let count = packages.len();
                self.replace(packages);
                Ok(count)
            }
            Err(err) => {
                self.state = LoadState::Failed;
                Err(err)
            }
        }
    }
}

/// Fetches the full package list. The caller keeps its previous copy on error.
pub async fn fetch_packages(api: &dyn ShippingApi) -> Result<Vec<Package>, ApiError> {
    match api.list_packages().await {
        Ok(packages) => {
            info!(count = packages.len(), "loaded packages");
            Ok(packages)
        }
        Err(err) => {
            warn!(error = %err, "failed to load packages");
            Err(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::domain::{HiredCarrier, PackageStatus};
    use crate::infra::api::MockShippingApi;

    pub(crate) fn package(id: &str, weight: Option<f64>, state: Option<&str>) -> Package {
        Package {
            id: id.into(),
            tracking_code: format!("BR{id}"),
            product: format!("Produto {id}"),
            weight_kg: weight,
            destination_state: state.map(Into::into),
            status: PackageStatus::Criado,
            hired: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn hired(mut package: Package, carrier_id: &str) -> Package {
        package.hired = Some(HiredCarrier {
            carrier_id: carrier_id.into(),
            price: None,
            delivery_days: None,
        });
        package
    }

    #[test]
    fn hireable_iff_no_carrier() {
        let mut directory = PackageDirectory::default();
        directory.replace(vec![
            package("a", Some(1.0), Some("SP")),
            hired(package("b", Some(1.0), Some("SP")), "c1"),
            package("c", None, None),
        ]);

        let hireable: Vec<_> = directory.hireable().map(|p| p.id.as_str()).collect();
        assert_eq!(hireable, vec!["a", "c"]);
        for package in directory.packages() {
            assert_eq!(
                hireable.contains(&package.id.as_str()),
                package.hired_carrier_id().is_none()
            );
        }
    }

    #[test]
    fn keeps_server_order() {
        let mut directory = PackageDirectory::default();
        directory.replace(vec![
            package("z", None, None),
            package("a", None, None),
            package("m", None, None),
        ]);
        let ids: Vec<_> = directory.packages().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[tokio::test]
    async fn refresh_replaces_list() -> TestResult {
        let mut api = MockShippingApi::new();
        api.expect_list_packages()
            .once()
            .returning(|| Ok(vec![package("a", Some(1.0), Some("SP"))]));

        let mut directory = PackageDirectory::default();
        directory.replace(vec![package("old", None, None)]);
        let count = directory.apply_refresh(fetch_packages(&api).await)?;

        assert_eq!(count, 1);
        assert_eq!(directory.load_state(), LoadState::Loaded);
        assert!(directory.get("old").is_none());
        assert!(directory.get("a").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let mut api = MockShippingApi::new();
        api.expect_list_packages().once().returning(|| {
            Err(ApiError::Status {
                status: 500,
                message: None,
            })
        });

        let mut directory = PackageDirectory::default();
        directory.replace(vec![package("old", None, None)]);
        assert!(directory.apply_refresh(fetch_packages(&api).await).is_err());
        assert!(directory.get("old").is_some());
        assert_eq!(directory.load_state(), LoadState::Failed);
    }

    #[tokio::test]
    async fn first_load_failure_can_be_retried() {
        let mut api = MockShippingApi::new();
        let mut calls = 0;
        api.expect_list_packages().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(ApiError::Status {
                    status: 503,
                    message: None,
                })
            } else {
                Ok(vec![package("a", Some(1.0), Some("SP"))])
            }
        });

        let mut directory = PackageDirectory::default();
        assert_eq!(directory.load_state(), LoadState::Pending);

        assert!(directory.apply_refresh(fetch_packages(&api).await).is_err());
        assert_eq!(directory.load_state(), LoadState::Failed);
        assert!(directory.packages().is_empty());

        assert_eq!(directory.apply_refresh(fetch_packages(&api).await).ok(), Some(1));
        assert_eq!(directory.load_state(), LoadState::Loaded);
        assert_eq!(directory.hireable().count(), 1);
    }
}
