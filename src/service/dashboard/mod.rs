pub mod grafana;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Dashboard, Res};

// Traits.

/// Generic dashboard catalog trait that clients must implement.
#[async_trait]
pub trait GenericDashboardClient: Send + Sync + 'static {
    /// List dashboards matching `query`; an empty query lists all of them.
    ///
    /// Returned URLs are paths relative to the dashboard host.
    async fn list_dashboards(&self, query: &str) -> Res<Vec<Dashboard>>;
}

// Structs.

/// Dashboard client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DashboardClient {
    inner: Arc<dyn GenericDashboardClient>,
}

impl Deref for DashboardClient {
    type Target = dyn GenericDashboardClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DashboardClient {
    pub fn new(inner: Arc<dyn GenericDashboardClient>) -> Self {
        Self { inner }
    }
}
