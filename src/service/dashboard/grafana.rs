//! Grafana search API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{Dashboard, Res},
};

use super::{DashboardClient, GenericDashboardClient};

// Extra methods on `DashboardClient` applied by the grafana implementation.

impl DashboardClient {
    pub fn grafana(config: &Config) -> Res<Self> {
        let client = GrafanaDashboardClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Lists dashboards through `GET /api/search`.
#[derive(Debug, Clone)]
pub struct GrafanaDashboardClient {
    http_client: Client,
    host: String,
    token: String,
}

impl GrafanaDashboardClient {
    #[instrument(name = "GrafanaDashboardClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http_client = Client::builder().timeout(config.grafana_timeout()).build()?;

        Ok(Self {
            http_client,
            host: config.grafana_host.trim_end_matches('/').to_string(),
            token: config.grafana_token.clone(),
        })
    }
}

#[async_trait]
impl GenericDashboardClient for GrafanaDashboardClient {
    #[instrument(name = "GrafanaDashboardClient::list_dashboards", skip(self))]
    async fn list_dashboards(&self, query: &str) -> Res<Vec<Dashboard>> {
        let dashboards: Vec<Dashboard> = self
            .http_client
            .get(format!("{}/api/search", self.host))
            .query(&[("query", query), ("type", "dash-db")])
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Grafana returned {} dashboards", dashboards.len());

        Ok(dashboards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::config::ConfigInner;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn config_for(server: &MockServer) -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                grafana_host: server.url("/"),
                grafana_token: "glsa_test".into(),
                grafana_timeout_secs: 5,
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn list_dashboards_queries_search_api() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/search")
                    .query_param_exists("query")
                    .query_param("type", "dash-db")
                    .header("authorization", "Bearer glsa_test");
                then.status(200).json_body(json!([
                    { "id": 1, "uid": "cpu", "title": "CPU", "url": "/d/cpu/cpu", "type": "dash-db", "tags": [] },
                    { "id": 2, "uid": "mem", "title": "Memory", "url": "/d/mem/memory", "type": "dash-db", "tags": [] }
                ]));
            })
            .await;

        let client = DashboardClient::grafana(&config_for(&server)).unwrap();
        let dashboards = client.list_dashboards("").await.unwrap();

        mock.assert_async().await;
        assert_eq!(dashboards.len(), 2);
        assert_eq!(dashboards[0].uid, "cpu");
        assert_eq!(dashboards[1].title, "Memory");
        assert_eq!(dashboards[1].url, "/d/mem/memory");
    }

    #[tokio::test]
    async fn list_dashboards_fails_on_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/search");
                then.status(401).json_body(json!({ "message": "invalid API key" }));
            })
            .await;

        let client = DashboardClient::grafana(&config_for(&server)).unwrap();

        assert!(client.list_dashboards("").await.is_err());
    }
}
