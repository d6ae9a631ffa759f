use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A Grafana dashboard as returned by the search API.
///
/// `url` is the dashboard path relative to the Grafana host (e.g. `/d/abc/latency`) until it is
/// turned into a suggestion, at which point it holds the absolute link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub uid: String,
    pub title: String,
    pub url: String,
}
