//! The services a replay client talks to.

use crate::config::SimulationConfig;
use crate::frame::RunResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "http")]
pub use http::HttpService;

/// A named simulation configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub config: SimulationConfig,
}

/// A failed request to a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service responded with status {0}")]
    Status(u16),
}

/// Runs simulations.
pub trait SimulationService {
    fn simulate(&self, config: &SimulationConfig) -> Result<RunResult, ServiceError>;
}

/// Stores named scenarios.
pub trait ScenarioStore {
    fn list(&self) -> Result<Vec<Scenario>, ServiceError>;
    fn save(&self, scenario: &Scenario) -> Result<(), ServiceError>;
}

#[cfg(feature = "http")]
mod http {
    use super::{Scenario, ScenarioStore, ServiceError, SimulationService};
    use crate::config::SimulationConfig;
    use crate::frame::RunResult;
    use reqwest::blocking::{Client, Response};
    use std::time::Duration;

    /// The default time to wait for a response.
    const TIMEOUT: Duration = Duration::from_secs(30);

    /// A client for the simulation backend's HTTP API.
    pub struct HttpService {
        client: Client,
        /// The base URL, e.g. `http://localhost:5000`.
        address: String,
        timeout: Duration,
    }

    impl HttpService {
        pub fn new(address: impl Into<String>) -> Self {
            Self {
                client: Client::new(),
                address: address.into().trim_end_matches('/').to_string(),
                timeout: TIMEOUT,
            }
        }

        /// Sets the time to wait for each response.
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.address, path)
        }
    }

    impl From<reqwest::Error> for ServiceError {
        fn from(err: reqwest::Error) -> Self {
            match err.status() {
                Some(status) => ServiceError::Status(status.as_u16()),
                None => ServiceError::Transport(err.to_string()),
            }
        }
    }

    fn check(resp: Response) -> Result<Response, ServiceError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(ServiceError::Status(status.as_u16()))
        }
    }

    impl SimulationService for HttpService {
        fn simulate(&self, config: &SimulationConfig) -> Result<RunResult, ServiceError> {
            let url = self.url("/api/simulate");
            log::debug!("requesting a run from {}", url);
            let resp = self
                .client
                .post(&url)
                .json(config)
                .timeout(self.timeout)
                .send()?;
            Ok(check(resp)?.json()?)
        }
    }

    impl ScenarioStore for HttpService {
        fn list(&self) -> Result<Vec<Scenario>, ServiceError> {
            let resp = self
                .client
                .get(self.url("/api/scenarios"))
                .timeout(self.timeout)
                .send()?;
            Ok(check(resp)?.json()?)
        }

        fn save(&self, scenario: &Scenario) -> Result<(), ServiceError> {
            let resp = self
                .client
                .post(self.url("/api/scenarios"))
                .json(scenario)
                .timeout(self.timeout)
                .send()?;
            check(resp)?;
            Ok(())
        }
    }

}
