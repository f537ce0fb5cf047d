//! Experiment-related API endpoints

use crate::ApiClient;
use crate::error::Result;
use crate::request::RequestSpec;
use pipedeck_core::domain::experiment::Experiment;
use pipedeck_core::dto::ListExperimentsResponse;
use pipedeck_core::list::ListRequest;

impl ApiClient {
    pub async fn create_experiment(&self, experiment: &Experiment) -> Result<Experiment> {
        self.send_json(RequestSpec::post("/experiments"), experiment)
            .await
    }

    pub async fn get_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        self.fetch(RequestSpec::get("/experiments").segment(experiment_id))
            .await
    }

    /// List one page of experiments
    pub async fn list_experiments(&self, request: &ListRequest) -> Result<ListExperimentsResponse> {
        self.fetch(RequestSpec::get("/experiments").list(request))
            .await
    }

    pub async fn delete_experiment(&self, experiment_id: &str) -> Result<()> {
        self.execute(RequestSpec::delete("/experiments").segment(experiment_id))
        .await
    }
}
