//! Mock metrics server answering instant queries

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct MockPrometheusServer {
    pub server: MockServer,
}

impl MockPrometheusServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer `promql` with the given results. Queries without a mock get a
    /// 404 and read as no data.
    pub async fn mock_query(&self, promql: &str, results: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/v1/query"))
            .and(query_param("query", promql))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "resultType": "vector", "result": results }
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer `promql` with one sample
    pub async fn mock_value(&self, promql: &str, labels: Value, timestamp: f64, value: &str) {
        self.mock_query(promql, vec![sample(labels, timestamp, value)])
            .await;
    }

    pub async fn mock_error(&self, promql: &str) {
        Mock::given(method("GET"))
            .and(path("/api/v1/query"))
            .and(query_param("query", promql))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "errorType": "bad_data",
                "error": "parse error"
            })))
            .mount(&self.server)
            .await;
    }
}

/// One instant-vector result
pub fn sample(labels: Value, timestamp: f64, value: &str) -> Value {
    json!({ "metric": labels, "value": [timestamp, value] })
}
