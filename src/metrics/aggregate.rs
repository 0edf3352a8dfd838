//! Per-endpoint request/error totals.

use serde::Serialize;

use super::message::EndpointSample;

/// Bucket for samples that carry no endpoint label.
pub const UNKNOWN_ENDPOINT: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRow {
    pub endpoint: String,
    pub request_count: f64,
    pub error_count: f64,
}

impl EndpointRow {
    fn empty(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            request_count: 0.0,
            error_count: 0.0,
        }
    }
}

/// Endpoint summary table, rows in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EndpointTable {
    rows: Vec<EndpointRow>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh table from one message's arrays.
    ///
    /// Request endpoints come first, then endpoints seen only in errors.
    /// Values for the same endpoint are summed.
    pub fn from_samples(requests: &[EndpointSample], errors: &[EndpointSample]) -> Self {
        let mut table = Self::new();
        for sample in requests {
            table.row_mut(sample.endpoint.as_deref()).request_count += sample.value;
        }
        for sample in errors {
            table.row_mut(sample.endpoint.as_deref()).error_count += sample.value;
        }
        table
    }

    /// Adds `other`'s totals into this table, appending unseen endpoints.
    pub fn merge(&mut self, other: &EndpointTable) {
        for row in &other.rows {
            let target = self.row_mut(Some(&row.endpoint));
            target.request_count += row.request_count;
            target.error_count += row.error_count;
        }
    }

    pub fn get(&self, endpoint: &str) -> Option<&EndpointRow> {
        self.rows.iter().find(|r| r.endpoint == endpoint)
    }

    pub fn rows(&self) -> &[EndpointRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_mut(&mut self, endpoint: Option<&str>) -> &mut EndpointRow {
        let key = match endpoint {
            Some(e) if !e.is_empty() => e,
            _ => UNKNOWN_ENDPOINT,
        };
        let idx = match self.rows.iter().position(|r| r.endpoint == key) {
            Some(idx) => idx,
            None => {
                self.rows.push(EndpointRow::empty(key));
                self.rows.len() - 1
            }
        };
        &mut self.rows[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(endpoint: &str, request_count: f64, error_count: f64) -> EndpointRow {
        EndpointRow {
            endpoint: endpoint.to_string(),
            request_count,
            error_count,
        }
    }

    #[test]
    fn test_requests_and_errors_combined() {
        let table = EndpointTable::from_samples(
            &[EndpointSample::new(Some("/a"), 3.0)],
            &[
                EndpointSample::new(Some("/a"), 1.0),
                EndpointSample::new(Some("/b"), 2.0),
            ],
        );

        assert_eq!(table.rows(), &[row("/a", 3.0, 1.0), row("/b", 0.0, 2.0)]);
    }

    #[test]
    fn test_missing_endpoint_bucketed_as_unknown() {
        let table = EndpointTable::from_samples(
            &[
                EndpointSample::new(None, 4.0),
                EndpointSample::new(Some(""), 1.0),
            ],
            &[EndpointSample::new(None, 2.0)],
        );

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(UNKNOWN_ENDPOINT), Some(&row("unknown", 5.0, 2.0)));
    }

    #[test]
    fn test_same_endpoint_different_methods_summed() {
        let mut get = EndpointSample::new(Some("/items"), 5.0);
        get.method = Some("GET".to_string());
        let mut post = EndpointSample::new(Some("/items"), 2.0);
        post.method = Some("POST".to_string());

        let table = EndpointTable::from_samples(&[get, post], &[]);
        assert_eq!(table.get("/items").unwrap().request_count, 7.0);
    }

    #[test]
    fn test_merge_adds_and_appends() {
        let mut running =
            EndpointTable::from_samples(&[EndpointSample::new(Some("/a"), 3.0)], &[]);
        let next = EndpointTable::from_samples(
            &[EndpointSample::new(Some("/a"), 2.0)],
            &[EndpointSample::new(Some("/c"), 1.0)],
        );

        running.merge(&next);
        assert_eq!(running.rows(), &[row("/a", 5.0, 0.0), row("/c", 0.0, 1.0)]);
    }

    #[test]
    fn test_serializes_camel_case_rows() {
        let table = EndpointTable::from_samples(&[EndpointSample::new(Some("/a"), 3.0)], &[]);
        assert_eq!(
            serde_json::to_value(&table).unwrap(),
            serde_json::json!([{"endpoint": "/a", "requestCount": 3.0, "errorCount": 0.0}])
        );
    }
}
