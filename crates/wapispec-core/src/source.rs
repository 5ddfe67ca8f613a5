//! Where raw schemas come from.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::debug;

use crate::error::SourceError;
use crate::raw::RawSchema;

/// Supplies the raw schema of one WAPI object type.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Where the schema of `object_type` is read from, for failure reports.
    fn describe(&self, object_type: &str) -> String;

    async fn fetch(&self, object_type: &str) -> Result<RawSchema, SourceError>;
}

/// Result of fetching one object type.
#[derive(Debug)]
pub struct Fetched {
    pub object_type: String,
    pub url: String,
    pub result: Result<RawSchema, SourceError>,
}

/// Fetch `objects` with at most `width` requests in flight.
///
/// Results come back in submission order regardless of completion order.
pub async fn fetch_ordered<S>(source: &S, objects: &[String], width: usize) -> Vec<Fetched>
where
    S: SchemaSource + ?Sized,
{
    let width = width.max(1);
    debug!("fetching {} schemas with up to {width} in flight", objects.len());

    stream::iter(objects)
        .map(|object_type| async move {
            let url = source.describe(object_type);
            let result = source.fetch(object_type).await;
            Fetched {
                object_type: object_type.clone(),
                url,
                result,
            }
        })
        .buffered(width)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Finishes later requests first and tracks peak concurrency.
    struct SlowFirst {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl SchemaSource for SlowFirst {
        fn describe(&self, object_type: &str) -> String {
            format!("mem://{object_type}")
        }

        async fn fetch(&self, object_type: &str) -> Result<RawSchema, SourceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = match object_type {
                "a" => 30,
                "b" => 10,
                _ => 1,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if object_type == "missing" {
                return Err(SourceError::Status {
                    code: 404,
                    body: String::new(),
                });
            }
            Ok(RawSchema {
                type_name: Some(object_type.to_string()),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        let source = SlowFirst {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let objects: Vec<String> = ["a", "b", "missing", "c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let fetched = fetch_ordered(&source, &objects, 2).await;

        let order: Vec<_> = fetched.iter().map(|f| f.object_type.as_str()).collect();
        assert_eq!(order, ["a", "b", "missing", "c", "d"]);
        assert_eq!(fetched[0].url, "mem://a");
        assert!(fetched[2].result.is_err());
        assert_eq!(
            fetched[3].result.as_ref().unwrap().type_name.as_deref(),
            Some("c")
        );
        assert!(source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_width_still_progresses() {
        let source = SlowFirst {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let objects = vec!["c".to_string()];
        let fetched = fetch_ordered(&source, &objects, 0).await;
        assert_eq!(fetched.len(), 1);
    }
}
