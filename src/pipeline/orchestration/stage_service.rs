use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tower::timeout::error::Elapsed;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};
use tracing::{debug, error, instrument};

use super::text_stage::{StageParams, TextStage};
use crate::error::ServiceError;

pub struct StageRequest {
    pub text: String,
    pub params: StageParams,
}

/// Exposes a [`TextStage`] as a tower service.
#[derive(Clone)]
pub struct StageService {
    inner: Arc<dyn TextStage>,
}

impl StageService {
    pub fn new(inner: Arc<dyn TextStage>) -> Self {
        Self { inner }
    }
}

impl Service<StageRequest> for StageService {
    type Response = String;
    type Error = ServiceError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: StageRequest) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { inner.transform(&req.text, &req.params).await })
    }
}

/// Runs one stage call under a timeout, logging its outcome and duration.
#[instrument(skip(stage, request), fields(stage = %stage.kind()))]
pub async fn call_instrumented(
    stage: Arc<dyn TextStage>,
    request: StageRequest,
    timeout: Duration,
) -> (Result<String, ServiceError>, Duration) {
    let kind = stage.kind();
    let start = Instant::now();
    debug!("Starting stage: {}", kind);

    let service = ServiceBuilder::new()
        .timeout(timeout)
        .service(StageService::new(stage));
    let result = service
        .oneshot(request)
        .await
        .map_err(|e| into_service_error(e, timeout));

    let duration = start.elapsed();
    match &result {
        Ok(output) => {
            debug!(
                "Completed stage '{}' in {}ms ({} chars)",
                kind,
                duration.as_millis(),
                output.len()
            );
        }
        Err(e) => {
            error!("Stage '{}' failed after {}ms: {}", kind, duration.as_millis(), e);
        }
    }

    (result, duration)
}

fn into_service_error(error: BoxError, timeout: Duration) -> ServiceError {
    match error.downcast::<ServiceError>() {
        Ok(service_error) => *service_error,
        Err(error) if error.is::<Elapsed>() => ServiceError::Timeout(timeout),
        Err(error) => ServiceError::MalformedCompletion(error.to_string()),
    }
}
