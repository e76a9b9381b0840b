//! Request interception for a single page.
//!
//! CDP `Fetch.requestPaused` events are pumped into a channel and consumed by
//! a dedicated task. Each paused request gets its own handler so slow bodies
//! never hold up other requests. The page and the main flow only share the
//! [`SharedMatchSet`] and a stop signal with this task.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
    GetResponseBodyParams, RequestId, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use super::resource::{BlockPolicy, ResourceClass};
use crate::core::constants::{resources, timeouts};
use crate::core::error::{LinkScoutError, Result};
use crate::core::types::{ContentPayload, Provenance, SharedMatchSet};
use crate::discovery::matcher;

/// Point in the request lifecycle at which the browser paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptStage {
    /// Before the request is sent
    Request,
    /// After response headers arrived, body not yet handed to the page
    Response,
}

/// A paused request, detached from the CDP event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub id: String,
    pub url: String,
    pub class: ResourceClass,
    pub stage: InterceptStage,
    pub status_code: Option<i64>,
    /// Set when the response stage was reached through a network failure
    pub error_reason: Option<String>,
}

impl InterceptedRequest {
    pub fn request(id: &str, url: &str, class: ResourceClass) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            class,
            stage: InterceptStage::Request,
            status_code: None,
            error_reason: None,
        }
    }

    pub fn response(id: &str, url: &str, class: ResourceClass, status_code: i64) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            class,
            stage: InterceptStage::Response,
            status_code: Some(status_code),
            error_reason: None,
        }
    }

    /// A response-stage pause for a request that failed before a response arrived.
    pub fn failed(id: &str, url: &str, class: ResourceClass, reason: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            class,
            stage: InterceptStage::Response,
            status_code: None,
            error_reason: Some(reason.to_string()),
        }
    }

    fn is_redirect(&self) -> bool {
        self.status_code
            .is_some_and(|code| (300..400).contains(&code))
    }
}

impl From<&EventRequestPaused> for InterceptedRequest {
    fn from(event: &EventRequestPaused) -> Self {
        let stage = if event.response_status_code.is_some() || event.response_error_reason.is_some()
        {
            InterceptStage::Response
        } else {
            InterceptStage::Request
        };

        Self {
            id: event.request_id.inner().clone(),
            url: event.request.url.clone(),
            class: ResourceClass::from(&event.resource_type),
            stage,
            status_code: event.response_status_code,
            error_reason: event
                .response_error_reason
                .as_ref()
                .map(|reason| format!("{reason:?}")),
        }
    }
}

/// Terminal (and intermediate) states of one intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptState {
    Intercepted,
    Blocked,
    Continued,
    ResponseLoaded,
    Matched,
    LoadFailed,
}

/// The browser primitives the interceptor needs.
#[async_trait]
pub trait RequestControl: Send + Sync {
    /// Fail the request as blocked by the client.
    async fn block(&self, request: &InterceptedRequest) -> Result<()>;

    /// Let a paused request or response proceed unchanged.
    async fn resume(&self, request: &InterceptedRequest) -> Result<()>;

    /// Body of a request paused at the response stage.
    async fn response_body(&self, request: &InterceptedRequest) -> Result<Vec<u8>>;
}

/// Knobs for one interceptor instance.
#[derive(Debug, Clone)]
pub struct InterceptorSettings {
    pub policy: BlockPolicy,
    pub response_timeout: Duration,
    pub drain_timeout: Duration,
}

impl Default for InterceptorSettings {
    fn default() -> Self {
        Self {
            policy: BlockPolicy::default(),
            response_timeout: Duration::from_millis(timeouts::DEFAULT_RESPONSE_MS),
            drain_timeout: Duration::from_millis(timeouts::DEFAULT_DRAIN_MS),
        }
    }
}

/// Per-page counters, reported when the interceptor stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorStats {
    pub blocked: usize,
    pub continued: usize,
    pub matched: usize,
    pub load_failed: usize,
    pub abandoned: usize,
}

impl InterceptorStats {
    fn record(&mut self, outcome: std::result::Result<InterceptState, JoinError>) {
        match outcome {
            Ok(InterceptState::Blocked) => self.blocked += 1,
            Ok(InterceptState::Continued) => self.continued += 1,
            Ok(InterceptState::Matched) => self.matched += 1,
            Ok(InterceptState::LoadFailed) => self.load_failed += 1,
            Ok(InterceptState::Intercepted | InterceptState::ResponseLoaded) => {}
            Err(err) => {
                warn!("Interception handler did not finish: {err}");
                self.abandoned += 1;
            }
        }
    }
}

/// Drive one paused request to a terminal state.
///
/// Errors from the browser are logged and turned into a state; they never
/// propagate, so one failing resource cannot affect its siblings.
pub async fn handle_request(
    request: InterceptedRequest,
    control: &dyn RequestControl,
    settings: &InterceptorSettings,
    matches: &SharedMatchSet,
) -> InterceptState {
    match request.stage {
        InterceptStage::Request if settings.policy.is_blocked(request.class) => {
            if let Err(err) = control.block(&request).await {
                warn!("Could not block {} ({}): {err}", request.url, request.class);
            }
            debug!("Blocked {} {}", request.class, request.url);
            InterceptState::Blocked
        }
        InterceptStage::Request => {
            if let Err(err) = control.resume(&request).await {
                warn!("Could not continue {}: {err}", request.url);
            }
            InterceptState::Continued
        }
        InterceptStage::Response if request.is_redirect() => {
            if let Err(err) = control.resume(&request).await {
                debug!("Could not continue redirect {}: {err}", request.url);
            }
            InterceptState::Continued
        }
        InterceptStage::Response if request.error_reason.is_some() => {
            debug!(
                "Request {} failed: {}",
                request.url,
                request.error_reason.as_deref().unwrap_or_default()
            );
            if let Err(err) = control.resume(&request).await {
                debug!("Could not continue failed request {}: {err}", request.url);
            }
            InterceptState::LoadFailed
        }
        InterceptStage::Response => load_and_match(request, control, settings, matches).await,
    }
}

async fn load_and_match(
    request: InterceptedRequest,
    control: &dyn RequestControl,
    settings: &InterceptorSettings,
    matches: &SharedMatchSet,
) -> InterceptState {
    let loaded = tokio::time::timeout(settings.response_timeout, control.response_body(&request))
        .await
        .unwrap_or_else(|_| {
            Err(LinkScoutError::Timeout {
                what: format!("response body of {}", request.url),
                after: settings.response_timeout,
            })
        });

    // The page is waiting on this response either way.
    if let Err(err) = control.resume(&request).await {
        debug!("Could not continue response {}: {err}", request.url);
    }

    let body = match loaded {
        Ok(body) => body,
        Err(err) => {
            warn!("Error loading response {}: {err}", request.url);
            return InterceptState::LoadFailed;
        }
    };

    let payload = ContentPayload::from_bytes(Provenance::Url(request.url), &body);
    matches.merge(matcher::extract_payload(payload));
    InterceptState::Matched
}

/// Spawns and owns the interceptor task for one page.
pub struct TrafficInterceptor;

impl TrafficInterceptor {
    /// Start consuming `events`. The task runs until [`InterceptorHandle::stop`]
    /// is called or the event channel closes.
    pub fn spawn(
        events: mpsc::Receiver<InterceptedRequest>,
        control: Arc<dyn RequestControl>,
        matches: SharedMatchSet,
        settings: InterceptorSettings,
    ) -> InterceptorHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(events, control, matches, settings, stop_rx));

        InterceptorHandle {
            stop: Some(stop_tx),
            task,
            pump: None,
        }
    }

    /// Enable request interception on `page` and start the interceptor.
    ///
    /// Must be called before navigating so the top-level document is seen too.
    pub async fn install(
        page: &Page,
        matches: SharedMatchSet,
        settings: InterceptorSettings,
    ) -> Result<InterceptorHandle> {
        // Subscribe first so no paused request is missed once Fetch is enabled.
        let mut paused = page.event_listener::<EventRequestPaused>().await?;
        page.execute(interception_patterns()).await?;

        let (tx, rx) = mpsc::channel(resources::EVENT_CHANNEL_CAPACITY);
        let pump = tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                if tx.send(InterceptedRequest::from(&*event)).await.is_err() {
                    break;
                }
            }
        });

        let control = Arc::new(PageControl { page: page.clone() });
        let mut handle = Self::spawn(rx, control, matches, settings);
        handle.pump = Some(pump);
        Ok(handle)
    }
}

fn interception_patterns() -> EnableParams {
    EnableParams::builder()
        .patterns(vec![
            RequestPattern::builder()
                .url_pattern("*")
                .request_stage(RequestStage::Request)
                .build(),
            RequestPattern::builder()
                .url_pattern("*")
                .request_stage(RequestStage::Response)
                .build(),
        ])
        .build()
}

async fn run(
    mut events: mpsc::Receiver<InterceptedRequest>,
    control: Arc<dyn RequestControl>,
    matches: SharedMatchSet,
    settings: InterceptorSettings,
    mut stop: oneshot::Receiver<()>,
) -> InterceptorStats {
    let settings = Arc::new(settings);
    let mut in_flight = JoinSet::new();
    let mut stats = InterceptorStats::default();

    loop {
        tokio::select! {
            // Queued events are handled before a stop request is honored.
            biased;

            event = events.recv() => match event {
                Some(request) => {
                    let control = Arc::clone(&control);
                    let settings = Arc::clone(&settings);
                    let matches = matches.clone();
                    in_flight.spawn(async move {
                        handle_request(request, control.as_ref(), &settings, &matches).await
                    });
                }
                None => break,
            },
            Some(done) = in_flight.join_next(), if !in_flight.is_empty() => stats.record(done),
            _ = &mut stop => break,
        }
    }

    let drain = async {
        while let Some(done) = in_flight.join_next().await {
            stats.record(done);
        }
    };
    if tokio::time::timeout(settings.drain_timeout, drain).await.is_err() {
        warn!(
            "Abandoning {} in-flight interception(s) after {}ms",
            in_flight.len(),
            settings.drain_timeout.as_millis()
        );
        stats.abandoned += in_flight.len();
        in_flight.abort_all();
    }

    stats
}

/// Handle onto a running interceptor.
///
/// Dropping the handle without calling [`stop`](Self::stop) also stops the task.
pub struct InterceptorHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<InterceptorStats>,
    pump: Option<JoinHandle<()>>,
}

impl InterceptorHandle {
    /// Stop accepting new requests, let in-flight ones drain, and return the counters.
    pub async fn stop(mut self) -> InterceptorStats {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        match (&mut self.task).await {
            Ok(stats) => stats,
            Err(err) => {
                warn!("Interceptor task failed: {err}");
                InterceptorStats::default()
            }
        }
    }
}

impl Drop for InterceptorHandle {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// [`RequestControl`] over a live chromiumoxide page.
struct PageControl {
    page: Page,
}

#[async_trait]
impl RequestControl for PageControl {
    async fn block(&self, request: &InterceptedRequest) -> Result<()> {
        self.page
            .execute(FailRequestParams::new(
                RequestId::new(request.id.clone()),
                ErrorReason::BlockedByClient,
            ))
            .await?;
        Ok(())
    }

    async fn resume(&self, request: &InterceptedRequest) -> Result<()> {
        self.page
            .execute(ContinueRequestParams::new(RequestId::new(request.id.clone())))
            .await?;
        Ok(())
    }

    async fn response_body(&self, request: &InterceptedRequest) -> Result<Vec<u8>> {
        let response = self
            .page
            .execute(GetResponseBodyParams::new(RequestId::new(request.id.clone())))
            .await?;

        if response.result.base64_encoded {
            STANDARD.decode(&response.result.body).map_err(|e| {
                LinkScoutError::Browser(format!("Invalid base64 body for {}: {e}", request.url))
            })
        } else {
            Ok(response.result.body.clone().into_bytes())
        }
    }
}
