use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use sightline_common::content::NodeRef;
use sightline_common::error::DriverError;
use sightline_common::protocol::{
    ClearRequest, ClickRequest, ScannerRequest, ScannerResponse, TypeRequest,
};
use sightline_common::snapshot::PageSnapshot;
use sightline_engine::driver::Driver;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Scanner execution is retried when the page context was torn down under
/// us (navigation, reload) and the payload has to be re-injected.
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// A live WebDriver session implementing the engine's [`Driver`] boundary.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connects to a WebDriver endpoint with default capabilities.
    pub async fn connect(webdriver_url: &str) -> Result<Self, DriverError> {
        Self::connect_with_capabilities(webdriver_url, serde_json::Map::new()).await
    }

    /// Connects with caller-provided W3C capabilities.
    pub async fn connect_with_capabilities(
        webdriver_url: &str,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, DriverError> {
        info!("Connecting to WebDriver at {}...", webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                DriverError::Other(format!(
                    "failed to connect to WebDriver at {webdriver_url}: {e}"
                ))
            })?;
        Ok(Self { client })
    }

    /// The underlying fantoccini client, for navigation and anything else
    /// outside the engine's boundary.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn goto(&self, url: &str) -> Result<(), DriverError> {
        info!("Navigating to: {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| DriverError::Other(format!("navigation failed: {e}")))
    }

    pub async fn close(self) -> Result<(), DriverError> {
        self.client
            .close()
            .await
            .map_err(|e| DriverError::Other(format!("failed to close session: {e}")))
    }

    async fn process(&self, request: &ScannerRequest) -> Result<serde_json::Value, DriverError> {
        let args = serde_json::to_value(request)?;

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                warn!("Retrying scanner execution (attempt {})...", attempt);
                tokio::time::sleep(RETRY_DELAY).await;
            }

            // 1. Inject the capture payload if this context has not seen it
            let check_script = "return typeof window.Sightline !== 'undefined';";
            let is_injected = match self.client.execute(check_script, vec![]).await {
                Ok(value) => value.as_bool().unwrap_or(false),
                Err(_) => false, // assume not injected or context lost
            };

            if !is_injected {
                debug!("Injecting capture payload...");
                if let Err(e) = self
                    .client
                    .execute(sightline_scanner::CAPTURE_JS, vec![])
                    .await
                {
                    last_error = Some(DriverError::Script(format!(
                        "failed to inject capture payload: {e}"
                    )));
                    continue;
                }
            }

            // 2. Execute
            let exec_script = "return window.Sightline.process(arguments[0]);";
            match self.client.execute(exec_script, vec![args.clone()]).await {
                Ok(value) => {
                    // A null result usually means the context was destroyed
                    // mid-call. For mutations that is the expected effect of
                    // a triggered navigation; synthesize success.
                    if value.is_null() {
                        if request.is_mutation() {
                            info!("Scanner returned null, assuming navigation occurred");
                            return Ok(serde_json::Value::Null);
                        }
                        last_error = Some(DriverError::Script("scanner returned null".into()));
                        continue;
                    }

                    match serde_json::from_value::<ScannerResponse>(value) {
                        Ok(ScannerResponse::Ok { data }) => return Ok(data),
                        Ok(ScannerResponse::Error { code, message }) => {
                            return Err(DriverError::Page { code, message });
                        }
                        Err(e) => {
                            last_error = Some(DriverError::Script(format!(
                                "malformed scanner response: {e}"
                            )));
                            continue;
                        }
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    if message.contains("Sightline is not defined")
                        || message.contains("undefined is not an object")
                    {
                        last_error = Some(DriverError::Script(message));
                        continue;
                    }
                    return Err(DriverError::Script(message));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DriverError::Script("failed after maximum retries".into())))
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn capture(&self) -> Result<PageSnapshot, DriverError> {
        let data = self.process(&ScannerRequest::capture()).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn click(&self, node: NodeRef) -> Result<(), DriverError> {
        self.process(&ScannerRequest::Click(ClickRequest { node }))
            .await
            .map(|_| ())
    }

    async fn clear(&self, node: NodeRef) -> Result<(), DriverError> {
        self.process(&ScannerRequest::Clear(ClearRequest { node }))
            .await
            .map(|_| ())
    }

    async fn send_keys(&self, node: NodeRef, text: &str) -> Result<(), DriverError> {
        self.process(&ScannerRequest::Type(TypeRequest {
            node,
            text: text.into(),
        }))
        .await
        .map(|_| ())
    }
}
