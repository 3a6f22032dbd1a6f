//! Chromium control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`ChromiumFactory`] launches one headless
//! Chromium per runner worker (each with its own temporary profile) and
//! hands out one fresh page per test attempt. Locators are resolved inside
//! the page by the runtime in [`crate::script`].
//!
//! Without the feature, [`launch_factory`] fails with `BrowserLaunchError`;
//! unit tests use [`crate::driver::MockDriverFactory`] instead.

use crate::driver::{DriverConfig, DriverFactory};
use crate::result::E2eResult;
use std::sync::Arc;

/// Launch the Chromium page factory
pub async fn launch_factory(config: DriverConfig) -> E2eResult<Arc<dyn DriverFactory>> {
    imp::launch_factory(config).await
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::wildcard_imports,
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc
)]
mod cdp {
    use super::*;
    use crate::driver::{ElementHandle, PageDriver, PageOptions, SelectBy};
    use crate::locator::Locator;
    use crate::result::E2eError;
    use crate::script;
    use crate::session::{Cookie, OriginState, SameSite, StorageState};
    use crate::wait::{poll_until, retry_with_backoff, LoadState, WaitOptions, NETWORK_IDLE_THRESHOLD_MS};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
    use chromiumoxide::cdp::browser_protocol::network::{
        ClearBrowserCookiesParams, CookieParam, CookieSameSite, TimeSinceEpoch,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::browser_protocol::storage::ClearDataForOriginParams;
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::handler::viewport::Viewport as CdpViewport;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tracing::{debug, info};

    /// One launched Chromium and its event loop
    #[derive(Debug)]
    struct BrowserSlot {
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
        // Dropped (and deleted) after the browser closes.
        _profile: tempfile::TempDir,
    }

    /// Page factory backed by one Chromium per worker
    #[derive(Debug)]
    pub struct ChromiumFactory {
        config: DriverConfig,
        browsers: Mutex<HashMap<usize, Arc<BrowserSlot>>>,
    }

    pub async fn launch_factory(config: DriverConfig) -> E2eResult<Arc<dyn DriverFactory>> {
        Ok(Arc::new(ChromiumFactory {
            config,
            browsers: Mutex::new(HashMap::new()),
        }))
    }

    async fn launch_browser(config: &DriverConfig) -> E2eResult<BrowserSlot> {
        let profile = tempfile::Builder::new().prefix("peopleops-chromium-").tempdir()?;
        let mut builder = CdpConfig::builder()
            .user_data_dir(profile.path())
            .window_size(config.viewport.width, config.viewport.height)
            .viewport(CdpViewport {
                width: config.viewport.width,
                height: config.viewport.height,
                ..CdpViewport::default()
            })
            .request_timeout(config.request_timeout);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| E2eError::BrowserLaunchError { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| E2eError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(BrowserSlot {
            inner: Arc::new(Mutex::new(browser)),
            handle,
            _profile: profile,
        })
    }

    impl ChromiumFactory {
        async fn browser_for(&self, worker: usize) -> E2eResult<Arc<BrowserSlot>> {
            let mut browsers = self.browsers.lock().await;
            if let Some(slot) = browsers.get(&worker) {
                return Ok(Arc::clone(slot));
            }
            let slot = retry_with_backoff("browser launch", 2, Duration::from_millis(500), || {
                launch_browser(&self.config)
            })
            .await?;
            info!(worker, headless = self.config.headless, "launched chromium");
            let slot = Arc::new(slot);
            browsers.insert(worker, Arc::clone(&slot));
            Ok(slot)
        }
    }

    #[async_trait]
    impl DriverFactory for ChromiumFactory {
        async fn new_page(
            &self,
            worker: usize,
            options: &PageOptions,
        ) -> E2eResult<Arc<dyn PageDriver>> {
            let slot = self.browser_for(worker).await?;
            let page = {
                let browser = slot.inner.lock().await;
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| E2eError::PageError {
                        message: e.to_string(),
                    })?
            };
            let driver = CdpPageDriver { page };
            driver.reset(&options.origins).await?;
            if let Some(state) = &options.storage_state {
                driver.apply_storage_state(state).await?;
            }
            Ok(Arc::new(driver))
        }

        async fn shutdown(&self) -> E2eResult<()> {
            let mut browsers = self.browsers.lock().await;
            for (worker, slot) in browsers.drain() {
                let mut browser = slot.inner.lock().await;
                if let Err(e) = browser.close().await {
                    debug!(worker, error = %e, "browser close failed");
                }
                slot.handle.abort();
            }
            Ok(())
        }
    }

    /// A page driven over CDP
    #[derive(Debug)]
    pub struct CdpPageDriver {
        page: CdpPage,
    }

    fn page_err(e: impl std::fmt::Display) -> E2eError {
        E2eError::PageError {
            message: e.to_string(),
        }
    }

    const fn key_code(key: &str) -> Option<(i64, &'static str)> {
        match key.as_bytes() {
            b"Enter" => Some((13, "\r")),
            b"Tab" => Some((9, "")),
            b"Escape" => Some((27, "")),
            b"Backspace" => Some((8, "")),
            b"ArrowDown" => Some((40, "")),
            b"ArrowUp" => Some((38, "")),
            _ => None,
        }
    }

    impl CdpPageDriver {
        async fn eval(&self, expression: String) -> E2eResult<serde_json::Value> {
            let params = EvaluateParams::builder()
                .expression(expression)
                .await_promise(true)
                .return_by_value(true)
                .build()
                .map_err(|message| E2eError::ScriptError { message })?;
            let result = self
                .page
                .evaluate_expression(params)
                .await
                .map_err(|e| E2eError::ScriptError {
                    message: e.to_string(),
                })?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn act(&self, locator: &Locator, expression: String) -> E2eResult<()> {
            match self.eval(expression).await? {
                serde_json::Value::Bool(true) => Ok(()),
                serde_json::Value::Null => Err(E2eError::NotActionable {
                    selector: locator.to_string(),
                    reason: "no matching option".into(),
                }),
                _ => Err(E2eError::ElementNotFound {
                    selector: locator.to_string(),
                }),
            }
        }

        async fn ready_state(&self) -> E2eResult<String> {
            Ok(self
                .eval("document.readyState".into())
                .await?
                .as_str()
                .unwrap_or_default()
                .to_string())
        }

        async fn resource_count(&self) -> E2eResult<u64> {
            Ok(self
                .eval("performance.getEntriesByType('resource').length".into())
                .await?
                .as_u64()
                .unwrap_or(0))
        }

        async fn reset(&self, origins: &[String]) -> E2eResult<()> {
            self.page
                .execute(ClearBrowserCookiesParams::default())
                .await
                .map_err(page_err)?;
            for origin in origins {
                let params = ClearDataForOriginParams::new(
                    origin.clone(),
                    "local_storage,session_storage,indexeddb,cache_storage",
                );
                self.page.execute(params).await.map_err(page_err)?;
            }
            Ok(())
        }

        async fn restore_origin(&self, origin: &OriginState) -> E2eResult<()> {
            self.goto(&origin.origin).await?;
            self.eval(script::restore_storage_expr(origin)).await?;
            Ok(())
        }
    }

    #[async_trait]
    impl PageDriver for CdpPageDriver {
        async fn goto(&self, url: &str) -> E2eResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| E2eError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn reload(&self) -> E2eResult<()> {
            self.page.reload().await.map_err(page_err)?;
            Ok(())
        }

        async fn go_back(&self) -> E2eResult<()> {
            self.eval("history.back(); true".into()).await?;
            Ok(())
        }

        async fn current_url(&self) -> E2eResult<String> {
            Ok(self.page.url().await.map_err(page_err)?.unwrap_or_default())
        }

        async fn title(&self) -> E2eResult<String> {
            Ok(self.page.get_title().await.map_err(page_err)?.unwrap_or_default())
        }

        async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> E2eResult<()> {
            let options = WaitOptions::new()
                .with_timeout(timeout.as_millis() as u64)
                .with_poll_interval(100);
            let what = format!("load state {state}");
            match state {
                LoadState::DomContentLoaded => {
                    poll_until(&what, &options, || async {
                        Ok((self.ready_state().await? != "loading").then_some(()))
                    })
                    .await
                }
                LoadState::Load => {
                    poll_until(&what, &options, || async {
                        Ok((self.ready_state().await? == "complete").then_some(()))
                    })
                    .await
                }
                LoadState::NetworkIdle => {
                    let quiet = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
                    let last = std::sync::Mutex::new((u64::MAX, tokio::time::Instant::now()));
                    let last = &last;
                    poll_until(&what, &options, || async move {
                        let count = self.resource_count().await?;
                        let complete = self.ready_state().await? == "complete";
                        let now = tokio::time::Instant::now();
                        let mut seen = last.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                        if count != seen.0 {
                            *seen = (count, now);
                            return Ok(None);
                        }
                        Ok((complete && now.duration_since(seen.1) >= quiet).then_some(()))
                    })
                    .await
                }
            }
        }

        async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
            let value = self.eval(script::query_expr(locator)).await?;
            if value.is_null() {
                return Ok(Vec::new());
            }
            Ok(serde_json::from_value(value)?)
        }

        async fn click(&self, locator: &Locator) -> E2eResult<()> {
            self.act(locator, script::click_expr(locator)).await
        }

        async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
            self.act(locator, script::fill_expr(locator, value)).await
        }

        async fn select_option(&self, locator: &Locator, by: &SelectBy) -> E2eResult<()> {
            self.act(locator, script::select_expr(locator, by)).await
        }

        async fn set_checked(&self, locator: &Locator, checked: bool) -> E2eResult<()> {
            self.act(locator, script::check_expr(locator, checked)).await
        }

        async fn press(&self, locator: &Locator, key: &str) -> E2eResult<()> {
            self.act(locator, script::focus_expr(locator)).await?;
            let (code, text) = key_code(key).unwrap_or((0, ""));
            for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
                let mut builder = DispatchKeyEventParams::builder()
                    .r#type(kind.clone())
                    .key(key)
                    .code(key)
                    .windows_virtual_key_code(code)
                    .native_virtual_key_code(code);
                if kind == DispatchKeyEventType::KeyDown && !text.is_empty() {
                    builder = builder.text(text);
                }
                let params = builder.build().map_err(page_err)?;
                self.page.execute(params).await.map_err(page_err)?;
            }
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value> {
            self.eval(script.to_string()).await
        }

        async fn add_init_script(&self, script: &str) -> E2eResult<()> {
            self.page
                .execute(AddScriptToEvaluateOnNewDocumentParams::new(script.to_string()))
                .await
                .map_err(page_err)?;
            self.eval(script.to_string()).await?;
            Ok(())
        }

        async fn screenshot(&self, full_page: bool) -> E2eResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .capture_beyond_viewport(full_page)
                .build();

            let screenshot = self.page.execute(params).await.map_err(page_err)?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(page_err)
        }

        async fn storage_state(&self) -> E2eResult<StorageState> {
            let cookies = self
                .page
                .get_cookies()
                .await
                .map_err(page_err)?
                .into_iter()
                .map(|c| Cookie {
                    name: c.name,
                    value: c.value,
                    domain: c.domain,
                    path: c.path,
                    expires: if c.session { -1.0 } else { c.expires },
                    http_only: c.http_only,
                    secure: c.secure,
                    same_site: match c.same_site {
                        Some(CookieSameSite::Strict) => SameSite::Strict,
                        Some(CookieSameSite::None) => SameSite::None,
                        _ => SameSite::Lax,
                    },
                })
                .collect();
            let mut state = StorageState {
                cookies,
                origins: Vec::new(),
            };
            let origin: OriginState = serde_json::from_value(self.eval(script::CAPTURE_STORAGE.into()).await?)?;
            if !origin.origin.is_empty() && origin.origin != "null" {
                state.merge_origins(vec![origin]);
            }
            Ok(state)
        }

        async fn apply_storage_state(&self, state: &StorageState) -> E2eResult<()> {
            let cookies: Vec<CookieParam> = state
                .cookies
                .iter()
                .map(|c| {
                    let mut param = CookieParam::new(c.name.clone(), c.value.clone());
                    param.domain = Some(c.domain.clone());
                    param.path = Some(c.path.clone());
                    param.secure = Some(c.secure);
                    param.http_only = Some(c.http_only);
                    param.same_site = Some(match c.same_site {
                        SameSite::Strict => CookieSameSite::Strict,
                        SameSite::Lax => CookieSameSite::Lax,
                        SameSite::None => CookieSameSite::None,
                    });
                    if c.expires >= 0.0 {
                        param.expires = Some(TimeSinceEpoch::new(c.expires));
                    }
                    param
                })
                .collect();
            if !cookies.is_empty() {
                self.page.set_cookies(cookies).await.map_err(|e| E2eError::SessionError {
                    message: e.to_string(),
                })?;
            }
            for origin in &state.origins {
                self.restore_origin(origin).await?;
            }
            if !state.origins.is_empty() {
                self.goto("about:blank").await?;
            }
            Ok(())
        }

        async fn close(&self) -> E2eResult<()> {
            self.page.clone().close().await.map_err(page_err)?;
            Ok(())
        }
    }
}

// ============================================================================
// Fallback (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod fallback {
    use super::*;
    use crate::result::E2eError;

    pub async fn launch_factory(_config: DriverConfig) -> E2eResult<Arc<dyn DriverFactory>> {
        Err(E2eError::BrowserLaunchError {
            message: "Browser feature not enabled. Enable 'browser' feature for real CDP support."
                .to_string(),
        })
    }
}

#[cfg(feature = "browser")]
use cdp as imp;
#[cfg(feature = "browser")]
pub use cdp::{CdpPageDriver, ChromiumFactory};

#[cfg(not(feature = "browser"))]
use fallback as imp;
