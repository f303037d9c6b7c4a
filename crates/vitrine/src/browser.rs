//! Real browser backend over the Chrome DevTools Protocol.
//!
//! With the `browser` feature, Chromium is launched through chromiumoxide.
//! Every test gets its own CDP browser context (separate cookies and
//! storage), disposed again when the test's page is closed. Element
//! operations are evaluated in the page as small scripts built from the
//! locator's selector.
//!
//! Without the feature, [`launch`] fails with `BrowserLaunchError` and
//! points at the simulated driver.

use crate::config::{BrowserKind, RunConfig};
use crate::driver::BrowserDriver;
use crate::result::{VitrineError, VitrineResult};
use std::future::Future;
use std::sync::Arc;

/// Launch the configured browser engine
///
/// # Errors
///
/// Returns `BrowserLaunchError` when the engine is not supported or
/// cannot be started.
pub async fn launch(config: &RunConfig) -> VitrineResult<Arc<dyn BrowserDriver>> {
    if config.browser != BrowserKind::Chromium {
        return Err(VitrineError::BrowserLaunchError {
            message: format!(
                "{} is not supported by the cdp driver (use chromium)",
                config.browser
            ),
        });
    }
    launch_chromium(config).await
}

#[cfg(feature = "browser")]
async fn launch_chromium(config: &RunConfig) -> VitrineResult<Arc<dyn BrowserDriver>> {
    Ok(Arc::new(cdp::CdpBrowser::launch(config).await?))
}

#[cfg(not(feature = "browser"))]
async fn launch_chromium(_config: &RunConfig) -> VitrineResult<Arc<dyn BrowserDriver>> {
    Err(VitrineError::BrowserLaunchError {
        message: "built without the `browser` feature; rebuild with --features browser \
                  or run with --driver simulated"
            .to_string(),
    })
}

/// Close a page, then dispose of its context even when the close failed.
/// The first error is returned.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
async fn close_then_dispose<C, D>(close: C, dispose: D) -> VitrineResult<()>
where
    C: Future<Output = VitrineResult<()>>,
    D: Future<Output = VitrineResult<()>>,
{
    let closed = close.await;
    if let Err(err) = &closed {
        tracing::debug!(error = %err, "page close failed; disposing context anyway");
    }
    let disposed = dispose.await;
    closed.and(disposed)
}

#[cfg(feature = "browser")]
mod cdp {
    use crate::config::{BrowserKind, RunConfig};
    use crate::driver::{BrowserDriver, ContextOptions, ElementSnapshot, PageDriver, Screenshot};
    use crate::locator::Selector;
    use crate::result::{VitrineError, VitrineResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
    use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
    use chromiumoxide::cdp::browser_protocol::target::{
        BrowserContextId, CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
    };
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn launch_error(err: impl std::fmt::Display) -> VitrineError {
        VitrineError::BrowserLaunchError {
            message: err.to_string(),
        }
    }

    fn page_error(err: impl std::fmt::Display) -> VitrineError {
        VitrineError::page(err.to_string())
    }

    /// Chromium controlled over CDP
    #[derive(Debug)]
    pub(super) struct CdpBrowser {
        inner: Arc<Mutex<Browser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl CdpBrowser {
        pub(super) async fn launch(config: &RunConfig) -> VitrineResult<Self> {
            let mut builder = BrowserConfig::builder()
                .window_size(config.viewport.width, config.viewport.height)
                .no_sandbox();
            if !config.headless {
                builder = builder.with_head();
            }
            let cdp_config = builder.build().map_err(launch_error)?;

            let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(launch_error)?;
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            tracing::info!(headless = config.headless, "chromium launched");

            Ok(Self {
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }
    }

    #[async_trait]
    impl BrowserDriver for CdpBrowser {
        fn kind(&self) -> BrowserKind {
            BrowserKind::Chromium
        }

        async fn new_context(&self, options: &ContextOptions) -> VitrineResult<Box<dyn PageDriver>> {
            let browser = self.inner.lock().await;
            let context = browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map_err(page_error)?
                .result
                .browser_context_id;
            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context.clone())
                .build()
                .map_err(page_error)?;
            let page = browser.new_page(target).await.map_err(page_error)?;
            let _ = page
                .execute(SetDeviceMetricsOverrideParams::new(
                    i64::from(options.viewport.width),
                    i64::from(options.viewport.height),
                    1.0,
                    false,
                ))
                .await
                .map_err(page_error)?;
            Ok(Box::new(CdpPage {
                id: context.inner().clone(),
                context,
                page,
                browser: Arc::clone(&self.inner),
                options: options.clone(),
            }))
        }

        async fn close(&self) -> VitrineResult<()> {
            let mut browser = self.inner.lock().await;
            let _ = browser.close().await.map_err(launch_error)?;
            self.handle.abort();
            Ok(())
        }
    }

    /// The single page of one CDP browser context
    #[derive(Debug)]
    struct CdpPage {
        id: String,
        context: BrowserContextId,
        page: Page,
        browser: Arc<Mutex<Browser>>,
        options: ContextOptions,
    }

    /// Script resolving `selector` and binding the element at `index` to `el`
    fn bind_element(selector: &Selector, index: usize) -> String {
        format!(
            "const el = ({})[{index}]; if (!el) {{ throw new Error('element detached'); }}",
            selector.to_query_all()
        )
    }

    fn js_string(value: &str) -> VitrineResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    const SNAPSHOT_SCRIPT: &str = r"els.map(el => {
        const style = window.getComputedStyle(el);
        const rect = el.getBoundingClientRect();
        const visible = style.visibility !== 'hidden' && style.display !== 'none'
            && (rect.width > 0 || rect.height > 0);
        const attributes = {};
        for (const attr of el.attributes) { attributes[attr.name] = attr.value; }
        return {
            tag: el.tagName.toLowerCase(),
            text: (el.innerText ?? el.textContent ?? '').trim(),
            visible,
            enabled: !el.disabled,
            value: ('value' in el) ? String(el.value) : null,
            attributes,
        };
    })";

    impl CdpPage {
        async fn run(&self, script: String) -> VitrineResult<serde_json::Value> {
            let result = self
                .page
                .evaluate(format!("(() => {{ {script} }})()"))
                .await
                .map_err(page_error)?;
            result.into_value().map_err(page_error)
        }

        async fn act(&self, script: String) -> VitrineResult<()> {
            let _ = self.run(script).await?;
            if !self.options.slow_mo.is_zero() {
                tokio::time::sleep(self.options.slow_mo).await;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PageDriver for CdpPage {
        fn context_id(&self) -> &str {
            &self.id
        }

        async fn navigate(&self, url: &str) -> VitrineResult<()> {
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| VitrineError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> VitrineResult<String> {
            Ok(self.page.url().await.map_err(page_error)?.unwrap_or_default())
        }

        async fn title(&self) -> VitrineResult<String> {
            Ok(self
                .page
                .get_title()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn query(&self, selector: &Selector) -> VitrineResult<Vec<ElementSnapshot>> {
            let value = self
                .run(format!(
                    "const els = {}; return {SNAPSHOT_SCRIPT};",
                    selector.to_query_all()
                ))
                .await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn click(&self, selector: &Selector, index: usize) -> VitrineResult<()> {
            self.act(format!(
                "{} el.scrollIntoView({{block: 'center'}}); el.click(); return true;",
                bind_element(selector, index)
            ))
            .await
        }

        async fn fill(&self, selector: &Selector, index: usize, text: &str) -> VitrineResult<()> {
            // React inputs only notice values set through the native setter
            self.act(format!(
                "{} el.focus(); \
                 const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                 Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {}); \
                 el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                 el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                 return true;",
                bind_element(selector, index),
                js_string(text)?
            ))
            .await
        }

        async fn select_option(
            &self,
            selector: &Selector,
            index: usize,
            value: &str,
        ) -> VitrineResult<()> {
            self.act(format!(
                "{} Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set.call(el, {}); \
                 el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                 return true;",
                bind_element(selector, index),
                js_string(value)?
            ))
            .await
        }

        async fn press(&self, selector: &Selector, index: usize, key: &str) -> VitrineResult<()> {
            self.act(format!("{} el.focus(); return true;", bind_element(selector, index)))
                .await?;
            let text = if key == "Enter" { "\r" } else { key };
            for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
                let mut event = DispatchKeyEventParams::builder().r#type(kind.clone()).key(key);
                if kind == DispatchKeyEventType::KeyDown && text.chars().count() == 1 {
                    event = event.text(text);
                }
                let params = event.build().map_err(page_error)?;
                let _ = self.page.execute(params).await.map_err(page_error)?;
            }
            Ok(())
        }

        async fn go_back(&self) -> VitrineResult<()> {
            self.act("history.back(); return true;".to_string()).await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }

        async fn reload(&self) -> VitrineResult<()> {
            let _ = self.page.reload().await.map_err(page_error)?;
            Ok(())
        }

        async fn screenshot(&self) -> VitrineResult<Screenshot> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let screenshot = self
                .page
                .execute(params)
                .await
                .map_err(|e| VitrineError::ScreenshotError {
                    message: e.to_string(),
                })?;

            use base64::Engine;
            let data = base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| VitrineError::ScreenshotError {
                    message: e.to_string(),
                })?;
            Ok(Screenshot::new(
                data,
                self.options.viewport.width,
                self.options.viewport.height,
            ))
        }

        async fn close(&self) -> VitrineResult<()> {
            let close = async { self.page.clone().close().await.map_err(page_error) };
            let dispose = async {
                let browser = self.browser.lock().await;
                browser
                    .execute(DisposeBrowserContextParams::new(self.context.clone()))
                    .await
                    .map(drop)
                    .map_err(page_error)
            };
            super::close_then_dispose(close, dispose).await
        }
    }
}
