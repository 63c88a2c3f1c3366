//! Chromium backend
//!
//! Implements the [`Page`] contract on top of chromiumoxide / CDP. Launches
//! a Chromium instance, spawns the event handler task, and exposes
//! coordinate-based input the tools need.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::browser::page::Page;
use crate::core::config::BrowserConfig;
use crate::core::{Result, WebpilotError};

/// A launched Chromium instance owning its CDP event loop.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    handler_task: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch Chromium with the given configuration.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = CdpBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cdp_config = builder
            .build()
            .map_err(|e| WebpilotError::browser(format!("Browser launch failed: {}", e)))?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| WebpilotError::browser(format!("Browser launch failed: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a new page navigated to the given URL.
    pub async fn new_page(&self, url: &str) -> Result<ChromiumPage> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| WebpilotError::browser(format!("Navigation failed: {}", e)))?;
        Ok(ChromiumPage { inner: page })
    }

    /// Close the browser and stop the event loop.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| WebpilotError::browser(format!("Browser close failed: {}", e)))?;
        self.handler_task.abort();
        Ok(())
    }
}

/// A single Chromium tab implementing the agent's page contract.
pub struct ChromiumPage {
    inner: CdpPage,
}

impl ChromiumPage {
    /// Returns a reference to the underlying chromiumoxide page.
    pub fn inner(&self) -> &CdpPage {
        &self.inner
    }

    async fn dispatch_mouse(&self, params: DispatchMouseEventParams) -> Result<()> {
        self.inner
            .execute(params)
            .await
            .map_err(|e| WebpilotError::browser(format!("Mouse event failed: {}", e)))?;
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .text("\r")
            .build()
            .map_err(WebpilotError::browser)?;
        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .build()
            .map_err(WebpilotError::browser)?;

        self.inner
            .execute(down)
            .await
            .map_err(|e| WebpilotError::browser(format!("Key event failed: {}", e)))?;
        self.inner
            .execute(up)
            .await
            .map_err(|e| WebpilotError::browser(format!("Key event failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| WebpilotError::browser(format!("JavaScript error: {}", e)))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.inner
            .screenshot(params)
            .await
            .map_err(|e| WebpilotError::browser(format!("Screenshot failed: {}", e)))
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        let press = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MousePressed)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(WebpilotError::browser)?;
        let release = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseReleased)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(WebpilotError::browser)?;

        self.dispatch_mouse(press).await?;
        self.dispatch_mouse(release).await
    }

    async fn type_at(&self, x: f64, y: f64, text: &str) -> Result<()> {
        self.click_at(x, y).await?;

        // Clear whatever the field currently holds before inserting.
        self.evaluate(
            r#"(() => {
                const el = document.activeElement;
                if (el && "value" in el) {
                    el.value = "";
                    el.dispatchEvent(new Event("input", { bubbles: true }));
                }
            })()"#,
        )
        .await?;

        for c in text.chars() {
            let params = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::Char)
                .text(c.to_string())
                .build()
                .map_err(WebpilotError::browser)?;
            self.inner
                .execute(params)
                .await
                .map_err(|e| WebpilotError::browser(format!("Text input failed: {}", e)))?;
        }

        self.press_enter().await
    }

    async fn scroll_window(&self, delta_y: i64) -> Result<()> {
        self.evaluate(&format!("window.scrollBy(0, {})", delta_y))
            .await?;
        Ok(())
    }

    async fn scroll_at(&self, x: f64, y: f64, delta_y: i64) -> Result<()> {
        let wheel = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(x)
            .y(y)
            .delta_x(0.0)
            .delta_y(delta_y as f64)
            .build()
            .map_err(WebpilotError::browser)?;
        self.dispatch_mouse(wheel).await
    }

    async fn go_back(&self) -> Result<()> {
        self.evaluate("window.history.back()").await?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| WebpilotError::browser(format!("Navigation failed: {}", e)))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| WebpilotError::browser(format!("Navigation failed: {}", e)))?
            .ok_or_else(|| WebpilotError::browser("No URL found"))
    }
}
