//! Tool registry - dispatches parsed actions to browser operations
//!
//! Each tool is a function of the page, the current grounding data, and the
//! raw argument list, returning a textual observation. Tools never fail the
//! turn: invalid indices, missing arguments, and browser errors all come
//! back as descriptive observations the model can read and correct on the
//! next turn.

use std::time::Duration;

use crate::agent::parser::ToolKind;
use crate::browser::Page;
use crate::core::config::ToolsConfig;
use crate::core::BoundingBox;

/// Registry of the browser tools available to the agent.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    wait: Duration,
    window_scroll_px: i64,
    element_scroll_px: i64,
    search_url: String,
}

impl ToolRegistry {
    /// Create a registry from tool configuration
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            wait: Duration::from_secs(config.wait_secs),
            window_scroll_px: config.window_scroll_px,
            element_scroll_px: config.element_scroll_px,
            search_url: config.search_url.clone(),
        }
    }

    /// Execute one tool against the current page and grounding data.
    ///
    /// The match is exhaustive over [`ToolKind`], so every action the parser
    /// can produce has a handler.
    pub async fn dispatch(
        &self,
        tool: ToolKind,
        args: &[String],
        page: &dyn Page,
        bboxes: &[BoundingBox],
    ) -> String {
        match tool {
            ToolKind::Click => self.click(args, page, bboxes).await,
            ToolKind::Type => self.type_text(args, page, bboxes).await,
            ToolKind::Scroll => self.scroll(args, page, bboxes).await,
            ToolKind::Wait => self.wait().await,
            ToolKind::GoBack => self.go_back(page).await,
            ToolKind::Google => self.google(page).await,
        }
    }

    /// Resolve an argument into the current grounding list.
    fn resolve_bbox<'a>(
        raw: &str,
        bboxes: &'a [BoundingBox],
    ) -> Result<(usize, &'a BoundingBox), String> {
        let index: usize = raw
            .trim()
            .parse()
            .map_err(|_| format!("Error: '{}' is not a bounding box index.", raw))?;
        match bboxes.get(index) {
            Some(bbox) => Ok((index, bbox)),
            None => Err(format!("Error: no bounding box with index {}.", index)),
        }
    }

    async fn click(&self, args: &[String], page: &dyn Page, bboxes: &[BoundingBox]) -> String {
        let Some(raw) = args.first() else {
            return "Error: no bounding box index given to Click.".to_string();
        };
        let (index, bbox) = match Self::resolve_bbox(raw, bboxes) {
            Ok(found) => found,
            Err(observation) => return observation,
        };
        match page.click_at(bbox.x, bbox.y).await {
            Ok(()) => format!("Clicked {}", index),
            Err(e) => format!("Error: failed to click {}: {}", index, e),
        }
    }

    async fn type_text(&self, args: &[String], page: &dyn Page, bboxes: &[BoundingBox]) -> String {
        let (Some(raw), Some(text)) = (args.first(), args.get(1)) else {
            return "Error: Type needs a bounding box index and text.".to_string();
        };
        let (index, bbox) = match Self::resolve_bbox(raw, bboxes) {
            Ok(found) => found,
            Err(observation) => return observation,
        };
        match page.type_at(bbox.x, bbox.y, text).await {
            Ok(()) => format!("Typed {} and submitted", text),
            Err(e) => format!("Error: failed to type into {}: {}", index, e),
        }
    }

    async fn scroll(&self, args: &[String], page: &dyn Page, bboxes: &[BoundingBox]) -> String {
        let (Some(target), Some(direction)) = (args.first(), args.get(1)) else {
            return "Error: Scroll needs a target and a direction.".to_string();
        };

        let sign = match direction.trim() {
            "down" => 1,
            "up" => -1,
            other => {
                return format!("Error: unknown scroll direction '{}'; use up or down.", other)
            }
        };

        if target.trim().eq_ignore_ascii_case("WINDOW") {
            return match page.scroll_window(sign * self.window_scroll_px).await {
                Ok(()) => format!("Scrolled {} in window", direction.trim()),
                Err(e) => format!("Error: failed to scroll window: {}", e),
            };
        }

        let (index, bbox) = match Self::resolve_bbox(target, bboxes) {
            Ok(found) => found,
            Err(observation) => return observation,
        };
        match page
            .scroll_at(bbox.x, bbox.y, sign * self.element_scroll_px)
            .await
        {
            Ok(()) => format!("Scrolled {} in element {}", direction.trim(), index),
            Err(e) => format!("Error: failed to scroll element {}: {}", index, e),
        }
    }

    async fn wait(&self) -> String {
        tokio::time::sleep(self.wait).await;
        format!("Waited for {}s.", self.wait.as_secs())
    }

    async fn go_back(&self, page: &dyn Page) -> String {
        if let Err(e) = page.go_back().await {
            return format!("Error: failed to navigate back: {}", e);
        }
        let url = page.current_url().await.unwrap_or_default();
        format!("Navigated back a page to {}.", url)
    }

    async fn google(&self, page: &dyn Page) -> String {
        match page.goto(&self.search_url).await {
            Ok(()) => "Navigated to google.com.".to_string(),
            Err(e) => format!("Error: failed to navigate to google.com: {}", e),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::core::{Result, WebpilotError};

    /// Records invocations; navigation calls can be made to fail.
    #[derive(Default)]
    struct RecordingPage {
        clicks: Mutex<Vec<(f64, f64)>>,
        typed: Mutex<Vec<String>>,
        scrolls: Mutex<Vec<i64>>,
        gotos: Mutex<Vec<String>>,
        fail_navigation: bool,
    }

    #[async_trait]
    impl Page for RecordingPage {
        async fn evaluate(&self, _script: &str) -> Result<Value> {
            Ok(Value::Null)
        }
        async fn screenshot(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn click_at(&self, x: f64, y: f64) -> Result<()> {
            self.clicks.lock().unwrap().push((x, y));
            Ok(())
        }
        async fn type_at(&self, _x: f64, _y: f64, text: &str) -> Result<()> {
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }
        async fn scroll_window(&self, delta_y: i64) -> Result<()> {
            self.scrolls.lock().unwrap().push(delta_y);
            Ok(())
        }
        async fn scroll_at(&self, _x: f64, _y: f64, delta_y: i64) -> Result<()> {
            self.scrolls.lock().unwrap().push(delta_y);
            Ok(())
        }
        async fn go_back(&self) -> Result<()> {
            if self.fail_navigation {
                return Err(WebpilotError::browser("history is empty"));
            }
            Ok(())
        }
        async fn goto(&self, url: &str) -> Result<()> {
            if self.fail_navigation {
                return Err(WebpilotError::browser("net::ERR_NAME_NOT_RESOLVED"));
            }
            self.gotos.lock().unwrap().push(url.to_string());
            Ok(())
        }
        async fn current_url(&self) -> Result<String> {
            Ok("https://example.com/".to_string())
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::from_config(&ToolsConfig {
            wait_secs: 0,
            ..Default::default()
        })
    }

    fn bboxes() -> Vec<BoundingBox> {
        vec![BoundingBox {
            x: 100.0,
            y: 200.0,
            element_type: Some("button".into()),
            text: Some("Go".into()),
            aria_label: None,
        }]
    }

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_click_resolves_coordinates() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Click, &args(&["0"]), &page, &bboxes())
            .await;
        assert_eq!(obs, "Clicked 0");
        assert_eq!(page.clicks.lock().unwrap()[0], (100.0, 200.0));
    }

    #[tokio::test]
    async fn test_click_out_of_range_is_an_observation() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Click, &args(&["7"]), &page, &bboxes())
            .await;
        assert_eq!(obs, "Error: no bounding box with index 7.");
        assert!(page.clicks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_non_numeric_index() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Click, &args(&["first"]), &page, &bboxes())
            .await;
        assert_eq!(obs, "Error: 'first' is not a bounding box index.");
    }

    #[tokio::test]
    async fn test_type_echoes_text() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Type, &args(&["0", "hello world"]), &page, &bboxes())
            .await;
        assert_eq!(obs, "Typed hello world and submitted");
        assert_eq!(page.typed.lock().unwrap()[0], "hello world");
    }

    #[tokio::test]
    async fn test_type_missing_text_is_an_observation() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Type, &args(&["0"]), &page, &bboxes())
            .await;
        assert!(obs.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_scroll_window_down() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Scroll, &args(&["WINDOW", "down"]), &page, &[])
            .await;
        assert_eq!(obs, "Scrolled down in window");
        assert_eq!(page.scrolls.lock().unwrap()[0], 500);
    }

    #[tokio::test]
    async fn test_scroll_element_up() {
        let page = RecordingPage::default();
        let obs = registry()
            .dispatch(ToolKind::Scroll, &args(&["0", "up"]), &page, &bboxes())
            .await;
        assert_eq!(obs, "Scrolled up in element 0");
        assert_eq!(page.scrolls.lock().unwrap()[0], -200);
    }

    #[tokio::test]
    async fn test_wait_reports_duration() {
        let page = RecordingPage::default();
        let obs = registry().dispatch(ToolKind::Wait, &[], &page, &[]).await;
        assert_eq!(obs, "Waited for 0s.");
    }

    #[tokio::test]
    async fn test_go_back_reports_url() {
        let page = RecordingPage::default();
        let obs = registry().dispatch(ToolKind::GoBack, &[], &page, &[]).await;
        assert_eq!(obs, "Navigated back a page to https://example.com/.");
    }

    #[tokio::test]
    async fn test_navigation_failure_is_an_observation() {
        let page = RecordingPage {
            fail_navigation: true,
            ..Default::default()
        };
        let obs = registry().dispatch(ToolKind::Google, &[], &page, &[]).await;
        assert!(obs.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_google_navigates_to_search_url() {
        let page = RecordingPage::default();
        let obs = registry().dispatch(ToolKind::Google, &[], &page, &[]).await;
        assert_eq!(obs, "Navigated to google.com.");
        assert_eq!(page.gotos.lock().unwrap()[0], "https://www.google.com/");
    }
}
