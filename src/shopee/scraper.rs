//! Shopee 検索ページスクレイパー実装

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::checkpoint::RunState;
use crate::config::CollectorConfig;
use crate::error::CollectorError;

use super::extract::{self, RawCard};

/// スクロールの最大試行回数
const SCROLL_MAX_ROUNDS: u32 = 5;

/// Shopee 検索ページスクレイパー
///
/// ブラウザのライフサイクルと、現在表示中のページからの商品カード収集を担当する。
pub struct ShopeeScraper {
    config: CollectorConfig,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
}

impl ShopeeScraper {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
        }
    }

    fn get_page(&self) -> Result<&Arc<Page>, CollectorError> {
        self.page
            .as_ref()
            .ok_or_else(|| CollectorError::BrowserInit("ブラウザが初期化されていません".into()))
    }

    /// ブラウザを初期化
    pub async fn initialize(&mut self) -> Result<(), CollectorError> {
        info!("Initializing browser for shopee collector...");

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("shopee-collector-{}", unique_id));

        // Chrome パスを取得
        let chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .unwrap_or_else(|_| "chromium".to_string());

        // ブラウザ設定を構築
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&user_data_dir)
            .window_size(1280, 800);

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if self.config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| CollectorError::BrowserInit(e.to_string()))?;

        // ブラウザを起動
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CollectorError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        // 新しいページを作成
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CollectorError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));

        info!("Browser initialized successfully");
        Ok(())
    }

    /// 検索URLへフルページ遷移する
    pub async fn goto(&self, url: &str) -> Result<(), CollectorError> {
        let page = self.get_page()?;
        info!("Navigating to {}", url);

        page.goto(url)
            .await
            .map_err(|e| CollectorError::Navigation(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| CollectorError::Navigation(e.to_string()))?;

        Ok(())
    }

    /// 動的コンテンツの描画を待つ固定ディレイ
    pub async fn settle(&self) {
        debug!("Settling for {:?}", self.config.settle_delay);
        sleep(self.config.settle_delay).await;
    }

    /// 遅延ロードされる商品を出すため、ページ下端まで繰り返しスクロールする
    ///
    /// ページの高さが伸びなくなるか、上限回数に達したら打ち切って先頭へ戻る。
    pub async fn scroll_to_load_all(&self) -> Result<(), CollectorError> {
        let page = self.get_page()?;

        let mut last_height = self.page_height(page).await?;
        for round in 0..SCROLL_MAX_ROUNDS {
            page.evaluate("window.scrollTo(0, document.documentElement.scrollHeight)")
                .await
                .map_err(|e| CollectorError::JavaScript(e.to_string()))?;
            sleep(self.config.scroll_delay).await;

            let height = self.page_height(page).await?;
            if height == last_height {
                debug!("Page height stable after {} scroll rounds", round + 1);
                break;
            }
            last_height = height;
        }

        page.evaluate("window.scrollTo(0, 0)")
            .await
            .map_err(|e| CollectorError::JavaScript(e.to_string()))?;
        Ok(())
    }

    async fn page_height(&self, page: &Page) -> Result<i64, CollectorError> {
        let result = page
            .evaluate("document.documentElement.scrollHeight")
            .await
            .map_err(|e| CollectorError::JavaScript(e.to_string()))?;
        Ok(result.into_value::<i64>().unwrap_or(0))
    }

    /// 表示中のページから商品カードを収集し、`RunState` に追記する
    ///
    /// カードが1枚もないページはエラーではなく0件。追加した件数を返す。
    pub async fn collect_current_page(
        &self,
        state: &mut RunState,
        keyword: &str,
    ) -> Result<usize, CollectorError> {
        let page = self.get_page()?.clone();

        let script = extract::build_collect_script();
        let result = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| CollectorError::JavaScript(e.to_string()))?;

        let json_str = result.into_value::<String>().unwrap_or_default();
        let cards: Vec<RawCard> = serde_json::from_str(&json_str)
            .map_err(|e| CollectorError::Extraction(format!("カードデータ解析失敗: {}", e)))?;

        if cards.is_empty() {
            warn!(
                "No product cards found for keyword '{}' page {}",
                keyword,
                state.page + 1
            );
            self.debug_screenshot(&page).await;
        }

        let records = extract::records_from_cards(&cards, keyword, state.page);
        let count = state.append_records(records);

        info!(
            "Page {} of '{}' yielded {} products ({} cards seen)",
            state.page + 1,
            keyword,
            count,
            cards.len()
        );
        Ok(count)
    }

    /// デバッグモード時のみ、現在のページをdata URIとしてログに残す
    async fn debug_screenshot(&self, page: &Page) {
        if !self.config.debug {
            return;
        }

        if let Ok(screenshot) = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
            debug!("Empty page screenshot: data:image/png;base64,{}", encoded);
        }
    }

    /// ブラウザを終了
    pub async fn close(&mut self) -> Result<(), CollectorError> {
        // ページとブラウザの参照を解放
        self.page = None;
        self.browser = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_new() {
        let config = CollectorConfig::new(vec!["car".to_string()]);
        let scraper = ShopeeScraper::new(config);
        assert!(scraper.browser.is_none());
        assert!(scraper.page.is_none());
    }

    #[test]
    fn test_get_page_before_initialize() {
        let config = CollectorConfig::new(vec!["car".to_string()]);
        let scraper = ShopeeScraper::new(config);
        assert!(scraper.get_page().is_err());
    }
}
