use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::automation::{Automation, Phase, RunOutcome};
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::traits::Collector;

/// 収集リクエスト
#[derive(Debug, Clone)]
pub struct CollectRequest {
    pub keywords: Vec<String>,
    pub min_price: u64,
    pub max_price: u64,
    pub max_pages: u32,
    pub headless: bool,
    pub export_path: PathBuf,
}

impl CollectRequest {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            min_price: 10,
            max_price: 100,
            max_pages: 2,
            headless: true,
            export_path: PathBuf::from("./exports"),
        }
    }

    pub fn with_price_range(mut self, min_price: u64, max_price: u64) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }
}

impl From<CollectRequest> for CollectorConfig {
    fn from(req: CollectRequest) -> Self {
        CollectorConfig::new(req.keywords)
            .with_price_range(req.min_price, req.max_price)
            .with_max_pages(req.max_pages)
            .with_headless(req.headless)
            .with_export_path(req.export_path)
    }
}

/// 収集結果
#[derive(Debug)]
pub struct CollectResult {
    /// 終了時のフェーズ
    pub phase: Phase,
    /// 収集したレコード数
    pub record_count: usize,
    /// 完走時に書き出したCSVのパス
    pub csv_path: Option<PathBuf>,
    /// CSVの内容（完走時のみ、それ以外は空）
    pub csv_content: Vec<u8>,
}

impl CollectResult {
    pub fn from_outcome(outcome: RunOutcome) -> std::io::Result<Self> {
        let csv_content = match &outcome.csv_path {
            Some(path) => std::fs::read(path)?,
            None => Vec::new(),
        };
        Ok(Self {
            phase: outcome.phase,
            record_count: outcome.record_count,
            csv_path: outcome.csv_path,
            csv_content,
        })
    }
}

/// tower::Serviceを実装した収集サービス
#[derive(Debug, Clone, Default)]
pub struct CollectorService {
    // 将来的な拡張用（レートリミット、キャッシュなど）
}

impl CollectorService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<CollectRequest> for CollectorService {
    type Response = CollectResult;
    type Error = CollectorError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CollectRequest) -> Self::Future {
        info!("収集リクエスト受信: {}キーワード", req.keywords.len());

        Box::pin(async move {
            let config: CollectorConfig = req.into();
            let mut automation = Automation::new(config);

            // 収集実行
            let outcome = automation.execute().await?;

            // 結果を作成
            let result = CollectResult::from_outcome(outcome)?;

            info!(
                "収集完了: phase={:?}, {}件, path={:?}",
                result.phase, result.record_count, result.csv_path
            );

            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_request_builder() {
        let req = CollectRequest::new(vec!["car".to_string()])
            .with_price_range(50, 500)
            .with_max_pages(3)
            .with_headless(false)
            .with_export_path("/tmp/out");

        assert_eq!(req.keywords, vec!["car".to_string()]);
        assert_eq!(req.min_price, 50);
        assert_eq!(req.max_price, 500);
        assert_eq!(req.max_pages, 3);
        assert!(!req.headless);
        assert_eq!(req.export_path, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_collect_request_to_config() {
        let req = CollectRequest::new(vec!["car".to_string()]).with_max_pages(4);
        let config: CollectorConfig = req.into();

        assert_eq!(config.keywords, vec!["car".to_string()]);
        assert_eq!(config.max_pages, 4);
    }
}
