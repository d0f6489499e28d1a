use std::path::PathBuf;
use std::time::Duration;

use crate::error::CollectorError;

/// 収集ランの設定（実行中は不変）
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 検索キーワードのリスト（順序どおりに処理）
    pub keywords: Vec<String>,
    /// 価格下限（バーツ）
    pub min_price: u64,
    /// 価格上限（バーツ）
    pub max_price: u64,
    /// 検索カテゴリID
    pub category: String,
    /// キーワードごとの最大ページ数
    pub max_pages: u32,
    /// スクレイプ前の描画待機
    pub settle_delay: Duration,
    /// ページ遷移判断までの待機
    pub step_delay: Duration,
    /// スクロール1回ごとの待機
    pub scroll_delay: Duration,
    /// ヘッドレスモード
    pub headless: bool,
    /// デバッグモード（空ページ時にスクリーンショットをログ出力）
    pub debug: bool,
    /// CSV出力先ディレクトリ
    pub export_path: PathBuf,
    /// チェックポイント保存先ディレクトリ
    pub state_path: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            min_price: 10,
            max_price: 100,
            category: "11044964".to_string(),
            max_pages: 2,
            settle_delay: Duration::from_secs(2),
            step_delay: Duration::from_secs(3),
            scroll_delay: Duration::from_secs(1),
            headless: true,
            debug: false,
            export_path: PathBuf::from("./exports"),
            state_path: PathBuf::from("./data"),
        }
    }
}

impl CollectorConfig {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            ..Default::default()
        }
    }

    pub fn with_price_range(mut self, min_price: u64, max_price: u64) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
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

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// ラン開始前の設定チェック
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.keywords.is_empty() {
            return Err(CollectorError::Config("キーワードが指定されていません".into()));
        }
        if self.min_price > self.max_price {
            return Err(CollectorError::Config(format!(
                "価格範囲が不正です: min={} > max={}",
                self.min_price, self.max_price
            )));
        }
        if self.max_pages == 0 {
            return Err(CollectorError::Config("最大ページ数は1以上が必要です".into()));
        }
        Ok(())
    }
}
