//! Shopee商品リスト収集ライブラリ
//!
//! - キーワード×ページの組み合わせを巡回して商品カードをスクレイプ
//! - 進行状態をチェックポイントとして永続化（ページ遷移・再起動をまたいで再開）
//! - 収集結果をBOM付きUTF-8 CSVとしてエクスポート
//!
//! # サービス経由の使用例
//!
//! ```rust,ignore
//! use shopee_collector::{CollectorService, CollectRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = CollectorService::new();
//!
//!     let request = CollectRequest::new(vec!["car".into(), "phone".into()])
//!         .with_price_range(10, 100)
//!         .with_max_pages(2);
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("CSV exported: {:?}", result.csv_path);
//! }
//! ```
//!
//! # コントローラ直接駆動の使用例
//!
//! ```rust,ignore
//! use shopee_collector::{Automation, Collector, CollectorConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CollectorConfig::new(vec!["watch".into()]);
//!     let mut automation = Automation::new(config);
//!
//!     // 別タスクから停止できる
//!     let stop = automation.stop_handle();
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.ok();
//!         stop.stop();
//!     });
//!
//!     let outcome = automation.execute().await.unwrap();
//!     println!("{} records, phase {:?}", outcome.record_count, outcome.phase);
//! }
//! ```

pub mod automation;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod export;
pub mod service;
pub mod shopee;
pub mod traits;

// 主要な型をリエクスポート
pub use automation::{Automation, NextStep, Phase, RunOutcome, StopHandle};
pub use checkpoint::{CheckpointStore, RunState};
pub use config::CollectorConfig;
pub use error::CollectorError;
pub use service::{CollectRequest, CollectResult, CollectorService};
pub use shopee::{ProductRecord, ShopeeScraper};
pub use traits::Collector;
