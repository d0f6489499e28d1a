use async_trait::async_trait;

use crate::automation::RunOutcome;
use crate::error::CollectorError;

#[async_trait]
pub trait Collector: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), CollectorError>;

    /// 収集ランを完了または停止まで駆動する
    async fn run(&mut self) -> Result<RunOutcome, CollectorError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), CollectorError>;

    /// 一括実行（initialize → run → close）
    async fn execute(&mut self) -> Result<RunOutcome, CollectorError> {
        self.initialize().await?;
        let outcome = self.run().await?;
        self.close().await?;
        Ok(outcome)
    }
}
