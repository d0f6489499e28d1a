use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("商品データ抽出エラー: {0}")]
    Extraction(String),

    #[error("チェックポイントエラー: {0}")]
    Checkpoint(String),

    #[error("CSVエクスポートエラー: {0}")]
    Export(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}
