//! 永続化されるラン状態（チェックポイント）
//!
//! ページ遷移をまたいで引き継がれる唯一の状態。遷移直前に必ず保存し、
//! 再開時に読み戻す。完走時にのみ削除される。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CollectorError;
use crate::shopee::types::ProductRecord;

/// チェックポイントの固定キー（ファイル名にもなる）
pub const CHECKPOINT_KEY: &str = "shopee_collector_state";

/// ランの進行状態
///
/// 不変条件: `running == false` のとき `continuation` も false。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// 現在のキーワード位置（0始まり）
    pub keyword_index: usize,
    /// 現在のページ番号（0始まり）
    pub page: u32,
    /// 収集済みレコード（追記のみ）
    pub records: Vec<ProductRecord>,
    /// ラン実行中フラグ（再入防止を兼ねる）
    pub running: bool,
    /// ページ遷移後に再開すべきことを示すフラグ
    pub continuation: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// ラン開始。遷移途中で中断しても再開できるよう continuation も立てる
    pub fn start(&mut self) {
        self.running = true;
        self.continuation = true;
    }

    /// 同一キーワードの次ページへ
    pub fn advance_page(&mut self) {
        self.page += 1;
        self.continuation = true;
    }

    /// 次のキーワードの先頭ページへ
    pub fn advance_keyword(&mut self) {
        self.keyword_index += 1;
        self.page = 0;
        self.continuation = true;
    }

    /// 明示停止。continuation も必ず落とす
    pub fn stop(&mut self) {
        self.running = false;
        self.continuation = false;
    }

    /// 完走
    pub fn complete(&mut self) {
        self.running = false;
        self.continuation = false;
    }

    /// 1ページ分のレコードを追記し、追加件数を返す
    pub fn append_records(&mut self, records: Vec<ProductRecord>) -> usize {
        let count = records.len();
        self.records.extend(records);
        count
    }

    /// 読み戻した状態の不変条件を正規化する
    fn normalize(mut self) -> Self {
        if !self.running {
            self.continuation = false;
        }
        self
    }
}

/// ファイルに1レコードを読み書きするチェックポイントストア
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// 保存先ディレクトリから作成する
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(format!("{}.json", CHECKPOINT_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// チェックポイントを読み込む。存在しなければ None
    pub fn load(&self) -> Result<Option<RunState>, CollectorError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)?;
        let state: RunState = serde_json::from_str(&json)
            .map_err(|e| CollectorError::Checkpoint(format!("チェックポイント解析失敗: {}", e)))?;

        debug!("Checkpoint loaded from {:?}", self.path);
        Ok(Some(state.normalize()))
    }

    /// 現在の状態を書き出す
    pub fn save(&self, state: &RunState) -> Result<(), CollectorError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| CollectorError::Checkpoint(format!("チェックポイント書式化失敗: {}", e)))?;
        std::fs::write(&self.path, json)?;

        debug!(
            "Checkpoint saved: keyword_index={}, page={}, records={}",
            state.keyword_index,
            state.page,
            state.records.len()
        );
        Ok(())
    }

    /// チェックポイントを削除する（完走時）
    pub fn clear(&self) -> Result<(), CollectorError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Checkpoint cleared: {:?}", self.path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> CheckpointStore {
        let dir = std::env::temp_dir().join(format!(
            "shopee-collector-test-{}-{}",
            tag,
            std::process::id()
        ));
        CheckpointStore::new(dir)
    }

    fn sample_record() -> ProductRecord {
        ProductRecord {
            keyword: "car".to_string(),
            page: 0,
            rank: 1,
            name: "Toy Car".to_string(),
            price: 59,
            link: "https://shopee.co.th/i.1.2".to_string(),
        }
    }

    #[test]
    fn test_save_load_clear_roundtrip() {
        let store = temp_store("roundtrip");

        assert!(store.load().unwrap().is_none());

        let mut state = RunState::new();
        state.start();
        state.advance_page();
        state.append_records(vec![sample_record()]);
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.page, 1);
        assert_eq!(loaded.records.len(), 1);
        assert!(loaded.running);
        assert!(loaded.continuation);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_normalizes_invariant() {
        let store = temp_store("normalize");

        // running=false なのに continuation=true な壊れた状態を書き込む
        let json = r#"{
            "keyword_index": 0,
            "page": 0,
            "records": [],
            "running": false,
            "continuation": true
        }"#;
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), json).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert!(!loaded.running);
        assert!(!loaded.continuation);

        store.clear().unwrap();
    }

    #[test]
    fn test_stop_clears_continuation() {
        let mut state = RunState::new();
        state.start();
        state.advance_page();
        assert!(state.continuation);

        state.stop();
        assert!(!state.running);
        assert!(!state.continuation);
    }

    #[test]
    fn test_advance_keyword_resets_page() {
        let mut state = RunState::new();
        state.start();
        state.advance_page();
        state.advance_keyword();
        assert_eq!(state.keyword_index, 1);
        assert_eq!(state.page, 0);
    }

    #[test]
    fn test_append_records_returns_count() {
        let mut state = RunState::new();
        let count = state.append_records(vec![sample_record(), sample_record()]);
        assert_eq!(count, 2);
        assert_eq!(state.records.len(), 2);
    }
}
