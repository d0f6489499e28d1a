//! ページネーションコントローラ
//!
//! 収集ランの状態機械。ページ送り・キーワード切り替え・完了判定を行い、
//! フルページ遷移の直前に必ずチェックポイントを保存する。遷移後（または
//! プロセス再起動後）はチェックポイントから自動再開する。

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::checkpoint::{CheckpointStore, RunState};
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::export;
use crate::shopee::{build_search_url, ShopeeScraper};
use crate::traits::Collector;

/// コントローラの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scraping,
    AwaitingNavigation,
    Completed,
    Stopped,
}

/// スクレイプ後の次アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// 同一キーワードの次ページへ
    NextPage,
    /// 次キーワードの先頭ページへ
    NextKeyword,
    /// ページもキーワードも残っていない
    Finished,
}

/// 現在の進行位置から次のアクションを決める（純粋関数）
pub fn plan_next(state: &RunState, config: &CollectorConfig) -> NextStep {
    if state.page + 1 < config.max_pages {
        NextStep::NextPage
    } else if state.keyword_index + 1 < config.keywords.len() {
        NextStep::NextKeyword
    } else {
        NextStep::Finished
    }
}

/// チェックポイントから再開すべきフェーズを決める
///
/// running かつ continuation のときだけ、startコマンドなしで Scraping に入る。
pub fn resume_phase(state: &RunState) -> Phase {
    if state.running && state.continuation {
        Phase::Scraping
    } else {
        Phase::Idle
    }
}

/// 協調的な停止ハンドル
///
/// 停止は次の判断ポイントで反映される。進行中のディレイと、その後に
/// 予定済みのスクレイプは中断されない。
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        info!("Stop requested");
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// ラン終了時の結果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// 終了時のフェーズ（Completed / Stopped / Idle）
    pub phase: Phase,
    /// 収集したレコード数
    pub record_count: usize,
    /// 完走時に書き出したCSVのパス
    pub csv_path: Option<PathBuf>,
}

/// 収集ランの実行コンテキスト
///
/// 設定・スクレイパー・チェックポイントストア・進行状態を1つに束ね、
/// グローバル状態を持たずにラン全体を駆動する。
pub struct Automation {
    config: CollectorConfig,
    scraper: ShopeeScraper,
    store: CheckpointStore,
    state: RunState,
    phase: Phase,
    stop: StopHandle,
}

impl Automation {
    pub fn new(config: CollectorConfig) -> Self {
        let store = CheckpointStore::new(&config.state_path);
        let scraper = ShopeeScraper::new(config.clone());
        Self {
            config,
            scraper,
            store,
            state: RunState::new(),
            phase: Phase::Idle,
            stop: StopHandle::new(),
        }
    }

    /// 停止用ハンドルを取得する
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn current_keyword(&self) -> Result<&str, CollectorError> {
        self.config
            .keywords
            .get(self.state.keyword_index)
            .map(String::as_str)
            .ok_or_else(|| {
                CollectorError::Checkpoint(format!(
                    "キーワード位置が範囲外です: {}",
                    self.state.keyword_index
                ))
            })
    }

    /// ランを開始する。チェックポイントが再開を示していれば続きから入る
    pub async fn start(&mut self) -> Result<RunOutcome, CollectorError> {
        if self.state.running {
            warn!("Run already in progress, ignoring start");
            return Ok(self.outcome(None));
        }

        self.config.validate()?;

        match self.store.load()? {
            Some(saved) if resume_phase(&saved) == Phase::Scraping => {
                info!(
                    "Resuming run from checkpoint: keyword_index={}, page={}, {} records so far",
                    saved.keyword_index,
                    saved.page,
                    saved.records.len()
                );
                self.state = saved;
            }
            _ => {
                info!(
                    "Starting new run: {} keywords, {} pages each",
                    self.config.keywords.len(),
                    self.config.max_pages
                );
                self.state = RunState::new();
                self.state.start();
                self.store.save(&self.state)?;
            }
        }

        // 現在位置の検索ページへ遷移してからループに入る
        let url = build_search_url(&self.config, self.current_keyword()?, self.state.page);
        self.phase = Phase::AwaitingNavigation;
        self.scraper.goto(url.as_str()).await?;

        self.run_loop().await
    }

    /// スクレイプ → 保存 → 判断 → 遷移 のループ
    async fn run_loop(&mut self) -> Result<RunOutcome, CollectorError> {
        loop {
            self.phase = Phase::Scraping;

            // ページ読み込み後の描画待ち
            self.scraper.settle().await;
            self.scraper.scroll_to_load_all().await?;

            let keyword = self.current_keyword()?.to_string();
            self.scraper
                .collect_current_page(&mut self.state, &keyword)
                .await?;
            self.store.save(&self.state)?;

            // 次の判断まで待つ
            sleep(self.config.step_delay).await;

            // 判断ポイント: 停止要求はここで反映される
            if self.stop.is_stopped() {
                self.state.stop();
                self.store.save(&self.state)?;
                self.phase = Phase::Stopped;
                info!(
                    "Run stopped: {} records collected so far",
                    self.state.records.len()
                );
                return Ok(self.outcome(None));
            }

            match plan_next(&self.state, &self.config) {
                NextStep::NextPage => {
                    self.state.advance_page();
                    self.handoff(&keyword).await?;
                }
                NextStep::NextKeyword => {
                    self.state.advance_keyword();
                    let next_keyword = self.current_keyword()?.to_string();
                    info!("Switching to keyword '{}'", next_keyword);
                    self.handoff(&next_keyword).await?;
                }
                NextStep::Finished => {
                    let csv_path = export::export_csv(&self.state.records, &self.config.export_path)?;
                    self.store.clear()?;
                    self.state.complete();
                    self.phase = Phase::Completed;
                    info!(
                        "Run completed: {} records exported to {:?}",
                        self.state.records.len(),
                        csv_path
                    );
                    return Ok(self.outcome(Some(csv_path)));
                }
            }
        }
    }

    /// 保存してからフルページ遷移する（persist-then-handoff）
    async fn handoff(&mut self, keyword: &str) -> Result<(), CollectorError> {
        self.store.save(&self.state)?;
        self.phase = Phase::AwaitingNavigation;
        let url = build_search_url(&self.config, keyword, self.state.page);
        self.scraper.goto(url.as_str()).await
    }

    fn outcome(&self, csv_path: Option<PathBuf>) -> RunOutcome {
        RunOutcome {
            phase: self.phase,
            record_count: self.state.records.len(),
            csv_path,
        }
    }
}

#[async_trait]
impl Collector for Automation {
    async fn initialize(&mut self) -> Result<(), CollectorError> {
        self.scraper.initialize().await
    }

    async fn run(&mut self) -> Result<RunOutcome, CollectorError> {
        self.start().await
    }

    async fn close(&mut self) -> Result<(), CollectorError> {
        self.scraper.close().await
    }
}
