use shopee_collector::{Automation, CheckpointStore, Collector, CollectorConfig};

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let keywords: Vec<String> = std::env::var("COLLECTOR_KEYWORDS")
        .expect("COLLECTOR_KEYWORDS environment variable not set")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let config = CollectorConfig::new(keywords).with_headless(false);

    println!("=== Shopee Collector Resume Test ===");

    // チェックポイントの有無を表示
    let store = CheckpointStore::new(&config.state_path);
    match store.load() {
        Ok(Some(state)) => {
            println!(
                "チェックポイント検出: keyword_index={}, page={}, {}件収集済み, running={}",
                state.keyword_index,
                state.page,
                state.records.len(),
                state.running
            );
        }
        Ok(None) => {
            println!("チェックポイントなし。新規ランとして開始します");
        }
        Err(e) => {
            eprintln!("チェックポイント読み込みエラー: {}", e);
            return;
        }
    }

    // running かつ continuation なら start コマンドなしで続きから再開される
    let mut automation = Automation::new(config);
    match automation.execute().await {
        Ok(outcome) => {
            println!(
                "終了: phase={:?}, {}件, CSV: {:?}",
                outcome.phase, outcome.record_count, outcome.csv_path
            );
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
        }
    }
}
