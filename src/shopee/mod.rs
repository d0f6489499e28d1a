//! Shopee 検索ページモジュール
//!
//! 検索URLの組み立て、表示中ページからの商品カード抽出を担当する。

pub mod extract;
mod scraper;
pub mod types;
pub mod url;

pub use scraper::ShopeeScraper;
pub use types::ProductRecord;
pub use url::build_search_url;
