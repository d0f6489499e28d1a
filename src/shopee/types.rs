//! Shopee 関連の型定義

use serde::{Deserialize, Serialize};

/// スクレイプした商品1件
///
/// 一度 `RunState` に追加した後は変更しない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// 検索キーワード
    pub keyword: String,
    /// ページ番号（0始まり）
    pub page: u32,
    /// ページ内の掲載順位（1始まり）
    pub rank: u32,
    /// 商品名
    pub name: String,
    /// 価格（バーツ、解析不能なら0）
    pub price: u64,
    /// 商品ページの絶対URL
    pub link: String,
}
