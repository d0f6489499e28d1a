//! 検索URL組み立て

use url::Url;

use crate::config::CollectorConfig;

/// 検索ページのベースURL
pub const SEARCH_BASE_URL: &str = "https://shopee.co.th/search";

/// 国内発送のみに絞る固定フィルタ
const LOCATIONS_FILTER: &str = "ภายในประเทศ";

/// キーワードとページ番号から検索URLを組み立てる
///
/// クエリパラメータの並びはサイト側の検索ページと同じ。
/// キーワードはここで一度だけパーセントエンコードされる。
pub fn build_search_url(config: &CollectorConfig, keyword: &str, page: u32) -> Url {
    // SEARCH_BASE_URL は定数なのでパースは失敗しない
    let mut url = Url::parse(SEARCH_BASE_URL).unwrap();

    url.query_pairs_mut()
        .append_pair("category", &config.category)
        .append_pair("keyword", keyword)
        .append_pair("maxPrice", &config.max_price.to_string())
        .append_pair("minPrice", &config.min_price.to_string())
        .append_pair("page", &page.to_string())
        .append_pair("locations", LOCATIONS_FILTER)
        .append_pair("noCorrection", "true")
        .append_pair("filters", "116");

    url
}
