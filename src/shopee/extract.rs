//! 商品カード抽出
//!
//! ページ内で実行するJavaScriptがカードごとの生データを返し、
//! ここで正規化して `ProductRecord` に変換する。

use serde::Deserialize;
use tracing::warn;

use super::types::ProductRecord;

/// 商品ページの絶対URLプレフィックス
pub const SHOPEE_BASE_URL: &str = "https://shopee.co.th";

/// 商品カードのコンテナセレクタ
pub const CARD_SELECTOR: &str = r#"[data-sqe="item"]"#;

/// 商品名のセレクタ候補（先頭から順に試し、最初にマッチしたものを使う）
pub const NAME_SELECTORS: &[&str] = &[".line-clamp-2", r#"[data-sqe="name"]"#];

/// 商品リンクのセレクタ候補
pub const LINK_SELECTORS: &[&str] = &[r#"a[href*="/i."]"#, "a.contents"];

/// 価格のセレクタ候補
pub const PRICE_SELECTORS: &[&str] = &[".text-shopee-primary .text-base", r#"[class*="text-base"]"#];

/// 商品名が取得できなかった場合のフォールバック
const FALLBACK_NAME: &str = "未知商品";

/// ページ内抽出スクリプトが返すカード1枚分の生データ
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawCard {
    pub name: Option<String>,
    pub link: Option<String>,
    pub price: Option<String>,
    /// カード単位の抽出例外（あればこのカードはスキップ）
    pub error: Option<String>,
}

/// カード抽出スクリプトを生成する
///
/// 各フィールドはセレクタ候補を順に試し、最初に見つかった要素を使う。
/// カード単位の例外はcatchして error フィールドで返す。
pub fn build_collect_script() -> String {
    let name_selectors = selector_array(NAME_SELECTORS);
    let link_selectors = selector_array(LINK_SELECTORS);
    let price_selectors = selector_array(PRICE_SELECTORS);

    format!(
        r#"
        (() => {{
            const pick = (root, selectors) => {{
                for (const sel of selectors) {{
                    const el = root.querySelector(sel);
                    if (el) return el;
                }}
                return null;
            }};
            const cards = document.querySelectorAll({card});
            const out = [];
            cards.forEach((card) => {{
                try {{
                    const nameEl = pick(card, {names});
                    const linkEl = pick(card, {links});
                    const priceEl = pick(card, {prices});
                    out.push({{
                        name: nameEl ? nameEl.textContent : null,
                        link: linkEl ? linkEl.getAttribute('href') : null,
                        price: priceEl ? priceEl.textContent : null
                    }});
                }} catch (e) {{
                    out.push({{ error: String(e) }});
                }}
            }});
            return JSON.stringify(out);
        }})()
    "#,
        card = js_string(CARD_SELECTOR),
        names = name_selectors,
        links = link_selectors,
        prices = price_selectors,
    )
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}

fn selector_array(selectors: &[&str]) -> String {
    serde_json::to_string(selectors).unwrap_or_else(|_| "[]".to_string())
}

/// 価格テキストを正規化して整数にパースする
///
/// 数字以外（通貨記号、桁区切り等）をすべて除去する。パース不能は0。
pub fn parse_price(text: &str) -> u64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// 相対リンクをサイトの絶対URLに変換する
fn absolutize_link(link: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        format!("{}{}", SHOPEE_BASE_URL, link)
    }
}

/// カード1枚の生データを `ProductRecord` に変換する
///
/// 必須3フィールドのいずれかが欠けたカードは None（エラーではない）。
pub fn card_to_record(raw: &RawCard, keyword: &str, page: u32, rank: u32) -> Option<ProductRecord> {
    if let Some(err) = &raw.error {
        warn!("Card {} extraction failed: {}", rank, err);
        return None;
    }

    let name_text = raw.name.as_deref()?;
    let link = raw.link.as_deref()?;
    let price_text = raw.price.as_deref()?;

    let name = match name_text.trim() {
        "" => FALLBACK_NAME.to_string(),
        trimmed => trimmed.to_string(),
    };

    Some(ProductRecord {
        keyword: keyword.to_string(),
        page,
        rank,
        name,
        price: parse_price(price_text),
        link: absolutize_link(link),
    })
}

/// 1ページ分の生データをレコード列に変換する
///
/// 掲載順位はカードの出現位置（1始まり）。スキップされたカードの分は欠番になる。
pub fn records_from_cards(cards: &[RawCard], keyword: &str, page: u32) -> Vec<ProductRecord> {
    cards
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| card_to_record(raw, keyword, page, i as u32 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed(name: &str, link: &str, price: &str) -> RawCard {
        RawCard {
            name: Some(name.to_string()),
            link: Some(link.to_string()),
            price: Some(price.to_string()),
            error: None,
        }
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("฿1,234"), 1234);
        assert_eq!(parse_price("฿59"), 59);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("ราคาพิเศษ"), 0);
    }

    #[test]
    fn test_card_to_record_absolutizes_link() {
        let raw = well_formed("Toy Car", "/i.12345.67890", "฿99");
        let record = card_to_record(&raw, "car", 0, 1).unwrap();
        assert_eq!(record.link, "https://shopee.co.th/i.12345.67890");
        assert_eq!(record.price, 99);
        assert_eq!(record.rank, 1);
    }

    #[test]
    fn test_card_to_record_name_fallback() {
        let raw = well_formed("   ", "/i.1.2", "฿10");
        let record = card_to_record(&raw, "car", 0, 1).unwrap();
        assert_eq!(record.name, "未知商品");
    }

    #[test]
    fn test_malformed_cards_skipped() {
        let cards = vec![
            well_formed("A", "/i.1.1", "฿10"),
            // 価格なし
            RawCard {
                name: Some("B".to_string()),
                link: Some("/i.2.2".to_string()),
                ..Default::default()
            },
            well_formed("C", "/i.3.3", "฿30"),
            // リンクなし
            RawCard {
                name: Some("D".to_string()),
                price: Some("฿40".to_string()),
                ..Default::default()
            },
            // カード単位の例外
            RawCard {
                error: Some("TypeError".to_string()),
                ..Default::default()
            },
        ];

        let records = records_from_cards(&cards, "car", 1);
        assert_eq!(records.len(), 2);
        // 欠番ありの掲載順位
        assert_eq!(records[0].rank, 1);
        assert_eq!(records[1].rank, 3);
        assert!(records.iter().all(|r| r.keyword == "car" && r.page == 1));
    }

    #[test]
    fn test_collect_script_embeds_selectors() {
        let script = build_collect_script();
        assert!(script.contains(r#"data-sqe=\"item\""#));
        assert!(script.contains(".line-clamp-2"));
        assert!(script.contains("a.contents"));
        assert!(script.contains("JSON.stringify"));
    }
}
