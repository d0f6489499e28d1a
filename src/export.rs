//! CSVエクスポート

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::CollectorError;
use crate::shopee::types::ProductRecord;

/// 固定ヘッダ行
const CSV_HEADER: [&str; 5] = ["商品关键词", "页码", "商品名称", "价格(฿)", "商品链接"];

/// Excel互換のためのUTF-8 BOM
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// エクスポートファイル名（日付入り）
pub fn export_filename(date: NaiveDate) -> String {
    format!("shopee_products_{}.csv", date.format("%Y-%m-%d"))
}

/// レコード列をBOM付きCSVバイト列にシリアライズする
///
/// 文字列フィールドは常にクォートし、埋め込みの二重引用符は二重化される。
/// 数値フィールドは素のまま。
pub fn csv_bytes(records: &[ProductRecord]) -> Result<Vec<u8>, CollectorError> {
    let mut buf = Vec::from(UTF8_BOM);

    {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::NonNumeric)
            .from_writer(&mut buf);

        writer
            .write_record(CSV_HEADER)
            .map_err(|e| CollectorError::Export(e.to_string()))?;

        for record in records {
            let page = record.page.to_string();
            let price = record.price.to_string();
            writer
                .write_record([
                    record.keyword.as_str(),
                    page.as_str(),
                    record.name.as_str(),
                    price.as_str(),
                    record.link.as_str(),
                ])
                .map_err(|e| CollectorError::Export(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| CollectorError::Export(e.to_string()))?;
    }

    Ok(buf)
}

/// 収集結果をCSVファイルとして書き出し、パスを返す
pub fn export_csv(
    records: &[ProductRecord],
    export_dir: &Path,
) -> Result<PathBuf, CollectorError> {
    std::fs::create_dir_all(export_dir)?;

    let path = export_dir.join(export_filename(Utc::now().date_naive()));
    let bytes = csv_bytes(records)?;
    std::fs::write(&path, &bytes)?;

    info!("CSVを書き出しました: {:?} ({}件)", path, records.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ProductRecord {
        ProductRecord {
            keyword: "car".to_string(),
            page: 0,
            rank: 1,
            name: name.to_string(),
            price: 1234,
            link: "https://shopee.co.th/i.1.2".to_string(),
        }
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let bytes = csv_bytes(&[record("Toy Car")]).unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("\"商品关键词\",\"页码\",\"商品名称\",\"价格(฿)\",\"商品链接\""));
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        let bytes = csv_bytes(&[record(r#"He said "hi""#)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""He said ""hi""""#));
    }

    #[test]
    fn test_numeric_fields_unquoted() {
        let bytes = csv_bytes(&[record("Toy Car")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""car",0,"Toy Car",1234,"https://shopee.co.th/i.1.2""#));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(export_filename(date), "shopee_products_2026-08-07.csv");
    }

    #[test]
    fn test_export_writes_file() {
        let dir = std::env::temp_dir().join(format!("shopee-export-test-{}", std::process::id()));
        let path = export_csv(&[record("Toy Car")], &dir).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
