//! Integration tests for document reconstruction.

use std::io::Write;

use unform::error::{Error, Result};
use unform::model::{BBox, Shape, Value};
use unform::parser::{
    FoundTable, LayoutOracle, RecordedDocument, RecordedLayout, RecordedPage, TableHeader,
    TableStrategy, TextBlock,
};
use unform::{reconstruct_bytes, reconstruct_file, ReconstructOptions, Reconstructor, Unform};

fn cells(row: &[&str]) -> Vec<String> {
    row.iter().map(|c| c.to_string()).collect()
}

fn block(y0: f32, y1: f32, text: &str) -> TextBlock {
    TextBlock {
        bbox: BBox::new(0.0, y0, 400.0, y1),
        text: text.to_string(),
    }
}

fn outer_table(y1: f32, names: &[&str]) -> FoundTable {
    FoundTable {
        bbox: BBox::new(0.0, 0.0, 400.0, y1),
        column_count: names.len(),
        header: Some(TableHeader {
            bbox: BBox::new(0.0, 0.0, 400.0, 20.0),
            names: cells(names),
        }),
        rows: Vec::new(),
        strategy: None,
    }
}

fn inner_table(y0: f32, y1: f32, rows: &[&[&str]]) -> FoundTable {
    let rows: Vec<Vec<String>> = rows.iter().map(|r| cells(r)).collect();
    FoundTable {
        bbox: BBox::new(20.0, y0, 380.0, y1),
        column_count: rows.first().map_or(0, Vec::len),
        header: Some(TableHeader {
            bbox: BBox::new(20.0, y0, 380.0, y0 + 10.0),
            names: rows.first().cloned().unwrap_or_default(),
        }),
        rows,
        strategy: None,
    }
}

fn encode(doc: &RecordedDocument) -> Vec<u8> {
    serde_json::to_vec(doc).unwrap()
}

/// A purchase order whose line-item table spills onto a second page.
fn spilled_purchase_order() -> RecordedDocument {
    RecordedDocument {
        markdown: [
            "**Purchase Order**\nPO-2024-050\n",
            "[TAB]\n",
            "##0;0;400;200##\n",
            "|PO|Qty|\n|4500|3|\n||Item Desc Price<br>A1 Bolt 1.00<br>B1 Nut 2.00|\n",
            "-----\n",
            "##0;0;400;100##\n",
            "|PO|Qty|\n||Item Desc Price|\n||C1 Pin 3.00<br>D1 Cap 4.00<br>E1 Rod 5.00|\n",
        ]
        .concat(),
        pages: vec![
            RecordedPage {
                text_blocks: vec![block(2.0, 18.0, "PO\nQty"), block(22.0, 38.0, "4500\n3")],
                tables: vec![
                    outer_table(200.0, &["PO", "Qty"]),
                    inner_table(
                        40.0,
                        190.0,
                        &[
                            &["Item", "Desc", "Price"],
                            &["A1", "Bolt", "1.00"],
                            &["B1", "Nut", "2.00"],
                        ],
                    ),
                ],
            },
            RecordedPage {
                text_blocks: vec![block(2.0, 18.0, "PO\nQty"), block(92.0, 98.0, "Page 2 of 2")],
                tables: vec![
                    outer_table(100.0, &["PO", "Qty"]),
                    inner_table(
                        20.0,
                        90.0,
                        &[
                            &["Item", "Desc", "Price"],
                            &["C1", "Pin", "3.00"],
                            &["D1", "Cap", "4.00"],
                            &["E1", "Rod", "5.00"],
                        ],
                    ),
                ],
            },
        ],
    }
}

/// Oracle that opens recorded layouts but cannot read text blocks.
struct NoTextOracle;

impl LayoutOracle for NoTextOracle {
    type Document = RecordedDocument;

    fn open_document(&self, bytes: &[u8]) -> Result<RecordedDocument> {
        RecordedLayout::new().open_document(bytes)
    }

    fn page_count(&self, doc: &RecordedDocument) -> usize {
        RecordedLayout::new().page_count(doc)
    }

    fn to_markdown(&self, doc: &RecordedDocument) -> Result<String> {
        RecordedLayout::new().to_markdown(doc)
    }

    fn text_blocks(&self, _doc: &RecordedDocument, page: usize, _clip: BBox) -> Result<Vec<TextBlock>> {
        Err(Error::Oracle(format!("text extraction unavailable on page {}", page)))
    }

    fn find_tables(
        &self,
        doc: &RecordedDocument,
        page: usize,
        clip: BBox,
        strategy: TableStrategy,
    ) -> Result<Vec<FoundTable>> {
        RecordedLayout::new().find_tables(doc, page, clip, strategy)
    }
}

#[test]
fn test_single_pair_is_header_value() {
    let doc = RecordedDocument {
        markdown: "##0;0;200;40##\n|Code|Value|\n|---|---|\n|ZIP|95124|\n".to_string(),
        pages: vec![RecordedPage::default()],
    };
    let result = reconstruct_bytes(&encode(&doc), "zip.pdf").unwrap();

    assert_eq!(result.main_json.len(), 1);
    let table = result.main_json[0].as_table().unwrap();
    assert_eq!(table.shape, Shape::HeaderValue);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].get("Code"), Some(&Value::from("ZIP")));
    assert_eq!(table.rows[0].get("Value"), Some(&Value::from("95124")));
}

#[test]
fn test_meta_header_fields_survive_normalization() {
    let doc = RecordedDocument {
        markdown: "##0;0;400;120##\n|Total: $309.75;shipping: 50|\n|Item|Qty|\n|Bolt|4|\n|Nut|8|\n"
            .to_string(),
        pages: vec![RecordedPage::default()],
    };
    let result = Unform::new().reconstruct(&encode(&doc), "po.pdf").unwrap();
    let table = result.document.main_json[0].as_table().unwrap();

    assert_eq!(table.shape, Shape::MetaHeader);
    assert_eq!(table.meta_headers.as_deref(), Some("Total: $309.75;shipping: 50"));
    assert_eq!(table.fields.get("total"), Some(&Value::Float(309.75)));
    assert_eq!(table.fields.get("shipping"), Some(&Value::Integer(50)));
    assert_eq!(table.rows[1].get("Qty"), Some(&Value::Integer(8)));
}

#[test]
fn test_nested_table_continues_across_pages() {
    let bytes = encode(&spilled_purchase_order());
    let result = reconstruct_bytes(&bytes, "po.pdf").unwrap();

    assert_eq!(result.main_json.len(), 2);
    assert!(result.main_json[0].as_text().is_some());

    let table = result.main_json[1].as_table().unwrap();
    assert_eq!(table.shape, Shape::Nested);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].get("PO"), Some(&Value::from("4500")));

    let inner = table.rows[0].inner().unwrap();
    assert_eq!(inner.len(), 5);
    assert_eq!(inner[0].get("Item"), Some(&Value::from("A1")));
    assert_eq!(inner[4].get("Desc"), Some(&Value::from("Rod")));

    assert_eq!(result.stats.page_count, 2);
    assert_eq!(result.stats.table_count, 2);
    assert_eq!(result.stats.merged_count, 1);
    assert_eq!(result.stats.degraded_count, 0);
}

#[test]
fn test_nested_tables_stay_apart_without_merging() {
    let bytes = encode(&spilled_purchase_order());
    let options = ReconstructOptions::new().with_page_merging(false);
    let oracle = RecordedLayout::new();
    let result = Reconstructor::with_options(&oracle, options)
        .reconstruct(&bytes, "po.pdf")
        .unwrap();

    assert_eq!(result.main_json.len(), 3);
    let first = result.main_json[1].as_table().unwrap();
    assert_eq!(first.rows[0].inner().unwrap().len(), 2);
    let second = result.main_json[2].as_table().unwrap();
    assert!(second.rows[0].is_blank_under(&["PO", "Qty"]));
    assert_eq!(second.rows[0].inner().unwrap().len(), 3);
}

#[test]
fn test_nested_table_degrades_when_oracle_fails() {
    let doc = RecordedDocument {
        markdown: concat!(
            "##0;0;400;200##\n",
            "|PO|Qty|Date|\n",
            "|4500|3|1/1/2024|\n",
            "|Item|Desc|\n",
            "|A1|Bolt|\n",
            "|B1|Nut|\n",
            "|4501|1|1/2/2024|\n",
        )
        .to_string(),
        pages: vec![RecordedPage {
            text_blocks: Vec::new(),
            tables: vec![
                outer_table(200.0, &["PO", "Qty", "Date"]),
                inner_table(40.0, 100.0, &[&["Item", "Desc"], &["A1", "Bolt"], &["B1", "Nut"]]),
            ],
        }],
    };

    let oracle = NoTextOracle;
    let result = Reconstructor::new(&oracle)
        .reconstruct(&encode(&doc), "po.pdf")
        .unwrap();

    assert_eq!(result.stats.degraded_count, 1);
    let table = result.main_json[0].as_table().unwrap();
    assert_eq!(table.shape, Shape::Nested);
    assert_eq!(table.rows.len(), 2);

    let inner = table.rows[0].inner().unwrap();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[1].get("Desc"), Some(&Value::from("Nut")));
    assert!(table.rows[1].inner().is_none());
}

#[test]
fn test_ragged_body_strict_and_lenient() {
    let doc = RecordedDocument {
        markdown: "##0;0;400;120##\n|Item|Qty|\n|Bolt|4|\n|stray|\n|Nut|8|\n|Pin|2|\n".to_string(),
        pages: vec![RecordedPage::default()],
    };
    let bytes = encode(&doc);

    let lenient = reconstruct_bytes(&bytes, "po.pdf").unwrap();
    assert_eq!(lenient.stats.dropped_rows, 1);
    assert_eq!(lenient.main_json[0].as_table().unwrap().rows.len(), 3);

    let strict = Unform::new().strict().reconstruct(&bytes, "po.pdf");
    assert!(matches!(strict, Err(Error::StructuralAmbiguity(_))));
}

#[test]
fn test_unparseable_input_has_no_output() {
    let result = reconstruct_bytes(b"%PDF-1.7\n%\xE2\xE3", "broken.pdf");
    assert!(matches!(result, Err(Error::UnparseableDocument(_))));
}

#[test]
fn test_reconstruct_file_uses_file_name() {
    let doc = RecordedDocument {
        markdown: "# Packing Slip\n\nShip to the dock".to_string(),
        pages: vec![RecordedPage::default()],
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slip.layout.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&encode(&doc)).unwrap();
    drop(file);

    let result = reconstruct_file(&path).unwrap();
    assert_eq!(result.filename, "slip.layout.json");
    let text = result.main_json[0].as_text().unwrap();
    assert_eq!(text.header.as_deref(), Some("Packing Slip"));
}

#[test]
fn test_output_contract_fields() {
    let doc = RecordedDocument {
        markdown: "##0;0;200;40##\n|Code|Value|\n|ZIP|95124|\n".to_string(),
        pages: vec![RecordedPage::default()],
    };
    let json = Unform::new()
        .reconstruct(&encode(&doc), "zip.pdf")
        .unwrap()
        .to_json(unform::JsonFormat::Compact)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["filename"], "zip.pdf");
    assert_eq!(value["main_json"][0]["shape"], "header_value");
    assert!(value["header_key"].as_str().unwrap().contains("ZIP"));
    assert!(value["header_only"].is_string());
}
