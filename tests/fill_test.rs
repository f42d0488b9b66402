//! Integration tests for filling templates end to end.

mod common;

use common::{page_content, subscription_page, FormBuilder};
use flatfill::{
    analyze_bytes, fill_bytes, fill_file, BBox, Error, FieldDefinition, FieldKind, Filler,
    FillOptions, RenderOptions, TemplateConfig,
};
use lopdf::Document;
use serde_json::json;

fn subscription_config() -> TemplateConfig {
    TemplateConfig::with_fields(vec![
        FieldDefinition::text(0, BBox::new(150.0, 100.0, 450.0, 118.0), "investor.legal_name"),
        FieldDefinition::new(
            FieldKind::Checkbox,
            0,
            BBox::new(150.0, 200.0, 160.0, 210.0),
            "investor.accredited",
        ),
        FieldDefinition::new(
            FieldKind::Multiline,
            0,
            BBox::new(72.0, 310.0, 152.0, 510.0),
            "notes",
        ),
    ])
}

fn two_page_template() -> Vec<u8> {
    FormBuilder::new()
        .page(&subscription_page())
        .page("BT /F1 10 Tf 72 700 Td (Signature page) Tj ET\n")
        .build()
}

fn data() -> serde_json::Value {
    json!({
        "investor": {"legal_name": "Acme Capital LLC", "accredited": "yes"},
        "notes": "Wire instructions to follow under separate cover"
    })
}

#[test]
fn test_fill_draws_values_on_first_page() {
    let template = two_page_template();
    let filled = fill_bytes(&template, &subscription_config(), &data()).unwrap();

    let content = page_content(&filled, 1);
    assert!(content.contains("(Acme Capital LLC)"));
    assert!(content.contains("(X)"));
    assert!(content.contains("Wire"));
    // Original drawing survives underneath
    assert!(content.contains("(Legal Name:)"));
}

#[test]
fn test_fill_preserves_document_structure() {
    let template = two_page_template();
    let filled = fill_bytes(&template, &subscription_config(), &data()).unwrap();

    let before = Document::load_mem(&template).unwrap();
    let after = Document::load_mem(&filled).unwrap();
    assert_eq!(before.get_pages().len(), after.get_pages().len());

    for (number, page_id) in after.get_pages() {
        let media_box = after
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .len();
        assert_eq!(media_box, 4, "page {}", number);
    }

    // Untouched second page keeps its content as-is
    assert_eq!(
        page_content(&filled, 2).trim(),
        "BT /F1 10 Tf 72 700 Td (Signature page) Tj ET"
    );
}

#[test]
fn test_filled_output_still_analyzes() {
    let template = two_page_template();
    let filled = fill_bytes(&template, &subscription_config(), &data()).unwrap();

    let analysis = analyze_bytes(&filled).unwrap();
    assert_eq!(analysis.page_count, 2);
    assert_ne!(analysis.content_hash, analyze_bytes(&template).unwrap().content_hash);
}

#[test]
fn test_missing_values_leave_fields_blank() {
    let template = two_page_template();
    let output = Filler::new()
        .fill(&template, &subscription_config(), &json!({"investor": {}}))
        .unwrap();

    assert_eq!(output.pages_filled, 0);
    assert!(!page_content(&output.document, 1).contains("(X)"));
}

#[test]
fn test_unchecked_box_draws_nothing() {
    let template = two_page_template();
    let config = TemplateConfig::with_fields(vec![FieldDefinition::new(
        FieldKind::Checkbox,
        0,
        BBox::new(150.0, 200.0, 160.0, 210.0),
        "accredited",
    )]);
    let output = Filler::new()
        .fill(&template, &config, &json!({"accredited": "no"}))
        .unwrap();
    assert_eq!(output.pages_filled, 0);
}

#[test]
fn test_checked_when_equals() {
    let template = two_page_template();
    let config = TemplateConfig::with_fields(vec![FieldDefinition::new(
        FieldKind::Checkbox,
        0,
        BBox::new(150.0, 200.0, 160.0, 210.0),
        "investor.type",
    )
    .with_checked_when_equals("entity")]);

    let output = Filler::new()
        .fill(&template, &config, &json!({"investor": {"type": "entity"}}))
        .unwrap();
    assert_eq!(output.pages_filled, 1);
    assert!(page_content(&output.document, 1).contains("(X)"));
}

#[test]
fn test_formatted_values() {
    let template = two_page_template();
    let config = TemplateConfig::with_fields(vec![
        FieldDefinition::text(1, BBox::new(72.0, 100.0, 300.0, 118.0), "commitment.amount.value"),
        FieldDefinition::new(
            FieldKind::Date,
            1,
            BBox::new(72.0, 130.0, 300.0, 148.0),
            "signed_on",
        ),
    ]);
    let values = json!({
        "commitment": {"amount": {"value": "1250000"}},
        "signed_on": "2024-03-05"
    });
    let output = Filler::with_options(
        FillOptions::new().with_render_options(RenderOptions::new().with_compression(false)),
    )
    .fill(&template, &config, &values)
    .unwrap();

    let content = page_content(&output.document, 2);
    assert!(content.contains("(1,250,000)"));
    assert!(content.contains("(03/05/2024)"));
}

#[test]
fn test_fill_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("subscription.pdf");
    let output_path = dir.path().join("filled.pdf");
    std::fs::write(&template_path, two_page_template()).unwrap();

    let config_path = dir.path().join("template_config.json");
    std::fs::write(&config_path, subscription_config().to_json(true).unwrap()).unwrap();
    let config = TemplateConfig::from_file(&config_path).unwrap();

    fill_file(&template_path, &config, &data(), &output_path).unwrap();

    let filled = std::fs::read(&output_path).unwrap();
    assert!(page_content(&filled, 1).contains("(Acme Capital LLC)"));
}

#[test]
fn test_empty_config_is_rejected() {
    let template = two_page_template();
    let result = fill_bytes(&template, &TemplateConfig::with_fields(vec![]), &data());
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_malformed_fields_are_skipped() {
    let template = two_page_template();
    let config = TemplateConfig::from_json(
        r#"{"fields": [
            {"schema_path": "investor.legal_name", "type": "text", "page": 0, "bbox": [150, 100]},
            {"schema_path": "investor.legal_name", "type": "text", "page": 7, "bbox": [150, 100, 450, 118]},
            {"schema_path": "investor.legal_name", "type": "text", "page": 1, "bbox": [72, 100, 400, 118]}
        ]}"#,
    )
    .unwrap();

    let output = Filler::new().fill(&template, &config, &data()).unwrap();
    assert_eq!(output.pages_filled, 1);
    assert!(!page_content(&output.document, 1).contains("(Acme Capital LLC)"));
    assert!(page_content(&output.document, 2).contains("(Acme Capital LLC)"));
}
