//! JSON and XML tree differ integration tests.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use smartdiff_core::{diff_json, diff_xml, ChangeType, JsonComparer, XmlComparer, XmlElement};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn swap(change_type: ChangeType) -> ChangeType {
    match change_type {
        ChangeType::Added => ChangeType::Removed,
        ChangeType::Removed => ChangeType::Added,
        other => other,
    }
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn jd001_order_document_changes() {
    let old = json!({
        "id": "ORD-1",
        "customer": { "name": "Ada", "email": "ada@example.com" },
        "items": [
            { "sku": "W-1", "qty": 2 },
            { "sku": "G-7", "qty": 1 }
        ],
        "notes": "leave at door"
    });
    let new = json!({
        "id": "ORD-1",
        "customer": { "name": "Ada", "email": "ada@example.org", "phone": "555-0100" },
        "items": [
            { "sku": "W-1", "qty": 3 },
            { "sku": "G-7", "qty": 1 }
        ]
    });

    let changes = diff_json(&old, &new);
    let summary: Vec<_> = changes
        .iter()
        .map(|c| (c.position.to_string(), c.change_type))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("customer.email".to_string(), ChangeType::Modified),
            ("customer.phone".to_string(), ChangeType::Added),
            ("items[0].qty".to_string(), ChangeType::Modified),
            ("notes".to_string(), ChangeType::Removed),
        ]
    );
}

#[test]
fn jd002_summary_from_text() {
    let result = JsonComparer::compare_text(r#"{"a":1,"b":[1,2]}"#, r#"{"a":1,"b":[1,2]}"#).unwrap();

    assert_eq!(result.differences_found, 0);
    assert_eq!(result.total_units, 3);
    assert_eq!(result.matches_found, 3);
    assert_eq!(result.similarity_percentage, 100);
}

#[test]
fn jd003_top_level_array_length_change() {
    let changes = diff_json(&json!([1, 2]), &json!([1, 2, 3]));

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].position.to_string(), "root");
    assert_eq!(changes[0].change_type, ChangeType::Modified);
}

#[test]
fn jd004_changes_serialize_with_wire_names() {
    let changes = diff_json(&json!({ "x": 1 }), &json!({}));
    let wire = serde_json::to_value(&changes).unwrap();

    assert_eq!(wire, json!([{ "type": "removed", "position": "x", "oldValue": 1 }]));
}

proptest! {
    #[test]
    fn jd100_diff_of_value_with_itself_is_empty(value in arb_json()) {
        prop_assert!(diff_json(&value, &value).is_empty());
    }

    #[test]
    fn jd101_added_and_removed_swap(a in arb_json(), b in arb_json()) {
        let mut forward: Vec<_> = diff_json(&a, &b)
            .into_iter()
            .map(|c| (c.position.to_string(), c.change_type))
            .collect();
        let mut backward: Vec<_> = diff_json(&b, &a)
            .into_iter()
            .map(|c| (c.position.to_string(), swap(c.change_type)))
            .collect();

        forward.sort_by(|x, y| x.0.cmp(&y.0));
        backward.sort_by(|x, y| x.0.cmp(&y.0));
        prop_assert_eq!(forward, backward);
    }
}

// ============================================================================
// XML
// ============================================================================

#[test]
fn xd001_attribute_value_change() {
    let a = XmlElement::parse(r#"<a x="1"/>"#).unwrap();
    let b = XmlElement::parse(r#"<a x="2"/>"#).unwrap();

    let changes = diff_xml(&a, &b);

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, ChangeType::AttributeChanged);
    assert_eq!(changes[0].attribute_name.as_deref(), Some("x"));
    assert_eq!(changes[0].old_value, Some(json!("1")));
    assert_eq!(changes[0].new_value, Some(json!("2")));
}

#[test]
fn xd002_catalog_edits() {
    let old = r#"<catalog version="1">
        <book id="b1"><title>Dune</title><price>9.99</price></book>
        <book id="b2"><title>Emma</title></book>
    </catalog>"#;
    let new = r#"<catalog version="2">
        <book id="b1"><title>Dune</title><price>11.99</price></book>
        <book id="b2" format="ebook"><title>Emma</title></book>
        <book id="b3"><title>Ulysses</title></book>
    </catalog>"#;

    let result = XmlComparer::compare_text(old, new).unwrap();
    let paths: Vec<_> = result.changes().iter().map(|c| c.position.to_string()).collect();

    assert_eq!(
        paths,
        vec![
            "catalog",
            "catalog.book[0].price[1].text",
            "catalog.book[1]",
            "catalog.book[2]",
        ]
    );
    assert_eq!(result.attribute_changes().count(), 2);
    assert_eq!(result.element_changes().count(), 2);
    assert_eq!(result.changes()[3].change_type, ChangeType::Added);
}

#[test]
fn xd003_mid_list_insertion_cascades() {
    let a = XmlElement::parse("<l><i>a</i><i>b</i></l>").unwrap();
    let b = XmlElement::parse("<l><i>new</i><i>a</i><i>b</i></l>").unwrap();

    let types: Vec<_> = diff_xml(&a, &b).iter().map(|c| c.change_type).collect();

    assert_eq!(
        types,
        vec![ChangeType::Modified, ChangeType::Modified, ChangeType::Added]
    );
}

#[test]
fn xd004_identical_documents() {
    let xml = r#"<?xml version="1.0"?><root a="1"><child>text</child></root>"#;
    let result = XmlComparer::compare_text(xml, xml).unwrap();

    assert!(!result.summary.has_differences());
    assert_eq!(result.summary.total_units, 3);
    assert_eq!(result.summary.similarity_percentage, 100);
}

#[test]
fn xd005_malformed_document_is_an_error() {
    assert!(XmlComparer::compare_text("<a><b></a>", "<a/>").is_err());
}

#[test]
fn xd006_namespaced_attribute_does_not_shadow_plain_one() {
    let a = XmlElement::parse(r#"<a xmlns:x="urn:x" x:id="1" id="2"/>"#).unwrap();
    let b = XmlElement::parse(r#"<a xmlns:x="urn:x" x:id="9" id="2"/>"#).unwrap();

    let changes = diff_xml(&a, &b);

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, ChangeType::AttributeChanged);
    assert_eq!(changes[0].attribute_name.as_deref(), Some("x:id"));
    assert_eq!(changes[0].old_value, Some(json!("1")));
    assert_eq!(changes[0].new_value, Some(json!("9")));
}
