use serde_json::Value;

use super::element::{child_path, XmlElement};
use crate::types::ChangeRecord;

/// Structural diff of two element trees.
///
/// Children are compared by position, so an insertion in the middle of a
/// child list shows up as changes on every later sibling.
pub fn diff_xml(a: &XmlElement, b: &XmlElement) -> Vec<ChangeRecord> {
    diff_element(&a.path, a, b)
}

/// Diff two elements occupying the same position at `path`.
pub fn diff_element(path: &str, a: &XmlElement, b: &XmlElement) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    // A renamed element is still compared all the way down.
    if a.name != b.name {
        changes.push(ChangeRecord::modified(path, a.name.as_str(), b.name.as_str()));
    }

    if a.text != b.text {
        changes.push(ChangeRecord::modified(
            format!("{}.text", path),
            a.text.as_str(),
            b.text.as_str(),
        ));
    }

    changes.extend(diff_attributes(path, a, b));
    changes.extend(diff_children(path, &a.children, &b.children));
    changes
}

/// One `attribute_changed` record per key whose value differs or that only
/// one side carries, in A's order followed by B-only keys.
pub fn diff_attributes(path: &str, a: &XmlElement, b: &XmlElement) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for (name, old) in &a.attributes {
        match b.attributes.get(name) {
            Some(new) if new == old => {}
            new => changes.push(ChangeRecord::attribute_changed(
                path,
                name.as_str(),
                Some(old.clone()),
                new.cloned(),
            )),
        }
    }

    for (name, new) in &b.attributes {
        if !a.attributes.contains_key(name) {
            changes.push(ChangeRecord::attribute_changed(
                path,
                name.as_str(),
                None,
                Some(new.clone()),
            ));
        }
    }

    changes
}

fn diff_children(path: &str, a: &[XmlElement], b: &[XmlElement]) -> Vec<ChangeRecord> {
    let len = a.len().max(b.len());

    (0..len)
        .flat_map(|i| match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) => diff_element(&child_path(path, &x.name, i), x, y),
            (Some(x), None) => vec![ChangeRecord::removed(
                child_path(path, &x.name, i),
                Value::String(x.name.clone()),
            )],
            (None, Some(y)) => vec![ChangeRecord::added(
                child_path(path, &y.name, i),
                Value::String(y.name.clone()),
            )],
            (None, None) => Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeType;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> XmlElement {
        XmlElement::parse(xml).unwrap()
    }

    #[test]
    fn identical_trees_have_no_changes() {
        let doc = parse(r#"<a x="1"><b>text</b><c/></a>"#);
        assert!(diff_xml(&doc, &doc).is_empty());
    }

    #[test]
    fn changed_attribute_is_one_record() {
        let changes = diff_xml(&parse(r#"<a x="1"/>"#), &parse(r#"<a x="2"/>"#));

        assert_eq!(changes.len(), 1);
        let record = &changes[0];
        assert_eq!(record.change_type, ChangeType::AttributeChanged);
        assert_eq!(record.attribute_name.as_deref(), Some("x"));
        assert_eq!(record.old_text(), Some("1"));
        assert_eq!(record.new_text(), Some("2"));
        assert_eq!(record.position.as_path(), Some("a"));
    }

    #[test]
    fn missing_attribute_side_is_absent() {
        let changes = diff_xml(&parse(r#"<a x="1"/>"#), &parse(r#"<a y="2"/>"#));

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].attribute_name.as_deref(), Some("x"));
        assert!(changes[0].new_value.is_none());
        assert_eq!(changes[1].attribute_name.as_deref(), Some("y"));
        assert!(changes[1].old_value.is_none());
    }

    #[test]
    fn text_change_is_reported_under_text_path() {
        let changes = diff_xml(&parse("<a><b>old</b></a>"), &parse("<a><b>new</b></a>"));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].position.as_path(), Some("a.b[0].text"));
        assert_eq!(changes[0].change_type, ChangeType::Modified);
    }

    #[test]
    fn rename_continues_into_children() {
        let changes = diff_xml(
            &parse(r#"<a><b k="1">t</b></a>"#),
            &parse(r#"<a><c k="2">t</c></a>"#),
        );
        let types: Vec<_> = changes.iter().map(|c| c.change_type).collect();

        assert_eq!(types, vec![ChangeType::Modified, ChangeType::AttributeChanged]);
        assert_eq!(changes[0].old_text(), Some("b"));
        assert_eq!(changes[0].new_text(), Some("c"));
    }

    #[test]
    fn extra_children_are_added_or_removed() {
        let short = parse("<a><b/></a>");
        let long = parse("<a><b/><c/></a>");

        let added = diff_xml(&short, &long);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].change_type, ChangeType::Added);
        assert_eq!(added[0].position.as_path(), Some("a.c[1]"));
        assert_eq!(added[0].new_text(), Some("c"));

        let removed = diff_xml(&long, &short);
        assert_eq!(removed[0].change_type, ChangeType::Removed);
    }
}
