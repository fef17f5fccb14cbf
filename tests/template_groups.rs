use formpath::{collect, serialize, FormField, SerializeOptions, TemplateMarkers};
use rstest::rstest;
use serde_json::{json, Value};

fn tree(source: &[FormField], options: &SerializeOptions) -> Value {
    serialize(source, options)
        .unwrap_or_else(|err| panic!("serialize failed: {err}"))
        .into_tree()
}

#[rstest]
fn placeholder_becomes_first_instance_on_add_screen() {
    let source = vec![FormField::new("senses[TEMPLATE].definition", "d")];
    assert_eq!(
        tree(&source, &SerializeOptions::default()),
        json!({"senses": [{"definition": "d"}]})
    );
}

#[rstest]
fn placeholder_is_dropped_on_edit_screen() {
    let source = vec![
        FormField::new("senses[0].definition", "d0"),
        FormField::new("senses[TEMPLATE].definition", ""),
        FormField::new("senses[TEMPLATE].note", ""),
    ];
    assert_eq!(
        tree(&source, &SerializeOptions::default()),
        json!({"senses": [{"definition": "d0"}]})
    );
}

#[rstest]
fn placeholder_rewrites_every_marker_occurrence() {
    let source = vec![FormField::new(
        "senses[TEMPLATE].examples[TEMPLATE].text",
        "t",
    )];
    assert_eq!(
        tree(&source, &SerializeOptions::default()),
        json!({"senses": [{"examples": [{"text": "t"}]}]})
    );
}

#[rstest]
fn nested_template_inside_real_instance() {
    let source = vec![
        FormField::new("senses[0].definition", "d0"),
        FormField::new("senses[0].examples[0].text", "e0"),
        FormField::new("senses[0].examples[TEMPLATE].text", ""),
    ];
    assert_eq!(
        tree(&source, &SerializeOptions::default()),
        json!({"senses": [{"definition": "d0", "examples": [{"text": "e0"}]}]})
    );
}

#[rstest]
fn nested_placeholder_counts_as_outer_instance() {
    let source = vec![
        FormField::new("senses[0].examples[TEMPLATE].text", "ex"),
        FormField::new("senses[TEMPLATE].definition", "PHANTOM"),
    ];
    assert_eq!(
        tree(&source, &SerializeOptions::default()),
        json!({"senses": [{"examples": [{"text": "ex"}]}]})
    );
}

#[rstest]
fn independent_groups_with_custom_markers() {
    let options = SerializeOptions::new()
        .with_template_markers(TemplateMarkers::new(["TEMPLATE", "__new__"]));
    let source = vec![
        FormField::new("senses[1].definition", "d1"),
        FormField::new("senses[TEMPLATE].definition", ""),
        FormField::new("relations[__new__].target", "r"),
    ];
    assert_eq!(
        tree(&source, &options),
        json!({
            "senses": [{}, {"definition": "d1"}],
            "relations": [{"target": "r"}]
        })
    );
}

#[rstest]
fn disabled_template_fields_are_skipped_before_grouping() {
    let source = vec![
        FormField::new("senses[TEMPLATE].definition", "d").with_disabled(true),
        FormField::new("lemma", "run"),
    ];
    let entries = collect(&source, &SerializeOptions::default());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "lemma");
}

#[rstest]
fn without_markers_placeholders_are_malformed() {
    let options = SerializeOptions::new().with_template_markers(TemplateMarkers::none());
    let source = vec![FormField::new("senses[TEMPLATE].definition", "d")];
    let out = serialize(&source, &options).unwrap();
    assert_eq!(out.tree, json!({}));
    assert_eq!(out.problems.len(), 1);
}
