#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use proptest::prelude::*;

use themepack::decode::{materialize, materialize_package};
use themepack::encode::{assemble, resolve};
use themepack::theme::FILE_CONTAINERS;
use themepack::{markup, Attributes, Children, Node, NodeSet, Package, Scalar, ScriptLanguage};

fn social_attributes() -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("name", "Social");
    attrs.insert("version", "11.1.0.9731");
    attrs.insert("description", "'Social' Blog Theme");
    attrs
}

fn script_node(language: &str, payload: &str) -> Node {
    let mut attrs = Attributes::new();
    attrs.insert("language", language);
    Node::leaf(attrs, payload)
}

fn file_leaf(name: &str, payload: String) -> Node {
    let mut attrs = Attributes::new();
    attrs.insert("name", name);
    Node::leaf(attrs, payload)
}

fn file_container(entries: Vec<Node>) -> Node {
    let mut children = Children::new();
    if !entries.is_empty() {
        children.insert("file", NodeSet::Many(entries));
    }
    Node::container(Attributes::new(), children)
}

/// Directory listing order is platform-defined, so repeated-container
/// entries are compared after sorting by declared name
fn sorted_container(node: &Node) -> Node {
    let Some(container) = node.as_container() else {
        return node.clone();
    };
    let mut entries: Vec<Node> = container.children.nodes().cloned().collect();
    entries.sort_by(|a, b| {
        a.attributes()
            .get_str("name")
            .unwrap_or_default()
            .cmp(b.attributes().get_str("name").unwrap_or_default())
    });
    let mut children = Children::new();
    if !entries.is_empty() {
        children.insert("file", NodeSet::Many(entries));
    }
    Node::container(container.attributes.clone(), children)
}

fn normalized(theme: &Node) -> Node {
    let Some(container) = theme.as_container() else {
        return theme.clone();
    };
    let mut children = Children::new();
    for (key, set) in &container.children {
        let is_file_container = FILE_CONTAINERS.iter().any(|(k, _, _)| *k == key.as_str());
        match (is_file_container, set.single()) {
            (true, Some(node)) => {
                children.insert(key.clone(), NodeSet::One(sorted_container(node)));
            }
            _ => {
                children.insert(key.clone(), set.clone());
            }
        }
    }
    Node::container(container.attributes.clone(), children)
}

fn full_theme() -> Node {
    let mut children = Children::new();
    children.insert(
        "headScript",
        NodeSet::One(script_node("Velocity", "$context.RenderStylesheetFiles()")),
    );
    children.insert(
        "bodyScript",
        NodeSet::One(script_node("Unknown", "plain body script")),
    );
    children.insert(
        "configuration",
        NodeSet::One(Node::leaf(Attributes::new(), "<config pages=\"12\"/>")),
    );
    children.insert(
        "paletteTypes",
        NodeSet::One(Node::leaf(Attributes::new(), "<palettes/>")),
    );
    children.insert(
        "previewImage",
        NodeSet::One(file_leaf(
            "preview.png",
            BASE64_STANDARD.encode([0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a]),
        )),
    );
    children.insert(
        "files",
        NodeSet::One(file_container(vec![file_leaf(
            "logo.bin",
            BASE64_STANDARD.encode(b"\x00\x01\x02"),
        )])),
    );
    children.insert(
        "javascriptFiles",
        NodeSet::One(file_container(vec![file_leaf(
            "ui.js",
            "console.log('hi');".to_owned(),
        )])),
    );
    children.insert(
        "styleFiles",
        NodeSet::One(file_container(vec![file_leaf(
            "site.css",
            "body {}".to_owned(),
        )])),
    );
    children.insert(
        "pageLayouts",
        NodeSet::One(file_container(vec![file_leaf(
            "home.xml",
            "<layout/>".to_owned(),
        )])),
    );
    Node::container(social_attributes(), children)
}

#[test]
fn full_theme_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let theme = full_theme();

    materialize(&theme, dir.path()).unwrap();
    let assembled = assemble(dir.path()).unwrap();

    assert_eq!(assembled, theme);
}

#[test]
fn optionality_symmetry_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut children = Children::new();
    children.insert(
        "headScript",
        NodeSet::One(script_node("Velocity", "$head")),
    );
    let theme = Node::container(social_attributes(), children);

    materialize(&theme, dir.path()).unwrap();
    let assembled = assemble(dir.path()).unwrap();
    let container = assembled.as_container().unwrap();

    assert!(container.children.contains("headScript"));
    for key in [
        "bodyScript",
        "configuration",
        "paletteTypes",
        "languageResources",
        "previewImage",
        "files",
        "javascriptFiles",
        "styleFiles",
        "pageLayouts",
    ] {
        assert!(!container.children.contains(key), "{key} should be absent");
    }
}

#[test]
fn binary_fidelity_of_preview_image() {
    let dir = tempfile::tempdir().unwrap();
    let encoded = BASE64_STANDARD.encode([0xde, 0xad, 0xbe, 0xef, 0x00, 0x42]);

    let mut children = Children::new();
    children.insert(
        "previewImage",
        NodeSet::One(file_leaf("preview.png", encoded.clone())),
    );
    let theme = Node::container(social_attributes(), children);

    materialize(&theme, dir.path()).unwrap();

    let written = std::fs::read(dir.path().join("previewImage/preview.png")).unwrap();
    assert_eq!(BASE64_STANDARD.encode(written), encoded);
}

#[test]
fn collection_round_trips_through_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();

    let mut beta_attrs = Attributes::new();
    beta_attrs.insert("name", "Beta");
    let package = Package::Themes(vec![full_theme(), Node::container(beta_attrs, Children::new())]);

    materialize_package(&package, dir.path()).unwrap();
    let resolved = resolve(dir.path()).unwrap();

    let Package::Themes(mut themes) = resolved else {
        panic!("expected a collection");
    };
    assert_eq!(themes.len(), 2);

    // listing order is platform-defined; compare by theme name
    themes.sort_by_key(|t| t.attributes().get_str("name").unwrap_or_default().to_owned());
    assert_eq!(normalized(&themes[0]), normalized(&Node::container(
        {
            let mut attrs = Attributes::new();
            attrs.insert("name", "Beta");
            attrs
        },
        Children::new(),
    )));
    assert_eq!(normalized(&themes[1]), normalized(&full_theme()));
}

#[test]
fn encoded_directory_parses_back_into_the_same_package() {
    let dir = tempfile::tempdir().unwrap();
    let theme = full_theme();
    materialize(&theme, dir.path()).unwrap();

    let xml = themepack::encode_dir(dir.path()).unwrap();
    let document = markup::parse(&xml).unwrap();
    let package = Package::from_document(document).unwrap();

    match package {
        Package::Theme(reparsed) => assert_eq!(normalized(&reparsed), normalized(&theme)),
        Package::Themes(_) => panic!("expected a single theme"),
    }
}

#[test]
fn decode_str_accepts_a_collection_document() {
    let dir = tempfile::tempdir().unwrap();
    let xml = r#"<themes>
        <theme name="Alpha" version="1.0"/>
        <theme name="Beta" version="2.0"/>
    </themes>"#;

    themepack::decode_str(xml, dir.path()).unwrap();

    assert!(dir.path().join("Alpha/theme_options.json").is_file());
    assert!(dir.path().join("Beta/theme_options.json").is_file());
}

proptest! {
    #[test]
    fn extension_lookup_is_total(tag in ".*") {
        let extension = ScriptLanguage::from_tag(&tag).extension();
        prop_assert!(!extension.is_empty());
    }
}

fn arb_attributes() -> impl Strategy<Value = Attributes> {
    prop::collection::vec(
        (
            "[a-z][a-zA-Z]{0,7}",
            prop_oneof![
                any::<bool>().prop_map(Scalar::Bool),
                (-1_000_000i32..1_000_000).prop_map(|n| Scalar::Number(f64::from(n))),
                "[a-zA-Z '.0-9]{0,16}".prop_map(Scalar::String),
            ],
        ),
        0..5,
    )
    .prop_map(|pairs| {
        let mut attrs = Attributes::new();
        for (key, value) in pairs {
            attrs.insert(key, value);
        }
        attrs
    })
}

fn arb_script() -> impl Strategy<Value = Node> {
    (
        prop_oneof![Just("Velocity"), Just("Unknown")],
        "[ -~]{0,40}",
    )
        .prop_map(|(language, payload)| script_node(language, &payload))
}

fn arb_text_entries(prefix: &'static str) -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec("[ -~]{0,32}", 0..3).prop_map(move |payloads| {
        payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| file_leaf(&format!("{prefix}-{i}.txt"), payload))
            .collect()
    })
}

fn arb_binary_entries() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 0..3).prop_map(|blobs| {
        blobs
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| file_leaf(&format!("blob-{i}.bin"), BASE64_STANDARD.encode(bytes)))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn theme_entity_round_trips(
        attrs in arb_attributes(),
        head in prop::option::of(arb_script()),
        body in prop::option::of(arb_script()),
        configuration in prop::option::of("[ -~]{0,80}"),
        preview in prop::option::of(prop::collection::vec(any::<u8>(), 0..48)),
        files in prop::option::of(arb_binary_entries()),
        styles in prop::option::of(arb_text_entries("style")),
    ) {
        let mut children = Children::new();
        if let Some(script) = head {
            children.insert("headScript", NodeSet::One(script));
        }
        if let Some(script) = body {
            children.insert("bodyScript", NodeSet::One(script));
        }
        if let Some(payload) = configuration {
            children.insert("configuration", NodeSet::One(Node::leaf(Attributes::new(), payload)));
        }
        if let Some(bytes) = preview {
            children.insert(
                "previewImage",
                NodeSet::One(file_leaf("preview.png", BASE64_STANDARD.encode(bytes))),
            );
        }
        if let Some(entries) = files {
            children.insert("files", NodeSet::One(file_container(entries)));
        }
        if let Some(entries) = styles {
            children.insert("styleFiles", NodeSet::One(file_container(entries)));
        }
        let theme = Node::container(attrs, children);

        let dir = tempfile::tempdir().unwrap();
        materialize(&theme, dir.path()).unwrap();
        let assembled = assemble(dir.path()).unwrap();

        prop_assert_eq!(normalized(&assembled), normalized(&theme));
    }
}
