use tabletop_bridge::{
    ConversionError, Vector3,
    assembly::convert_object,
    data_structures::{
        scene_graph::{FieldValue, SceneNode},
        source::SourceObject,
    },
    dedup::{
        SharedKind, SharedRefs, component_signature, deduplicate_materials, deduplicate_meshes,
        find_placeholders, is_placeholder, parse_placeholder, resolve_placeholders,
    },
};

use crate::common::test_utils::{
    Fixture, card, card_stack, character, child, component, field, terrain,
};

mod common;

fn forest(fixture: &Fixture) -> Vec<SceneNode> {
    let ctx = fixture.ctx();
    let origin = Vector3::new(0.0, 0.0, 0.0);
    vec![
        convert_object(&SourceObject::Character(character("A", 1.0, None)), origin, &ctx),
        convert_object(&SourceObject::Character(character("B", 1.0, None)), origin, &ctx),
        convert_object(&SourceObject::Terrain(terrain("T", 1.0, 1.0, 1.0)), origin, &ctx),
        convert_object(
            &SourceObject::CardStack(card_stack(
                "S",
                vec![card("X", 1.0, true), card("Y", 1.0, true)],
            )),
            origin,
            &ctx,
        ),
    ]
}

/// Pretend every shared definition was created remotely.
fn fake_refs(meshes: &[String], materials: &[String]) -> SharedRefs {
    let mut refs = SharedRefs::default();
    for (i, signature) in meshes.iter().enumerate() {
        refs.insert(SharedKind::Mesh, signature.clone(), format!("mesh-{i}"));
    }
    for (i, signature) in materials.iter().enumerate() {
        refs.insert(SharedKind::Material, signature.clone(), format!("material-{i}"));
    }
    refs
}

fn count_types(roots: &[SceneNode], types: &[&str]) -> usize {
    let mut count = 0;
    for root in roots {
        root.visit(&mut |node| {
            count += node
                .components
                .iter()
                .filter(|c| types.contains(&c.component_type.as_str()))
                .count();
        });
    }
    count
}

#[test]
fn identical_meshes_share_one_definition() {
    let fixture = Fixture::new();
    let mut roots = forest(&fixture);
    let before = count_types(&roots, &["QuadMesh", "TriangleMesh"]);
    let meshes = deduplicate_meshes(&mut roots);

    assert_eq!(count_types(&roots, &["QuadMesh", "TriangleMesh"]), 0);
    assert!(meshes.len() < before);
    // both characters are 1x1 dual-sided quads
    let a = child(&roots[0], "Image");
    let b = child(&roots[1], "Image");
    let mesh_a = field(component(a, "MeshRenderer"), "Mesh");
    let mesh_b = field(component(b, "MeshRenderer"), "Mesh");
    assert_eq!(mesh_a, mesh_b);
    assert!(is_placeholder(mesh_a.as_reference().unwrap()));
}

#[test]
fn distinct_signatures_get_distinct_placeholders() {
    let fixture = Fixture::new();
    let mut roots = forest(&fixture);
    let meshes = deduplicate_meshes(&mut roots);

    let terrain = &roots[2];
    let top = field(component(child(terrain, "Top"), "MeshRenderer"), "Mesh").clone();
    let character = field(component(child(&roots[0], "Image"), "MeshRenderer"), "Mesh").clone();
    assert_ne!(top, character);
    for reference in [top, character] {
        let (kind, signature) = parse_placeholder(reference.as_reference().unwrap()).unwrap();
        assert_eq!(kind, SharedKind::Mesh);
        assert!(meshes.contains(signature));
    }
}

#[test]
fn deduplication_is_idempotent() {
    let fixture = Fixture::new();
    let mut roots = forest(&fixture);
    let meshes = deduplicate_meshes(&mut roots);
    let materials = deduplicate_materials(&mut roots);
    let snapshot = roots.clone();

    assert!(deduplicate_meshes(&mut roots).is_empty());
    assert!(deduplicate_materials(&mut roots).is_empty());
    assert_eq!(roots, snapshot);
    assert!(!meshes.is_empty());
    assert!(!materials.is_empty());
}

#[test]
fn material_list_references_are_rewritten() {
    let fixture = Fixture::new();
    let mut roots = forest(&fixture);
    deduplicate_materials(&mut roots);
    let renderer = component(child(&roots[0], "Image"), "MeshRenderer");
    match field(renderer, "Materials") {
        FieldValue::ReferenceList(ids) => {
            let (kind, _) = parse_placeholder(&ids[0]).unwrap();
            assert_eq!(kind, SharedKind::Material);
        }
        other => panic!("unexpected field {other:?}"),
    }
}

#[test]
fn no_placeholder_survives_resolution() {
    let fixture = Fixture::new();
    let mut roots = forest(&fixture);
    let meshes = deduplicate_meshes(&mut roots);
    let materials = deduplicate_materials(&mut roots);
    assert!(!find_placeholders(&roots).is_empty());

    let mesh_signatures: Vec<String> = meshes.iter().map(|d| d.signature.clone()).collect();
    let material_signatures: Vec<String> = materials.iter().map(|d| d.signature.clone()).collect();
    resolve_placeholders(&mut roots, &fake_refs(&mesh_signatures, &material_signatures)).unwrap();

    assert!(find_placeholders(&roots).is_empty());
    let mesh = field(component(child(&roots[0], "Image"), "MeshRenderer"), "Mesh");
    assert!(mesh.as_reference().unwrap().starts_with("mesh-"));
}

#[test]
fn missing_definitions_are_reported_with_their_nodes() {
    let fixture = Fixture::new();
    let mut roots = forest(&fixture);
    let meshes = deduplicate_meshes(&mut roots);
    let mesh_signatures: Vec<String> = meshes.iter().map(|d| d.signature.clone()).collect();
    // materials were never deduplicated, so only meshes are pending
    let (first, rest) = mesh_signatures.split_first().unwrap();

    let err = resolve_placeholders(&mut roots, &fake_refs(rest, &[])).unwrap_err();
    match err {
        ConversionError::UnresolvedPlaceholders(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].kind, "mesh");
            assert_eq!(&list[0].signature, first);
            assert!(!list[0].node_ids.is_empty());
        }
    }
}

#[test]
fn signatures_ignore_ids_and_negative_zero() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let a = ctx.component("QuadMesh").with("Size", FieldValue::Float2([1.0, 0.0]));
    let b = ctx.component("QuadMesh").with("Size", FieldValue::Float2([1.0, -0.0]));
    let c = ctx.component("QuadMesh").with("Size", FieldValue::Float2([1.0, 0.5]));
    assert_ne!(a.id, b.id);
    assert_eq!(component_signature(&a), component_signature(&b));
    assert_ne!(component_signature(&a), component_signature(&c));
}
