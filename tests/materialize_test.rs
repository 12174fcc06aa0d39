use tabletop_bridge::{
    AssetContext, ConversionConfig, convert_scene, materialize_scene,
    data_structures::{
        scene_graph::FieldValue,
        source::{
            ObjectBase, SlopeDirection, SourceDocument, SourceObject, TerrainExtension,
        },
    },
    dedup::find_placeholders,
    materialize::Progress,
};

use crate::common::test_utils::{
    Call, RecordingScene, character, init_logging, table, table_mask, terrain,
};

mod common;

const ROOT: &str = "world";

fn document() -> SourceDocument {
    let mut board = table("Board", 4.0, 4.0);
    board
        .children
        .push(SourceObject::Terrain(terrain("Hill", 1.0, 1.0, 1.0)));

    let mut hero = character("Hero", 1.0, Some("graveyard"));
    hero.base = ObjectBase::new("hero", "Hero", 0.0, 0.0)
        .with_image("https://example.com/hero.png", "image");

    SourceDocument {
        objects: vec![
            SourceObject::Table(board),
            SourceObject::Terrain(terrain("Broken", 1.0, 1.0, 1.0)),
            SourceObject::Character(hero),
            SourceObject::Character(character("Ghost", 1.0, None)),
            SourceObject::Character(character("Pawn", 1.0, Some("table"))),
            SourceObject::TableMask(table_mask("Fog", 2.0, 2.0, 50.0)),
        ],
        ..Default::default()
    }
}

async fn run(
    scene: &mut RecordingScene,
) -> anyhow::Result<(tabletop_bridge::MaterializeReport, Vec<Progress>)> {
    init_logging();
    let converted = convert_scene(&document(), &AssetContext::new(), &ConversionConfig::default());
    let mut updates = Vec::new();
    let report =
        materialize_scene(scene, ROOT, converted, |p: &Progress| updates.push(p.clone())).await?;
    Ok((report, updates))
}

fn index_of(scene: &RecordingScene, predicate: impl Fn(&Call) -> bool) -> usize {
    scene
        .calls
        .iter()
        .position(predicate)
        .expect("no matching call")
}

#[tokio::test]
async fn every_object_lands_in_its_container() {
    let mut scene = RecordingScene::new();
    let (report, updates) = run(&mut scene).await.unwrap();
    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.created_objects, 6);
    assert_eq!(updates.len(), 6);
    assert_eq!(updates.last().unwrap().completed, 6);

    let id = |name: &str| scene.node_id(name).unwrap().to_string();
    assert_eq!(scene.parent_of("Tables"), Some(ROOT));
    assert_eq!(scene.parent_of("Objects"), Some(ROOT));
    assert_eq!(scene.parent_of("Inventory"), Some(ROOT));
    assert_eq!(scene.parent_of("Board"), Some(id("Tables").as_str()));
    assert_eq!(scene.parent_of("Hill"), Some(id("Board").as_str()));
    assert_eq!(scene.parent_of("Broken"), Some(id("Objects").as_str()));
    assert_eq!(scene.parent_of("Pawn"), Some(id("Objects").as_str()));
    assert_eq!(scene.parent_of("Fog"), Some(id("Objects").as_str()));
    assert_eq!(scene.parent_of("graveyard"), Some(id("Inventory").as_str()));
    assert_eq!(scene.parent_of("Unknown"), Some(id("Inventory").as_str()));
    assert_eq!(scene.parent_of("Hero"), Some(id("graveyard").as_str()));
    assert_eq!(scene.parent_of("Ghost"), Some(id("Unknown").as_str()));

    for group in ["graveyard", "Unknown"] {
        assert!(scene.calls.contains(&Call::SetActive {
            node_id: id(group),
            active: false,
        }));
    }
    let names = scene.created_node_names();
    assert_eq!(names.iter().filter(|n| **n == "Objects").count(), 1);
    assert_eq!(names.iter().filter(|n| **n == "Inventory").count(), 1);
}

#[tokio::test]
async fn identity_rotations_are_not_sent() {
    let mut scene = RecordingScene::new();
    run(&mut scene).await.unwrap();

    let rotations = scene.rotations();
    assert!(!rotations.is_empty());
    for (_, rotation) in &rotations {
        assert!(rotation.iter().any(|angle| *angle != 0.0), "{rotation:?}");
    }
    let fog = scene.node_id("Fog").unwrap();
    assert!(rotations.contains(&(fog, [90.0, 0.0, 0.0])));
    let hero = scene.node_id("Hero").unwrap();
    assert!(rotations.iter().all(|(id, _)| *id != hero));
}

#[tokio::test]
async fn list_fields_are_appended_after_creation() {
    let mut scene = RecordingScene::new();
    run(&mut scene).await.unwrap();

    let components = scene.components();
    let renderers: Vec<&str> = components
        .iter()
        .filter(|(_, t, _)| *t == "MeshRenderer")
        .map(|(id, _, _)| *id)
        .collect();
    let materials: Vec<&str> = components
        .iter()
        .filter(|(_, t, _)| *t == "UnlitMaterial")
        .map(|(id, _, _)| *id)
        .collect();
    assert!(!renderers.is_empty());

    let appends: Vec<&Call> = scene
        .calls
        .iter()
        .filter(|c| matches!(c, Call::AppendList { .. }))
        .collect();
    assert_eq!(appends.len(), renderers.len());
    for call in appends {
        let Call::AppendList { component_id, field, elements } = call else { unreachable!() };
        assert_eq!(field, "Materials");
        assert!(renderers.contains(&component_id.as_str()));
        assert!(elements.iter().all(|e| materials.contains(&e.as_str())));
    }
}

#[tokio::test]
async fn shared_definitions_come_first_and_are_referenced() {
    let mut scene = RecordingScene::new();
    run(&mut scene).await.unwrap();

    let created = |wanted: &str| {
        index_of(&scene, |c| {
            matches!(c, Call::CreateComponent { component_type, .. } if component_type == wanted)
        })
    };
    let texture = created("StaticTexture2D");
    let material = created("UnlitMaterial");
    let mesh = created("QuadMesh");
    let first_object =
        index_of(&scene, |c| matches!(c, Call::CreateNode { name, .. } if name == "Board"));
    assert!(texture < material && material < mesh && mesh < first_object);
    assert_eq!(scene.parent_of("Textures"), scene.node_id("Assets"));
    assert_eq!(scene.parent_of("Assets"), Some(ROOT));

    let components = scene.components();
    let texture_ids: Vec<&str> = components
        .iter()
        .filter(|(_, t, _)| *t == "StaticTexture2D")
        .map(|(id, _, _)| *id)
        .collect();
    assert_eq!(texture_ids.len(), 1);
    let textured = components
        .iter()
        .filter(|(_, t, _)| *t == "UnlitMaterial")
        .filter_map(|(_, _, fields)| fields.get("Texture"))
        .collect::<Vec<_>>();
    assert_eq!(textured, vec![&FieldValue::Reference(texture_ids[0].to_string())]);

    let mesh_ids: Vec<&str> = components
        .iter()
        .filter(|(_, t, _)| *t == "QuadMesh" || *t == "TriangleMesh")
        .map(|(id, _, _)| *id)
        .collect();
    for (_, _, fields) in components.iter().filter(|(_, t, _)| *t == "MeshRenderer") {
        let mesh = fields["Mesh"].as_reference().unwrap();
        assert!(mesh_ids.contains(&mesh), "{mesh} is not a created mesh");
    }
}

#[tokio::test]
async fn one_failing_object_does_not_stop_the_rest() {
    let mut scene = RecordingScene::new().failing_node("Broken");
    let (report, updates) = run(&mut scene).await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Broken");
    assert!(report.failures[0].message.contains("create_node rejected"));
    assert_eq!(report.created_objects, 5);
    assert_eq!(updates.len(), 6);
    assert!(scene.node_id("Fog").is_some());
}

#[tokio::test]
async fn failing_container_only_fails_its_objects() {
    let mut scene = RecordingScene::new().failing_node("Inventory");
    let (report, _) = run(&mut scene).await.unwrap();

    let failed: Vec<&str> = report.failures.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["Hero", "Ghost"]);
    assert!(report.failures.iter().all(|f| f.message.contains("Inventory")));
    assert!(scene.node_id("Pawn").is_some());
    assert!(scene.node_id("Board").is_some());
    assert!(scene.node_id("graveyard").is_none());
}

#[tokio::test]
async fn missing_shared_asset_only_fails_objects_using_it() {
    init_logging();
    let ramp = terrain("Ramp", 1.0, 1.0, 1.0);
    let mut document = SourceDocument {
        objects: vec![
            SourceObject::Character(character("Hero", 1.0, Some("table"))),
            SourceObject::Terrain(ramp.clone()),
        ],
        ..Default::default()
    };
    document.terrain_extensions.insert(
        &ramp,
        TerrainExtension {
            altitude: 0.0,
            slope: true,
            direction: SlopeDirection::Top,
        },
    );
    let converted = convert_scene(&document, &AssetContext::new(), &ConversionConfig::default());

    let mut scene = RecordingScene::new().failing_component("TriangleMesh");
    let report = materialize_scene(&mut scene, ROOT, converted, |_: &Progress| {})
        .await
        .unwrap();

    assert_eq!(report.created_objects, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Ramp");
    assert!(report.failures[0].message.contains("TriangleMesh"), "{}", report.failures[0].message);
    assert!(scene.node_id("Hero").is_some());
    assert!(scene.node_id("Ramp").is_none());
}

#[tokio::test]
async fn short_list_append_fails_the_object() {
    let mut scene = RecordingScene::new().dropping_list_elements();
    let (report, updates) = run(&mut scene).await.unwrap();

    assert_eq!(report.created_objects, 0);
    assert_eq!(report.failures.len(), 6);
    assert!(report.failures.iter().all(|f| f.message.contains("returned 0 id(s)")));
    assert_eq!(updates.len(), 6);
}

#[test]
fn converted_scene_has_only_placeholders_for_shared_assets() {
    init_logging();
    let converted = convert_scene(&document(), &AssetContext::new(), &ConversionConfig::default());
    let pending = find_placeholders(&converted.roots);
    for placeholder in &pending {
        let table = match placeholder.kind.as_str() {
            "mesh" => &converted.shared.meshes,
            "material" => &converted.shared.materials,
            "texture" => &converted.shared.textures,
            other => panic!("unexpected kind {other}"),
        };
        assert!(table.contains(&placeholder.signature));
    }
    assert!(pending.iter().any(|p| p.kind == "mesh"));
    assert!(pending.iter().any(|p| p.kind == "material"));
}
