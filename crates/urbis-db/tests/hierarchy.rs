//! Hierarchy service behavior, run against both store adapters.

use std::sync::Arc;

use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use urbis_core::entities::{Entity, EntityAttributes, FloorRange};
use urbis_core::enums::EntityKind;
use urbis_core::errors::CoreError;
use urbis_core::properties::{Overrides, PropertyKey};
use urbis_core::store::{self, EntityStore};
use urbis_db::{MemoryStore, UrbanService, UrbisDb};

#[derive(Debug, Clone, Copy)]
enum Backend {
    Memory,
    LibSql,
}

async fn service(backend: Backend) -> UrbanService {
    let store: Arc<dyn EntityStore> = match backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::LibSql => Arc::new(UrbisDb::open_local(":memory:").await.unwrap()),
    };
    UrbanService::new(store)
}

fn footprint() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.001], [0.0, 0.0]]]
    })
}

fn overrides(pairs: &[(&str, Value)]) -> Overrides {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// project → site → building → zone, with `num_floors` set only on the project.
async fn seeded(svc: &UrbanService) -> (Entity, Entity, Entity, Entity) {
    let project = svc
        .create_project("Harbour", "", overrides(&[("num_floors", json!(20))]))
        .await
        .unwrap();
    let site = svc
        .create_site(&project.id, "North Pier", None, Overrides::new())
        .await
        .unwrap();
    let building = svc
        .create_building(&site.id, "Tower A", footprint(), Overrides::new())
        .await
        .unwrap();
    let zone = svc
        .create_zone(&building.id, "Podium", FloorRange::default(), Overrides::new())
        .await
        .unwrap();
    (project, site, building, zone)
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::libsql(Backend::LibSql)]
#[tokio::test]
async fn creation_links_children_in_order(#[case] backend: Backend) {
    let svc = service(backend).await;
    let (project, site, building, zone) = seeded(&svc).await;
    let second = svc
        .create_building(&site.id, "Tower B", footprint(), Overrides::new())
        .await
        .unwrap();

    let store = svc.store();
    assert_eq!(store.fetch(&project.id).await.unwrap().children, vec![site.id.clone()]);
    assert_eq!(
        store.fetch(&site.id).await.unwrap().children,
        vec![building.id.clone(), second.id.clone()]
    );
    assert_eq!(store.fetch(&building.id).await.unwrap().children, vec![zone.id.clone()]);
    assert_eq!(zone.parent_id.as_deref(), Some(building.id.as_str()));
    assert!(building.id.starts_with("bld-"));
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::libsql(Backend::LibSql)]
#[tokio::test]
async fn root_override_resolves_at_every_level(#[case] backend: Backend) {
    let svc = service(backend).await;
    let (_, _, _, zone) = seeded(&svc).await;

    let value = store::resolve(svc.store().as_ref(), &zone, "num_floors", json!(10))
        .await
        .unwrap();
    assert_eq!(value, json!(20));

    let resolved = svc.resolve(&zone.id, "num_floors").await.unwrap();
    assert_eq!(resolved.value, json!(20));
    assert!(resolved.source.unwrap().starts_with("prj-"));

    let default = svc.resolve(&zone.id, "color").await.unwrap();
    assert_eq!(default.value, json!("#4A90D9"));
    assert_eq!(default.source, None);

    let unknown = svc.resolve(&zone.id, "roof_type").await.unwrap();
    assert_eq!(unknown.value, Value::Null);
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::libsql(Backend::LibSql)]
#[tokio::test]
async fn effective_properties_are_complete(#[case] backend: Backend) {
    let svc = service(backend).await;
    let (_, site, building, _) = seeded(&svc).await;
    svc.set_override(&site.id, "floor_height", json!(4.0))
        .await
        .unwrap();

    let detail = svc.detail(&building.id).await.unwrap();
    let effective = &detail.effective_properties;
    assert_eq!(effective.iter().count(), PropertyKey::ALL.len());
    assert_eq!(effective.get(PropertyKey::NumFloors), &json!(20));
    assert_eq!(effective.get(PropertyKey::FloorHeight), &json!(4.0));
    assert_eq!(effective.get(PropertyKey::UseType), &json!("residential"));
    assert!((effective.total_height() - 80.0).abs() < f64::EPSILON);
}

#[rstest]
#[case::site_under_site(EntityKind::Site)]
#[case::zone_under_site(EntityKind::Zone)]
#[tokio::test]
async fn wrong_parent_kind_is_rejected(#[case] kind: EntityKind) {
    let svc = service(Backend::Memory).await;
    let (_, site, _, _) = seeded(&svc).await;

    let result = match kind {
        EntityKind::Site => svc.create_site(&site.id, "Nested", None, Overrides::new()).await,
        _ => {
            svc.create_zone(&site.id, "Stray", FloorRange::default(), Overrides::new())
                .await
        }
    };
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn unknown_parent_is_not_found() {
    let svc = service(Backend::Memory).await;
    let result = svc
        .create_building("sit-ffffffff", "Ghost", footprint(), Overrides::new())
        .await;
    assert!(matches!(
        result,
        Err(CoreError::NotFound { entity_type, .. }) if entity_type == "site"
    ));
}

#[tokio::test]
async fn override_changes_report_geometry_relevance() {
    let svc = service(Backend::Memory).await;
    let (_, _, building, _) = seeded(&svc).await;

    let change = svc
        .set_override(&building.id, "num_floors", json!(12))
        .await
        .unwrap();
    assert!(change.needs_geometry_refresh());

    let same = svc
        .set_override(&building.id, "num_floors", json!(12))
        .await
        .unwrap();
    assert!(!same.changed);

    let color = svc
        .set_override(&building.id, "color", json!("#FF0000"))
        .await
        .unwrap();
    assert!(color.changed);
    assert!(!color.needs_geometry_refresh());

    let cleared = svc.clear_override(&building.id, "num_floors").await.unwrap();
    assert!(cleared.needs_geometry_refresh());
    let again = svc.clear_override(&building.id, "num_floors").await.unwrap();
    assert!(!again.changed);
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::libsql(Backend::LibSql)]
#[tokio::test]
async fn delete_detaches_without_cascading(#[case] backend: Backend) {
    let svc = service(backend).await;
    let (_, site, building, zone) = seeded(&svc).await;

    assert!(svc.delete(&building.id).await.unwrap());
    assert!(svc.store().fetch(&site.id).await.unwrap().children.is_empty());

    // The zone survives but its ancestry is now broken.
    let zone = svc.store().fetch(&zone.id).await.unwrap();
    assert!(matches!(
        store::effective_properties(svc.store().as_ref(), &zone).await,
        Err(CoreError::Integrity(_))
    ));

    assert!(matches!(
        svc.delete(&building.id).await,
        Err(CoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn affected_buildings_follow_the_hierarchy() {
    let svc = service(Backend::Memory).await;
    let (project, site, building, zone) = seeded(&svc).await;
    let second_site = svc
        .create_site(&project.id, "South Pier", None, Overrides::new())
        .await
        .unwrap();
    let other = svc
        .create_building(&second_site.id, "Tower C", footprint(), Overrides::new())
        .await
        .unwrap();

    let ids = |entities: Vec<Entity>| entities.into_iter().map(|e| e.id).collect::<Vec<_>>();
    let project = svc.store().fetch(&project.id).await.unwrap();
    let site = svc.store().fetch(&site.id).await.unwrap();

    assert_eq!(
        ids(svc.affected_buildings(&project).await.unwrap()),
        vec![building.id.clone(), other.id.clone()]
    );
    assert_eq!(
        ids(svc.affected_buildings(&site).await.unwrap()),
        vec![building.id.clone()]
    );
    assert_eq!(
        ids(svc.affected_buildings(&building).await.unwrap()),
        vec![building.id.clone()]
    );
    assert!(svc.affected_buildings(&zone).await.unwrap().is_empty());
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::libsql(Backend::LibSql)]
#[tokio::test]
async fn project_tree_nests_sites_and_buildings(#[case] backend: Backend) {
    let svc = service(backend).await;
    let (project, site, building, _) = seeded(&svc).await;

    let tree = svc.project_tree(&project.id).await.unwrap();
    assert_eq!(tree.uid, project.id);
    assert_eq!(tree.kind, EntityKind::Project);
    assert!(tree.building.is_none());
    assert_eq!(tree.children.len(), 1);

    let site_node = &tree.children[0];
    assert_eq!(site_node.uid, site.id);
    assert_eq!(site_node.children.len(), 1);

    let building_node = &site_node.children[0];
    assert_eq!(building_node.uid, building.id);
    assert!(building_node.children.is_empty(), "zones are not part of the tree");
    let summary = building_node.building.as_ref().unwrap();
    assert!((summary.total_height - 70.0).abs() < f64::EPSILON);
    assert!(!summary.cache_status.cached);
    assert_eq!(summary.cache_status.cache_lod, None);

    let value = serde_json::to_value(&tree).unwrap();
    assert_eq!(value["type"], "project");
    assert_eq!(value["children"][0]["children"][0]["type"], "building");
    assert_eq!(
        value["children"][0]["children"][0]["effective_properties"]["num_floors"],
        json!(20)
    );
}

#[tokio::test]
async fn project_tree_rejects_non_projects() {
    let svc = service(Backend::Memory).await;
    let (_, site, _, _) = seeded(&svc).await;
    assert!(matches!(
        svc.project_tree(&site.id).await,
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test]
async fn parent_cycle_is_integrity_error() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let a = Entity::new(
        "sit-0000000a".into(),
        "A".into(),
        Some("sit-0000000b".into()),
        EntityAttributes::Site { boundary: None },
        now,
    );
    let b = Entity::new(
        "sit-0000000b".into(),
        "B".into(),
        Some("sit-0000000a".into()),
        EntityAttributes::Site { boundary: None },
        now,
    );
    store.insert(&a).await.unwrap();
    store.insert(&b).await.unwrap();

    assert!(matches!(
        store::ancestry(&store, &a).await,
        Err(CoreError::Integrity(_))
    ));
}

#[tokio::test]
async fn orphaned_site_is_integrity_error() {
    let store = MemoryStore::new();
    let site = Entity::new(
        "sit-00000001".into(),
        "Orphan".into(),
        None,
        EntityAttributes::Site { boundary: None },
        Utc::now(),
    );
    store.insert(&site).await.unwrap();
    assert!(matches!(
        store::ancestry(&store, &site).await,
        Err(CoreError::Integrity(_))
    ));
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::libsql(Backend::LibSql)]
#[tokio::test]
async fn building_update_reports_what_changed(#[case] backend: Backend) {
    let svc = service(backend).await;
    let (_, _, building, _) = seeded(&svc).await;

    let mut moved = footprint();
    moved["coordinates"][0][1][0] = json!(0.002);
    let update = svc
        .update_building(&building.id, Some("Tower A2"), Some(moved.clone()))
        .await
        .unwrap();
    assert!(update.renamed);
    assert!(update.footprint_changed);

    let stored = svc.store().fetch(&building.id).await.unwrap();
    assert_eq!(stored.name, "Tower A2");
    assert_eq!(stored.building().unwrap().footprint, Some(moved.clone()));

    let same = svc
        .update_building(&building.id, Some("Tower A2"), Some(moved))
        .await
        .unwrap();
    assert!(!same.renamed);
    assert!(!same.footprint_changed);
}

#[tokio::test]
async fn building_update_rejects_bad_footprints_and_non_buildings() {
    let svc = service(Backend::Memory).await;
    let (_, site, building, _) = seeded(&svc).await;

    let point = json!({"type": "Point", "coordinates": [0.0, 0.0]});
    assert!(matches!(
        svc.update_building(&building.id, None, Some(point)).await,
        Err(CoreError::Validation(_))
    ));
    let stored = svc.store().fetch(&building.id).await.unwrap();
    assert_eq!(stored.building().unwrap().footprint, Some(footprint()));

    assert!(matches!(
        svc.update_building(&site.id, Some("Renamed"), None).await,
        Err(CoreError::Validation(_))
    ));
}
