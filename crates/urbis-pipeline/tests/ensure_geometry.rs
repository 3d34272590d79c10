//! End-to-end pipeline behavior against a scripted compute engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use urbis_compute::{ComputeEngine, ComputeError, ComputeRequest, ComputeResponse, DataItem, DataTree};
use urbis_core::entities::{Entity, FloorRange};
use urbis_core::enums::{CacheValidity, GeometrySource, LevelOfDetail};
use urbis_core::properties::Overrides;
use urbis_core::store::{self, EntityStore};
use urbis_db::{MemoryStore, UrbanService};
use urbis_geometry::artifact::{build_container, decode, encode, payload_from_transport};
use urbis_geometry::fingerprint;
use urbis_pipeline::{GeometryPipeline, PipelineConfig, PipelineError};

// ---------------------------------------------------------------------------
// Scripted engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Reply {
    Artifact(String),
    Values(ComputeResponse),
    Status(u16),
    Hang,
}

struct ScriptedEngine {
    reply: std::sync::Mutex<Reply>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    fn new(reply: Reply) -> Arc<Self> {
        Self::with_delay(reply, Duration::ZERO)
    }

    fn with_delay(reply: Reply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: std::sync::Mutex::new(reply),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn set(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComputeEngine for ScriptedEngine {
    async fn evaluate(&self, request: &ComputeRequest) -> Result<ComputeResponse, ComputeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.values.len(), 4);
        tokio::time::sleep(self.delay).await;
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Artifact(data) => Ok(glb_response(&data)),
            Reply::Values(response) => Ok(response),
            Reply::Status(status) => Err(ComputeError::Api {
                status,
                message: "solver error".into(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(ComputeResponse::default())
            }
        }
    }

    async fn health(&self) -> Result<bool, ComputeError> {
        Ok(true)
    }
}

fn glb_response(data: &str) -> ComputeResponse {
    ComputeResponse {
        values: vec![DataTree::new("RH_OUT:GLB_File").append(&[0], vec![DataItem::string(data)])],
    }
}

fn container_b64() -> String {
    encode(&build_container(&json!({"asset": {"version": "2.0"}})))
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn square() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.001], [0.0, 0.0]]]
    })
}

struct Harness {
    service: UrbanService,
    store: Arc<dyn EntityStore>,
    engine: Arc<ScriptedEngine>,
    pipeline: GeometryPipeline,
    building: Entity,
}

async fn harness_with(engine: Arc<ScriptedEngine>, config: PipelineConfig, footprint: Value) -> Harness {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
    let service = UrbanService::new(Arc::clone(&store));
    let project = service
        .create_project("Harbour", "", Overrides::new())
        .await
        .unwrap();
    let site = service
        .create_site(&project.id, "North Pier", None, Overrides::new())
        .await
        .unwrap();
    let building = service
        .create_building(&site.id, "Tower A", footprint, Overrides::new())
        .await
        .unwrap();
    let pipeline = GeometryPipeline::new(
        Arc::clone(&store),
        Arc::clone(&engine) as Arc<dyn ComputeEngine>,
        config,
    );
    Harness {
        service,
        store,
        engine,
        pipeline,
        building,
    }
}

async fn harness(reply: Reply) -> Harness {
    harness_with(ScriptedEngine::new(reply), PipelineConfig::default(), square()).await
}

async fn expected_fingerprint(h: &Harness, lod: LevelOfDetail) -> String {
    let building = h.store.fetch(&h.building.id).await.unwrap();
    let effective = store::effective_properties(h.store.as_ref(), &building)
        .await
        .unwrap();
    fingerprint(building.building().unwrap().footprint.as_ref(), &effective, lod)
}

// ---------------------------------------------------------------------------
// Cache behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn computes_once_then_hits_cache() {
    let h = harness(Reply::Artifact(container_b64())).await;

    let first = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    assert_eq!(first.source, GeometrySource::Computed);
    let cache = &first.building.building().unwrap().geometry;
    assert_eq!(cache.artifact(), Some(container_b64().as_str()));
    assert_eq!(
        cache.fingerprint(),
        Some(expected_fingerprint(&h, LevelOfDetail::Medium).await.as_str())
    );
    assert_eq!(cache.level_of_detail(), LevelOfDetail::Medium);

    let stored = h.store.fetch(&h.building.id).await.unwrap();
    assert_eq!(stored.building().unwrap().geometry, *cache);

    let second = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    assert_eq!(second.source, GeometrySource::CacheHit);
    assert_eq!(h.engine.calls(), 1);
}

#[tokio::test]
async fn geometry_overrides_invalidate_and_others_do_not() {
    let h = harness(Reply::Artifact(container_b64())).await;
    let id = h.building.id.clone();
    h.pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();

    h.service.set_override(&id, "color", json!("#FF0000")).await.unwrap();
    let hit = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    assert_eq!(hit.source, GeometrySource::CacheHit);

    let project_id = h.store.fetch(&id).await.unwrap().parent_id.unwrap();
    let project_id = h.store.fetch(&project_id).await.unwrap().parent_id.unwrap();
    h.service
        .set_override(&project_id, "num_floors", json!(12))
        .await
        .unwrap();
    let status = h
        .pipeline
        .cache_status(&id, LevelOfDetail::Medium)
        .await
        .unwrap();
    assert_eq!(status.validity, CacheValidity::Stale);

    let recomputed = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    assert_eq!(recomputed.source, GeometrySource::Computed);
    assert_eq!(h.engine.calls(), 2);
}

#[tokio::test]
async fn footprint_edit_makes_cache_stale() {
    let h = harness(Reply::Artifact(container_b64())).await;
    let id = h.building.id.clone();
    h.pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();

    let renamed = h
        .service
        .update_building(&id, Some("Tower A1"), None)
        .await
        .unwrap();
    assert!(!renamed.footprint_changed);
    let status = h.pipeline.cache_status(&id, LevelOfDetail::Medium).await.unwrap();
    assert_eq!(status.validity, CacheValidity::Valid);

    let mut moved = square();
    moved["coordinates"][0][2] = json!([0.002, 0.002]);
    let update = h
        .service
        .update_building(&id, None, Some(moved))
        .await
        .unwrap();
    assert!(update.footprint_changed);

    let status = h.pipeline.cache_status(&id, LevelOfDetail::Medium).await.unwrap();
    assert_eq!(status.validity, CacheValidity::Stale);
    assert_eq!(status.fingerprint, expected_fingerprint(&h, LevelOfDetail::Medium).await);

    let recomputed = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    assert_eq!(recomputed.source, GeometrySource::Computed);
    assert_eq!(recomputed.building.name, "Tower A1");
    assert_eq!(h.engine.calls(), 2);
}

#[tokio::test]
async fn other_lod_or_force_recomputes() {
    let h = harness(Reply::Artifact(container_b64())).await;
    let id = h.building.id.clone();
    h.pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();

    let status = h.pipeline.cache_status(&id, LevelOfDetail::High).await.unwrap();
    assert_eq!(status.validity, CacheValidity::LodMismatch);

    let high = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::High, false)
        .await
        .unwrap();
    assert_eq!(high.source, GeometrySource::Computed);
    assert_eq!(
        high.building.building().unwrap().geometry.level_of_detail(),
        LevelOfDetail::High
    );

    let forced = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::High, true)
        .await
        .unwrap();
    assert_eq!(forced.source, GeometrySource::Computed);
    assert_eq!(h.engine.calls(), 3);
}

#[tokio::test]
async fn json_output_is_wrapped_into_a_container() {
    let document = r#"{"asset": {"version": "2.0"}, "meshes": []}"#;
    let h = harness(Reply::Artifact(document.to_string())).await;

    let outcome = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    let artifact = outcome.building.building().unwrap().geometry.artifact().unwrap().to_string();
    let payload = payload_from_transport(&artifact).unwrap();
    assert_eq!(payload, serde_json::from_str::<Value>(document).unwrap());
}

#[tokio::test]
async fn non_container_output_is_still_stored() {
    let h = harness(Reply::Artifact("plain mesh text".into())).await;
    let outcome = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    let artifact = outcome.building.building().unwrap().geometry.artifact().unwrap().to_string();
    assert_eq!(decode(&artifact).unwrap(), b"plain mesh text");
}

#[tokio::test]
async fn invalidate_clears_the_record() {
    let h = harness(Reply::Artifact(container_b64())).await;
    let id = h.building.id.clone();
    h.pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();

    assert!(h.pipeline.invalidate(&id).await.unwrap());
    assert!(!h.pipeline.invalidate(&id).await.unwrap());

    let status = h.pipeline.cache_status(&id, LevelOfDetail::Medium).await.unwrap();
    assert_eq!(status.validity, CacheValidity::Missing);
    assert_eq!(status.cached_fingerprint, None);
    assert_eq!(status.fingerprint, expected_fingerprint(&h, LevelOfDetail::Medium).await);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn engine_failure_keeps_the_stored_record() {
    let h = harness(Reply::Artifact(container_b64())).await;
    let id = h.building.id.clone();
    let first = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    let before = first.building.building().unwrap().geometry.clone();

    h.engine.set(Reply::Status(500));
    let err = h
        .pipeline
        .ensure_geometry(&id, LevelOfDetail::Medium, true)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Compute(ComputeError::Api { status: 500, .. })));
    assert!(err.is_recoverable());
    assert_eq!(err.exit_code(), 4);

    let stored = h.store.fetch(&id).await.unwrap();
    assert_eq!(stored.building().unwrap().geometry, before);
}

#[tokio::test]
async fn response_without_strings_is_an_extraction_error() {
    let response = ComputeResponse {
        values: vec![DataTree::new("Count").append(
            &[0],
            vec![DataItem {
                kind: "System.Int32".into(),
                data: json!(3),
            }],
        )],
    };
    let h = harness(Reply::Values(response)).await;
    let err = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));

    let stored = h.store.fetch(&h.building.id).await.unwrap();
    assert!(stored.building().unwrap().geometry.entry().is_none());
}

#[tokio::test]
async fn slow_engine_times_out() {
    let config = PipelineConfig {
        offline: false,
        timeout: Duration::from_millis(50),
    };
    let h = harness_with(ScriptedEngine::new(Reply::Hang), config, square()).await;
    let err = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Compute(ComputeError::Timeout { .. })));
}

#[rstest]
#[case::point(json!({"type": "Point", "coordinates": [0.0, 0.0]}))]
#[case::unclosed(json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]}))]
#[case::out_of_range(json!({"type": "Polygon", "coordinates": [[[200.0, 10.0], [1.0, 0.0], [1.0, 1.0], [200.0, 10.0]]]}))]
#[tokio::test]
async fn invalid_footprint_never_reaches_the_engine(#[case] footprint: Value) {
    let h = harness_with(
        ScriptedEngine::new(Reply::Artifact(container_b64())),
        PipelineConfig::default(),
        footprint,
    )
    .await;
    let err = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap_err();
    match err {
        PipelineError::Validation { errors } => assert!(!errors.is_empty()),
        other => panic!("expected validation error, got {other}"),
    }
    assert_eq!(h.engine.calls(), 0);
}

#[tokio::test]
async fn non_buildings_and_unknown_ids_are_rejected() {
    let h = harness(Reply::Artifact(container_b64())).await;
    let zone = h
        .service
        .create_zone(&h.building.id, "Podium", FloorRange::default(), Overrides::new())
        .await
        .unwrap();

    let err = h
        .pipeline
        .ensure_geometry(&zone.id, LevelOfDetail::Medium, false)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);

    let err = h
        .pipeline
        .ensure_geometry("bld-ffffffff", LevelOfDetail::Medium, false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Offline and concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_mode_never_calls_the_engine() {
    let config = PipelineConfig {
        offline: true,
        ..PipelineConfig::default()
    };
    let h = harness_with(ScriptedEngine::new(Reply::Status(500)), config, square()).await;

    let first = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    let second = h
        .pipeline
        .ensure_geometry(&h.building.id, LevelOfDetail::Medium, false)
        .await
        .unwrap();
    assert_eq!(first.source, GeometrySource::Offline);
    assert_eq!(second.source, GeometrySource::Offline);

    let cache = &first.building.building().unwrap().geometry;
    assert_eq!(cache.artifact(), Some(""));
    assert_eq!(
        cache.fingerprint(),
        Some(expected_fingerprint(&h, LevelOfDetail::Medium).await.as_str())
    );
    assert_eq!(first.building.building(), second.building.building());

    let stored = h.store.fetch(&h.building.id).await.unwrap();
    assert!(stored.building().unwrap().geometry.entry().is_none());
    assert_eq!(h.engine.calls(), 0);
    assert!(h.pipeline.health().await.unwrap());
}

#[tokio::test]
async fn concurrent_requests_compute_once() {
    let engine = ScriptedEngine::with_delay(
        Reply::Artifact(container_b64()),
        Duration::from_millis(100),
    );
    let h = harness_with(engine, PipelineConfig::default(), square()).await;
    let id = h.building.id.clone();

    let (a, b) = tokio::join!(
        h.pipeline.ensure_geometry(&id, LevelOfDetail::Medium, false),
        h.pipeline.ensure_geometry(&id, LevelOfDetail::Medium, false),
    );
    let mut sources = vec![a.unwrap().source, b.unwrap().source];
    sources.sort_by_key(|s| s.as_str());
    assert_eq!(sources, vec![GeometrySource::CacheHit, GeometrySource::Computed]);
    assert_eq!(h.engine.calls(), 1);
}

#[tokio::test]
async fn refresh_reports_failures_as_warnings() {
    let h = harness(Reply::Status(503)).await;
    let refreshed = h
        .pipeline
        .refresh(std::slice::from_ref(&h.building), LevelOfDetail::Medium)
        .await;
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].source, None);
    assert!(refreshed[0].warning.as_deref().unwrap().contains("503"));

    h.engine.set(Reply::Artifact(container_b64()));
    let refreshed = h
        .pipeline
        .refresh(std::slice::from_ref(&h.building), LevelOfDetail::Medium)
        .await;
    assert_eq!(refreshed[0].source, Some(GeometrySource::Computed));
    assert_eq!(refreshed[0].warning, None);
}
