use chrono::{DateTime, FixedOffset};
use dialclock::prelude::*;
use dialclock::surface::Shape;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

type Engine = DialclockEngine<RecordingSurface, MemoryDocument>;

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn engine_with(document: MemoryDocument, time: Arc<FixedTimeSource>) -> Engine {
    let config = DialclockConfig {
        marker: "Marker".to_string(),
        ..DialclockConfig::default()
    };
    let skins = SkinRegistry::builtin().unwrap();
    DialclockEngine::new(config, skins, RecordingSurface::new(), document).with_time_source(time)
}

fn single_clock_engine() -> (Engine, Arc<FixedTimeSource>) {
    let mut document = MemoryDocument::new();
    document.insert_with_id("clock", "Marker:swissRail:100");
    let time = Arc::new(FixedTimeSource::new(at("2026-10-19T09:05:07Z")));
    (engine_with(document, time.clone()), time)
}

async fn revision(engine: &Engine) -> u64 {
    engine.surface().read().await.revision()
}

async fn renders(engine: &Engine, element: &str) -> u64 {
    engine
        .tracker()
        .read()
        .await
        .find(&element.into())
        .unwrap()
        .renders()
}

async fn is_scheduled(engine: &Engine, element: &str) -> bool {
    engine
        .tracker()
        .read()
        .await
        .find(&element.into())
        .unwrap()
        .is_scheduled()
}

#[tokio::test(start_paused = true)]
async fn construction_renders_immediately() {
    let (engine, _time) = single_clock_engine();
    let id = engine.add_clock(ClockOptions::new("clock")).await;

    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    let face = tracker.get(id).unwrap();
    assert_eq!(face.renders(), 1);
    assert!(face.is_scheduled());

    // 9:05:07 puts the second hand 7/60 of a turn past twelve.
    let surface = engine.surface();
    let surface = surface.read().await;
    let second = surface.get(face.second_hand().unwrap()).unwrap();
    let expected = (-0.25 + 7.0 / 60.0) * 360.0;
    assert!((second.transform.rotation.unwrap().degrees - expected).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn ticks_follow_the_configured_delay() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine.add_clock(ClockOptions::new("clock")).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(renders(&engine, "clock").await, 1);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(renders(&engine, "clock").await, 2);

    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert_eq!(renders(&engine, "clock").await, 5);
}

#[tokio::test(start_paused = true)]
async fn faces_without_seconds_tick_slowly() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine
        .add_clock(ClockOptions::new("clock").with_seconds(false))
        .await;

    tokio::time::sleep(Duration::from_millis(14_500)).await;
    assert_eq!(renders(&engine, "clock").await, 1);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(renders(&engine, "clock").await, 2);
}

#[tokio::test(start_paused = true)]
async fn each_tick_samples_the_clock_again() {
    let (engine, time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    let id = engine.add_clock(ClockOptions::new("clock")).await;
    let mut events = engine.subscribe_events();

    time.set(at("2026-10-19T09:05:30Z"));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(
        events.recv().await.unwrap(),
        ClockEvent::Rendered {
            id,
            time: WallTime::new(9, 5, 30)
        }
    );
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_further_renders() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine.add_clock(ClockOptions::new("clock")).await;

    assert!(engine.stop(&"clock".into()).await);
    let before = revision(&engine).await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(revision(&engine).await, before);
    assert_eq!(renders(&engine, "clock").await, 1);
    assert!(!is_scheduled(&engine, "clock").await);
}

#[tokio::test(start_paused = true)]
async fn start_renders_immediately_and_resumes() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine.add_clock(ClockOptions::new("clock")).await;
    engine.stop(&"clock".into()).await;

    assert!(engine.start(&"clock".into()).await);
    assert_eq!(renders(&engine, "clock").await, 2);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(renders(&engine, "clock").await, 3);
}

#[tokio::test(start_paused = true)]
async fn start_on_a_running_face_does_not_double_the_chain() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine.add_clock(ClockOptions::new("clock")).await;

    assert!(engine.start(&"clock".into()).await);
    assert_eq!(renders(&engine, "clock").await, 1);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(renders(&engine, "clock").await, 3);
}

#[tokio::test(start_paused = true)]
async fn unknown_elements_are_reported() {
    let (engine, _time) = single_clock_engine();
    assert!(!engine.stop(&"nowhere".into()).await);
    assert!(!engine.start(&"nowhere".into()).await);
}

#[tokio::test(start_paused = true)]
async fn removed_host_element_halts_quietly() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine.add_clock(ClockOptions::new("clock")).await;

    assert!(engine.document().write().await.remove(&"clock".into()));
    let before = revision(&engine).await;

    // Let the pending tick fire, then wait well past another delay.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(revision(&engine).await, before);
    assert!(!is_scheduled(&engine, "clock").await);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(revision(&engine).await, before);
    assert_eq!(renders(&engine, "clock").await, 1);

    // The tracker entry stays, inert.
    assert!(engine.tracker().read().await.lookup(&"clock".into()).is_some());
}

#[tokio::test(start_paused = true)]
async fn missing_host_element_never_renders() {
    let time = Arc::new(FixedTimeSource::new(at("2026-10-19T09:05:07Z")));
    let engine = engine_with(MemoryDocument::new(), time);
    let id = engine.add_clock(ClockOptions::new("ghost")).await;

    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    assert_eq!(tracker.get(id).unwrap().renders(), 0);
    assert!(!tracker.get(id).unwrap().is_scheduled());
}

#[tokio::test(start_paused = true)]
async fn replacing_a_face_retires_the_old_chain() {
    let (engine, _time) = single_clock_engine();
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    let old = engine.add_clock(ClockOptions::new("clock")).await;
    let new = engine
        .add_clock(ClockOptions::new("clock").with_skin("fancy"))
        .await;

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    assert_eq!(tracker.get(old).unwrap().renders(), 1);
    assert_eq!(tracker.get(new).unwrap().renders(), 3);
    assert_eq!(tracker.find(&"clock".into()).unwrap().skin_id(), "fancy");
}

#[tokio::test(start_paused = true)]
async fn discovery_builds_faces_from_placeholders() {
    let mut document = MemoryDocument::new();
    document.insert_with_id("named", "Marker:chunkySwissOnBlack:1000");
    let anonymous = document.insert("Marker:fancy:50:noSeconds:5.5:showDigital:logClock wide");
    document.insert_with_id("skipped", "Marker:foo:bar");
    document.insert("other:swissRail:40");
    let time = Arc::new(FixedTimeSource::new(at("2026-10-19T09:05:07Z")));
    let engine = engine_with(document, time);

    let created = engine.discover().await;
    assert_eq!(created.len(), 2);

    let document = engine.document();
    let document = document.read().await;
    let assigned = document.id_of(anonymous).unwrap().clone();
    assert_eq!(assigned.as_str(), "_dialclock_auto_id_0");

    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    let named = tracker.find(&"named".into()).unwrap();
    assert_eq!(named.skin_id(), "chunkySwissOnBlack");
    assert_eq!(named.display_radius(), 1000.0);
    assert!(named.options().show_seconds);
    assert!(named.options().gmt_offset.is_none());
    assert!(!named.options().show_digital);
    assert_eq!(named.options().angle_mode, AngleMode::Linear);

    let auto = tracker.find(&assigned).unwrap();
    assert_eq!(auto.skin_id(), "fancy");
    assert!(auto.second_hand().is_none());
    assert_eq!(auto.options().gmt_offset, Some(5.5));
    assert_eq!(auto.options().angle_mode, AngleMode::Log);
    assert_eq!(auto.renders(), 1);

    // 09:05:07 UTC shifted by 5.5 hours reads 2:35:07 pm.
    let surface = engine.surface();
    let surface = surface.read().await;
    match &surface.get(auto.digital_text().unwrap()).unwrap().shape {
        Shape::Text { content, .. } => assert_eq!(content, "2:35:07 pm"),
        other => panic!("expected text, got {:?}", other),
    }

    assert!(tracker.find(&"skipped".into()).is_none());
    assert_eq!(tracker.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn oversized_offsets_keep_faces_ticking_on_local_time() {
    let mut document = MemoryDocument::new();
    document.insert_with_id("parsed", "Marker:swissRail:50::1e300:showDigital");
    document.insert_with_id("direct", "other");
    let time = Arc::new(FixedTimeSource::new(at("2026-10-19T09:05:07+02:00")));
    let engine = engine_with(document, time);
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);

    assert_eq!(engine.discover().await.len(), 1);
    let direct = engine
        .add_clock(ClockOptions::new("direct").with_gmt_offset(1e12).with_digital(true))
        .await;
    let mut events = engine.subscribe_events();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(renders(&engine, "parsed").await, 2);
    assert_eq!(renders(&engine, "direct").await, 2);
    assert!(is_scheduled(&engine, "direct").await);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ClockEvent::Rendered { id, time } = event {
            seen.push((id, time));
        }
    }
    assert!(seen.contains(&(direct, WallTime::new(9, 5, 7))));

    let tracker = engine.tracker();
    let tracker = tracker.read().await;
    assert!(tracker.find(&"parsed".into()).unwrap().options().gmt_offset.is_none());
    let surface = engine.surface();
    let surface = surface.read().await;
    let text = tracker.find(&"parsed".into()).unwrap().digital_text().unwrap();
    match &surface.get(text).unwrap().shape {
        Shape::Text { content, .. } => assert_eq!(content, "9:05:07 am"),
        other => panic!("expected text, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn rediscovery_skips_existing_faces() {
    let mut document = MemoryDocument::new();
    document.insert("Marker:swissRail:40");
    let time = Arc::new(FixedTimeSource::new(at("2026-10-19T09:05:07Z")));
    let engine = engine_with(document, time);

    assert_eq!(engine.discover().await.len(), 1);
    assert!(engine.discover().await.is_empty());

    engine.document().write().await.insert("Marker:fancy:40");
    assert_eq!(engine.discover().await.len(), 1);
    assert!(engine
        .tracker()
        .read()
        .await
        .find(&"_dialclock_auto_id_1".into())
        .is_some());
}

#[tokio::test(start_paused = true)]
async fn auto_fill_follows_the_time_of_day() {
    let mut document = MemoryDocument::new();
    document.insert_with_id("sky", "Marker:nightanddaymini:50");
    let time = Arc::new(FixedTimeSource::new(at("2026-10-19T05:45:00+00:00")));
    let engine = engine_with(document, time.clone());
    let (_shutdown, shutdown_rx) = broadcast::channel(1);
    engine.spawn_dispatcher(shutdown_rx);
    engine.discover().await;

    let border_fill = |engine: Engine| async move {
        let border = engine
            .tracker()
            .read()
            .await
            .find(&"sky".into())
            .unwrap()
            .outer_border()
            .unwrap();
        engine
            .surface()
            .read()
            .await
            .get(border)
            .unwrap()
            .attributes
            .fill
            .clone()
    };

    // 15 minutes into dawn: 0.25 * 255 truncates to 63.
    assert_eq!(border_fill(engine.clone()).await.as_deref(), Some("#3f3f3f"));

    time.set(at("2026-10-19T19:00:00+00:00"));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(border_fill(engine.clone()).await.as_deref(), Some("#000000"));
}
