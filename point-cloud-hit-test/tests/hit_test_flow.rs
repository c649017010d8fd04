use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bevy::prelude::*;
use point_cloud_hit_test::prelude::*;

type Log = Arc<Mutex<Vec<HitTestEvent>>>;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Camera at the origin looking down -Z.
fn camera() -> CameraProjection {
    CameraProjection::perspective(&Transform::IDENTITY, std::f32::consts::FRAC_PI_4, 1.0, 0.1)
}

/// Points straight ahead of the camera at 10, 20 and 6000 units, plus one off to the side.
fn cloud() -> SharedPointCloud {
    let cloud = SharedPointCloud::new();
    cloud
        .init_with_new_coordinates(vec![
            0.0, 0.0, -20.0, //
            0.0, 0.0, -10.0, //
            0.0, 0.0, -6000.0, //
            30.0, 0.0, -10.0,
        ])
        .unwrap();
    cloud
}

fn hit_test_over(cloud: SharedPointCloud, settings: HitTestSettings) -> (HitTest, Log) {
    let mut hit_test = HitTest::builder()
        .source(cloud)
        .settings(settings)
        .build()
        .unwrap();
    hit_test.resize(100.0, 100.0);

    let log: Log = Arc::new(Mutex::new(Vec::new()));
    for kind in HitTestEventKind::ALL {
        let log = log.clone();
        hit_test.on(kind, move |event| log.lock().unwrap().push(event.clone()));
    }
    (hit_test, log)
}

fn inline() -> HitTestSettings {
    HitTestSettings {
        background_build: false,
        ..Default::default()
    }
}

fn kinds(log: &Log) -> Vec<HitTestEventKind> {
    use point_cloud_hit_test::engine::events::BusEvent;
    log.lock().unwrap().iter().map(BusEvent::kind).collect()
}

fn count(log: &Log, kind: HitTestEventKind) -> usize {
    kinds(log).into_iter().filter(|k| *k == kind).count()
}

fn take(log: &Log) -> Vec<HitTestEvent> {
    std::mem::take(&mut *log.lock().unwrap())
}

#[test]
fn nothing_happens_until_the_pointer_moves() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    for _ in 0..5 {
        hit_test.update(&camera());
    }
    assert!(log.lock().unwrap().is_empty());
    assert!(matches!(hit_test.index_state(), IndexState::Empty));
}

#[test]
fn first_active_frame_builds_then_reports_hits_nearest_first() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());

    let kinds = kinds(&log);
    assert_eq!(kinds.last(), Some(&HitTestEventKind::Over));
    assert!(kinds.contains(&HitTestEventKind::Ready));
    let first_ready = kinds.iter().position(|k| *k == HitTestEventKind::Ready).unwrap();
    assert!(
        kinds[..first_ready]
            .iter()
            .all(|k| *k == HitTestEventKind::Progress),
        "progress precedes ready"
    );

    let Some(HitTestEvent::Over(pointer)) = take(&log).pop() else {
        panic!("expected an over event");
    };
    // The 6000 unit point is beyond the default 5000 limit.
    assert_eq!(pointer.indexes.as_deref(), Some(&[1u32, 0][..]));
    assert_eq!((pointer.x, pointer.y), (50.0, 50.0));
    assert!(!pointer.down);
    let ray = pointer.ray.unwrap();
    assert!(ray.direction.as_vec3().abs_diff_eq(Vec3::NEG_Z, 1e-4));
}

#[test]
fn progress_is_monotonic_and_ends_at_one() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());

    let progress: Vec<f32> = take(&log)
        .into_iter()
        .filter_map(|event| match event {
            HitTestEvent::Progress(fraction) => Some(fraction),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(progress.last(), Some(&1.0));
}

#[test]
fn queries_stop_after_the_quiescence_window() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());
    hit_test.advance_timers(ms(50));
    hit_test.update(&camera());
    assert_eq!(count(&log, HitTestEventKind::Over), 2);

    hit_test.advance_timers(ms(50));
    assert_eq!(hit_test.phase(), InteractionPhase::Idle);
    hit_test.update(&camera());
    hit_test.update(&camera());
    assert_eq!(count(&log, HitTestEventKind::Over), 2);

    hit_test.pointer_moved(Vec2::new(51.0, 50.0));
    hit_test.update(&camera());
    assert_eq!(count(&log, HitTestEventKind::Over), 3);
}

#[test]
fn moving_camera_suppresses_queries() {
    let motion = CameraMotionFlag::default();
    let mut hit_test = HitTest::builder()
        .source(cloud())
        .camera_motion(motion.clone())
        .settings(inline())
        .build()
        .unwrap();
    let overs = Arc::new(Mutex::new(0usize));
    let counter = overs.clone();
    hit_test.on(HitTestEventKind::Over, move |_| *counter.lock().unwrap() += 1);

    hit_test.pointer_moved(Vec2::ZERO);
    motion.set_moving(true);
    hit_test.update(&camera());
    assert_eq!(*overs.lock().unwrap(), 0);

    motion.set_moving(false);
    hit_test.update(&camera());
    assert_eq!(*overs.lock().unwrap(), 1);
}

#[test]
fn click_fires_after_the_window_with_the_last_hits() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());
    take(&log);

    hit_test.pointer_pressed(MouseButton::Left);
    hit_test.pointer_released(MouseButton::Left);
    hit_test.advance_timers(ms(299));
    assert_eq!(count(&log, HitTestEventKind::Click), 0);

    hit_test.advance_timers(ms(1));
    let events = take(&log);
    assert_eq!(events.len(), 1);
    let HitTestEvent::Click(pointer) = &events[0] else {
        panic!("expected a click, got {:?}", events[0]);
    };
    assert_eq!(pointer.nearest(), Some(1));
    assert!(!pointer.down);
}

#[test]
fn drag_does_not_click() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_pressed(MouseButton::Left);
    hit_test.pointer_moved(Vec2::new(10.0, 10.0));
    hit_test.pointer_moved(Vec2::new(20.0, 10.0));
    hit_test.pointer_released(MouseButton::Left);
    hit_test.advance_timers(ms(1000));

    assert_eq!(count(&log, HitTestEventKind::Click), 0);
    assert!(!hit_test.pointer().down);
}

#[test]
fn second_press_replaces_the_pending_click_with_a_double_click() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_pressed(MouseButton::Left);
    hit_test.pointer_released(MouseButton::Left);
    hit_test.advance_timers(ms(120));
    hit_test.pointer_pressed(MouseButton::Left);
    assert_eq!(kinds(&log), vec![HitTestEventKind::DoubleClick]);

    // The first pending click never fires.
    hit_test.advance_timers(ms(250));
    assert_eq!(kinds(&log), vec![HitTestEventKind::DoubleClick]);
}

#[test]
fn non_primary_buttons_are_ignored() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_pressed(MouseButton::Right);
    hit_test.pointer_released(MouseButton::Right);
    hit_test.advance_timers(ms(1000));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn touch_end_clicks_on_the_next_turn() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.touch_started(&[Vec2::new(50.0, 50.0)]);
    hit_test.update(&camera());
    take(&log);

    hit_test.touch_ended(&[]);
    assert!(log.lock().unwrap().is_empty());
    hit_test.advance_timers(Duration::ZERO);
    let events = take(&log);
    assert!(matches!(&events[..], [HitTestEvent::Click(pointer)] if pointer.nearest() == Some(1)));
}

#[test]
fn destroy_silences_everything() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.pointer_pressed(MouseButton::Left);
    hit_test.pointer_released(MouseButton::Left);

    hit_test.destroy();
    hit_test.destroy();
    assert!(hit_test.is_destroyed());

    hit_test.update(&camera());
    hit_test.advance_timers(ms(1000));
    hit_test.pointer_moved(Vec2::new(10.0, 10.0));
    hit_test.pointer_pressed(MouseButton::Left);
    hit_test.update(&camera());

    assert!(log.lock().unwrap().is_empty());
    assert!(hit_test.index().is_none());
}

#[test]
fn new_geometry_rebuilds_the_index() {
    let shared = cloud();
    let (mut hit_test, log) = hit_test_over(shared.clone(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());
    let first = hit_test.index().unwrap().clone();

    // Same snapshot: no rebuild.
    hit_test.update(&camera());
    assert!(Arc::ptr_eq(&first, hit_test.index().unwrap()));
    assert_eq!(count(&log, HitTestEventKind::Ready), 1);

    shared
        .set_coordinates(vec![
            0.0, 0.0, -5.0, //
            0.0, 0.0, -3.0, //
            0.0, 50.0, -10.0, //
            0.0, 0.0, -4.0,
        ])
        .unwrap();
    take(&log);
    hit_test.update(&camera());

    assert!(!Arc::ptr_eq(&first, hit_test.index().unwrap()));
    let events = take(&log);
    assert!(matches!(events.last(), Some(HitTestEvent::Over(p)) if p.indexes.as_deref() == Some(&[1u32, 3, 0][..])));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, HitTestEvent::Ready(_)))
            .count(),
        1
    );
}

#[test]
fn missing_geometry_is_skipped_silently() {
    let shared = SharedPointCloud::new();
    let (mut hit_test, log) = hit_test_over(shared.clone(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());
    assert!(log.lock().unwrap().is_empty());

    shared.init_with_new_coordinates(vec![0.0, 0.0, -10.0]).unwrap();
    hit_test.update(&camera());
    assert_eq!(count(&log, HitTestEventKind::Over), 1);
}

#[test]
fn background_build_reports_ready_before_queries_run() {
    let settings = HitTestSettings {
        background_build: true,
        ..Default::default()
    };
    let (mut hit_test, log) = hit_test_over(cloud(), settings);

    let deadline = Instant::now() + Duration::from_secs(10);
    while count(&log, HitTestEventKind::Over) == 0 {
        assert!(Instant::now() < deadline, "background build never became ready");
        // Keep the pointer active while the worker runs.
        hit_test.pointer_moved(Vec2::new(50.0, 50.0));
        hit_test.update(&camera());
        std::thread::sleep(Duration::from_millis(1));
    }

    let kinds = kinds(&log);
    let ready = kinds.iter().position(|k| *k == HitTestEventKind::Ready).unwrap();
    let over = kinds.iter().position(|k| *k == HitTestEventKind::Over).unwrap();
    assert!(ready < over);
}

#[test]
fn unsubscribed_listeners_stop_receiving() {
    let (mut hit_test, log) = hit_test_over(cloud(), inline());
    let extra = Arc::new(Mutex::new(0usize));
    let counter = extra.clone();
    let id = hit_test.on(HitTestEventKind::Over, move |_| *counter.lock().unwrap() += 1);

    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());
    assert_eq!(*extra.lock().unwrap(), 1);

    assert_eq!(hit_test.off(HitTestEventKind::Over, Some(id)), 1);
    hit_test.update(&camera());
    assert_eq!(*extra.lock().unwrap(), 1);
    assert_eq!(count(&log, HitTestEventKind::Over), 2);

    hit_test.off_all();
    hit_test.update(&camera());
    assert_eq!(count(&log, HitTestEventKind::Over), 2);
}

#[test]
fn failed_build_is_not_retried_until_geometry_changes() {
    let shared = SharedPointCloud::new();
    shared
        .init_with_new_coordinates(vec![0.0, 0.0, -10.0, 0.0, f32::NAN, -20.0])
        .unwrap();
    let (mut hit_test, log) = hit_test_over(shared.clone(), inline());
    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());

    assert_eq!(kinds(&log), vec![HitTestEventKind::Failed]);
    assert!(matches!(hit_test.index_state(), IndexState::Failed(_)));

    // Same snapshot: the failure sticks and nothing is queried.
    for _ in 0..3 {
        hit_test.pointer_moved(Vec2::new(50.0, 50.0));
        hit_test.update(&camera());
    }
    assert_eq!(kinds(&log), vec![HitTestEventKind::Failed]);
    take(&log);

    shared.init_with_new_coordinates(vec![0.0, 0.0, -10.0]).unwrap();
    hit_test.update(&camera());
    assert_eq!(count(&log, HitTestEventKind::Failed), 0);
    assert_eq!(count(&log, HitTestEventKind::Ready), 1);
    assert!(matches!(take(&log).last(), Some(HitTestEvent::Over(p)) if p.nearest() == Some(0)));
}

#[test]
fn superseded_background_build_never_surfaces() {
    let settings = HitTestSettings {
        background_build: true,
        ..Default::default()
    };
    let shared = SharedPointCloud::new();
    let large: Vec<f32> = (0..400_000)
        .flat_map(|i| {
            let i = i as f32;
            [i % 640.0, (i / 640.0).floor(), -100.0]
        })
        .collect();
    shared.init_with_new_coordinates(large).unwrap();
    let (mut hit_test, log) = hit_test_over(shared.clone(), settings);

    hit_test.pointer_moved(Vec2::new(50.0, 50.0));
    hit_test.update(&camera());
    take(&log);

    shared
        .init_with_new_coordinates(vec![0.0, 0.0, -10.0, 0.0, 0.0, -30.0])
        .unwrap();
    let replacement = shared.points().unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while count(&log, HitTestEventKind::Over) == 0 {
        assert!(Instant::now() < deadline, "replacement build never became ready");
        hit_test.pointer_moved(Vec2::new(50.0, 50.0));
        hit_test.update(&camera());
        std::thread::sleep(Duration::from_millis(1));
    }

    let events = take(&log);
    let progress: Vec<f32> = events
        .iter()
        .filter_map(|event| match event {
            HitTestEvent::Progress(fraction) => Some(*fraction),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));

    let ready: Vec<&Arc<PointOctree>> = events
        .iter()
        .filter_map(|event| match event {
            HitTestEvent::Ready(tree) => Some(tree),
            _ => None,
        })
        .collect();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].len(), 2);
    assert!(ready[0].points().same_snapshot(&replacement));
    assert!(hit_test.index().unwrap().points().same_snapshot(&replacement));
}
