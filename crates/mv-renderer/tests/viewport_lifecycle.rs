//! Mount, config change and unmount sequences on the headless backend.

use approx::assert_relative_eq;
use glam::Vec3;
use mv_core::{Color, LoadError, ModelSource, ViewportConfig, load_model};
use mv_renderer::viewport::LoadReply;
use mv_renderer::{
    HeadlessBackend, LoadCompletion, LoadRequest, ModelLoader, RenderBackend, RendererConfig,
    ViewportController, ViewportEvent, ViewportStatus,
};

/// Loader that holds requests until the test completes them.
#[derive(Default)]
struct ManualLoader {
    pending: Vec<(LoadRequest, LoadReply)>,
}

impl ModelLoader for ManualLoader {
    fn request(&mut self, request: LoadRequest, reply: LoadReply) {
        self.pending.push((request, reply));
    }
}

impl ManualLoader {
    /// Parses the request issued for `generation` and delivers the result.
    fn complete(&mut self, generation: u64) {
        let index = self
            .pending
            .iter()
            .position(|(r, _)| r.generation == generation)
            .expect("no request for generation");
        let (request, reply) = self.pending.remove(index);
        let result = load_model(&request.source);
        reply
            .send(LoadCompletion { generation, result })
            .expect("viewport dropped");
    }

    fn fail(&mut self, generation: u64, reason: &str) {
        let index = self
            .pending
            .iter()
            .position(|(r, _)| r.generation == generation)
            .expect("no request for generation");
        let (_, reply) = self.pending.remove(index);
        reply
            .send(LoadCompletion {
                generation,
                result: Err(LoadError::Parse(reason.to_string())),
            })
            .expect("viewport dropped");
    }
}

type Viewport = ViewportController<HeadlessBackend, ManualLoader>;

fn viewport() -> Viewport {
    ViewportController::new(ManualLoader::default(), RendererConfig::default())
}

/// OBJ cube of edge `size` centered at `center`.
fn cube_obj(center: Vec3, size: f32) -> Vec<u8> {
    let h = size * 0.5;
    let mut obj = String::new();
    for i in 0..8 {
        let x = center.x + if i & 1 == 0 { -h } else { h };
        let y = center.y + if i & 2 == 0 { -h } else { h };
        let z = center.z + if i & 4 == 0 { -h } else { h };
        obj.push_str(&format!("v {} {} {}\n", x, y, z));
    }
    for face in [
        "1 3 4 2", "5 6 8 7", "1 2 6 5", "3 7 8 4", "1 5 7 3", "2 4 8 6",
    ] {
        obj.push_str(&format!("f {}\n", face));
    }
    obj.into_bytes()
}

fn cube_config(center: Vec3, size: f32) -> ViewportConfig {
    ViewportConfig::default().with_model(ModelSource::bytes("cube.obj", cube_obj(center, size)))
}

fn backend(viewport: &Viewport) -> &HeadlessBackend {
    viewport.backend().expect("viewport is mounted")
}

#[test]
fn test_empty_config_clears_without_loading() {
    let mut viewport = viewport();
    let config = ViewportConfig::default().with_background(Color::BLACK);
    viewport.on_mount(HeadlessBackend::default(), config);

    assert_eq!(viewport.status(), ViewportStatus::Empty);
    assert!(viewport.loader_mut().pending.is_empty());
    assert_eq!(backend(&viewport).clears(), &[Color::BLACK]);
    assert_eq!(
        viewport.drain_events(),
        vec![ViewportEvent::EmptyModel { generation: 1 }]
    );

    for _ in 0..3 {
        assert!(!viewport.frame());
    }
    assert_eq!(backend(&viewport).frames(), 0);
    assert!(viewport.scene().is_none());
}

#[test]
fn test_offset_cube_is_recentered_and_framed() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::splat(5.0), 2.0));
    assert_eq!(viewport.status(), ViewportStatus::Loading);
    assert!(viewport.is_loading());

    viewport.loader_mut().complete(1);
    assert_eq!(viewport.poll(), 1);
    assert_eq!(viewport.status(), ViewportStatus::Ready);
    assert!(viewport.is_running());

    let scene = viewport.scene().unwrap();
    let bounds = scene.model().unwrap().bounds();
    assert!(bounds.center().length() < 1e-5);
    assert_eq!(scene.camera().target, Vec3::ZERO);
    assert_relative_eq!(scene.camera().distance(), 3.6213, epsilon = 1e-3);

    match viewport.drain_events().as_slice() {
        [ViewportEvent::ModelInstalled { generation, distance, degenerate, .. }] => {
            assert_eq!(*generation, 1);
            assert_relative_eq!(*distance, 3.6213, epsilon = 1e-3);
            assert!(!degenerate);
        }
        other => panic!("unexpected events: {:?}", other),
    }

    assert!(viewport.frame());
    assert_eq!(backend(&viewport).frames(), 1);
    assert_eq!(backend(&viewport).last_draw_count(), 1);
}

#[test]
fn test_stale_load_is_discarded() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::ZERO, 1.0));
    viewport.on_config_change(cube_config(Vec3::splat(10.0), 4.0));
    assert_eq!(viewport.generation(), 2);

    // The newer load finishes first, the older one afterwards
    viewport.loader_mut().complete(2);
    viewport.poll();
    viewport.loader_mut().complete(1);
    viewport.poll();

    let scene = viewport.scene().unwrap();
    assert_eq!(scene.model().unwrap().generation(), 2);
    assert_relative_eq!(scene.model().unwrap().bounds().size().x, 4.0, epsilon = 1e-5);
    assert_eq!(backend(&viewport).live_meshes(), 1);

    let events = viewport.drain_events();
    assert!(events.contains(&ViewportEvent::StaleLoadDiscarded {
        generation: 1,
        current: 2
    }));
    assert_eq!(viewport.status(), ViewportStatus::Ready);
}

#[test]
fn test_stale_load_before_current_does_not_install() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::ZERO, 1.0));
    viewport.on_config_change(cube_config(Vec3::ZERO, 2.0));

    viewport.loader_mut().complete(1);
    viewport.poll();
    assert!(!viewport.scene().unwrap().has_model());
    assert_eq!(backend(&viewport).meshes_uploaded(), 0);
    assert_eq!(viewport.status(), ViewportStatus::Loading);

    viewport.loader_mut().complete(2);
    viewport.poll();
    assert_eq!(viewport.status(), ViewportStatus::Ready);
}

#[test]
fn test_only_latest_of_three_generations_installs() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::ZERO, 1.0));
    viewport.on_config_change(cube_config(Vec3::ZERO, 2.0));
    viewport.on_config_change(cube_config(Vec3::ZERO, 3.0));
    assert_eq!(viewport.generation(), 3);

    for generation in [3, 1, 2] {
        viewport.loader_mut().complete(generation);
        viewport.poll();
    }

    let model = viewport.scene().unwrap().model().unwrap();
    assert_eq!(model.generation(), 3);
    assert_relative_eq!(model.bounds().size().x, 3.0, epsilon = 1e-5);
    assert_eq!(backend(&viewport).meshes_uploaded(), 1);
    assert_eq!(backend(&viewport).live_resources(), 2);
    assert_eq!(viewport.status(), ViewportStatus::Ready);

    let stale: Vec<_> = viewport
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, ViewportEvent::StaleLoadDiscarded { .. }))
        .collect();
    assert_eq!(
        stale,
        vec![
            ViewportEvent::StaleLoadDiscarded { generation: 1, current: 3 },
            ViewportEvent::StaleLoadDiscarded { generation: 2, current: 3 },
        ]
    );
}

#[test]
fn test_config_changes_and_unmount_release_everything() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::ZERO, 1.0));
    viewport.loader_mut().complete(1);
    viewport.poll();

    for i in 0..20u64 {
        viewport.on_config_change(cube_config(Vec3::splat(i as f32), 1.0 + i as f32));
        viewport.loader_mut().complete(i + 2);
        viewport.poll();
        viewport.frame();
        // Current model only: one mesh and one material
        assert_eq!(backend(&viewport).live_resources(), 2);
    }

    let released = viewport.on_unmount().expect("backend returned");
    assert!(released.is_released());
    assert_eq!(released.live_resources(), 0);
    assert_eq!(released.meshes_uploaded(), released.meshes_released());
    assert_eq!(viewport.status(), ViewportStatus::Unmounted);
}

#[test]
fn test_unmount_with_pending_load_discards_result() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::ZERO, 1.0));
    let released = viewport.on_unmount().unwrap();

    viewport.loader_mut().complete(1);
    assert_eq!(viewport.poll(), 1);
    assert!(viewport.scene().is_none());
    assert_eq!(released.meshes_uploaded(), 0);
}

#[test]
fn test_cancelled_loop_stops_ticking() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::default(), cube_config(Vec3::ZERO, 1.0));
    viewport.loader_mut().complete(1);
    viewport.poll();

    let handle = viewport.loop_handle().expect("loop started");
    for _ in 0..5 {
        assert!(viewport.frame());
    }
    assert_eq!(backend(&viewport).frames(), 5);

    viewport.on_config_change(ViewportConfig::default());
    assert!(!handle.is_active());
    for _ in 0..5 {
        assert!(!viewport.frame());
    }
    assert_eq!(backend(&viewport).frames(), 5);
}

#[test]
fn test_load_failure_keeps_viewport_mounted() {
    let mut viewport = viewport();
    let config = cube_config(Vec3::ZERO, 1.0).with_background(Color::BLACK);
    viewport.on_mount(HeadlessBackend::default(), config);
    viewport.loader_mut().fail(1, "truncated file");
    viewport.poll();

    assert_eq!(viewport.status(), ViewportStatus::Failed);
    assert!(viewport.scene().is_some());
    assert!(!viewport.scene().unwrap().has_model());
    assert!(!viewport.is_running());
    assert_eq!(backend(&viewport).clears().last(), Some(&Color::BLACK));

    let events = viewport.drain_events();
    assert!(matches!(
        events.as_slice(),
        [ViewportEvent::LoadFailed { generation: 1, .. }]
    ));

    // A later config still works
    viewport.on_config_change(cube_config(Vec3::ZERO, 1.0));
    viewport.loader_mut().complete(2);
    viewport.poll();
    assert_eq!(viewport.status(), ViewportStatus::Ready);
}

#[test]
fn test_horizontal_lock_pins_azimuth() {
    let mut viewport = viewport();
    let config = cube_config(Vec3::ZERO, 1.0).with_rotation(false, true);
    viewport.on_mount(HeadlessBackend::default(), config);
    viewport.loader_mut().complete(1);
    viewport.poll();

    let polar_before = viewport.scene().unwrap().controls().polar();
    viewport.orbit(200.0, 0.0);
    viewport.frame();
    assert_relative_eq!(viewport.scene().unwrap().controls().azimuth(), 0.0, epsilon = 1e-5);

    viewport.orbit(0.0, 50.0);
    viewport.frame();
    let polar_after = viewport.scene().unwrap().controls().polar();
    assert!((polar_after - polar_before).abs() > 1e-3);
}

#[test]
fn test_zoom_lock_ignores_wheel() {
    let mut viewport = viewport();
    let config = cube_config(Vec3::ZERO, 1.0).with_zoom_enabled(false);
    viewport.on_mount(HeadlessBackend::default(), config);
    viewport.loader_mut().complete(1);
    viewport.poll();

    let distance = viewport.scene().unwrap().camera().distance();
    viewport.zoom(3.0);
    viewport.frame();
    assert_relative_eq!(viewport.scene().unwrap().camera().distance(), distance, epsilon = 1e-5);
}

#[test]
fn test_invalid_zoom_is_rejected() {
    let mut viewport = viewport();
    let config = cube_config(Vec3::ZERO, 1.0).with_zoom(0.0);
    viewport.on_mount(HeadlessBackend::default(), config);

    assert_eq!(viewport.status(), ViewportStatus::Failed);
    assert!(viewport.loader_mut().pending.is_empty());
    assert!(matches!(
        viewport.drain_events().as_slice(),
        [ViewportEvent::ConfigRejected { generation: 1, .. }]
    ));
    assert_eq!(backend(&viewport).clears().len(), 1);
}

#[test]
fn test_resize_replays_config() {
    let mut viewport = viewport();
    viewport.on_mount(HeadlessBackend::new(400, 300), cube_config(Vec3::ZERO, 1.0));
    viewport.loader_mut().complete(1);
    viewport.poll();

    viewport.on_resize(400, 300);
    assert_eq!(viewport.generation(), 1);

    viewport.on_resize(800, 400);
    assert_eq!(viewport.generation(), 2);
    assert_eq!(backend(&viewport).size(), (800, 400));
    viewport.loader_mut().complete(2);
    viewport.poll();
    assert_relative_eq!(viewport.scene().unwrap().camera().aspect, 2.0, epsilon = 1e-5);
}
