//! End-to-end frames through the full pipeline.

use std::io::Cursor;

use rasterline::colors;
use rasterline::math::Vec3;
use rasterline::mesh::Mesh;
use rasterline::render::{FrameStats, RenderMode, RenderSettings, Renderer, FAR_DEPTH};
use rasterline::scene::Scene;

const SIZE: u32 = 100;

fn render_with(workers: usize, settings: RenderSettings, scene: &Scene) -> (Renderer, FrameStats) {
    let mut renderer = Renderer::new(SIZE, SIZE, settings, Some(workers)).unwrap();
    let stats = renderer.render(scene);
    (renderer, stats)
}

/// Cube turned so three faces and their shared edges are visible.
fn turned_cube() -> Scene {
    let mut scene = Scene::new(Mesh::unit_cube());
    scene
        .model
        .set_rotation(Vec3::new(20f32.to_radians(), 30f32.to_radians(), 0.0));
    scene
}

#[test_log::test]
fn cube_covers_center_and_leaves_corners_clear() {
    let scene = Scene::new(Mesh::unit_cube());
    let (renderer, stats) = render_with(4, RenderSettings::default(), &scene);
    let buffer = renderer.front_buffer();

    let mid = SIZE as i32 / 2;
    assert!(buffer.depth_at(mid, mid).unwrap() < FAR_DEPTH);
    assert_ne!(buffer.get_pixel(mid, mid), Some(colors::BACKGROUND));

    let last = SIZE as i32 - 1;
    for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
        assert_eq!(buffer.depth_at(x, y), Some(FAR_DEPTH));
        assert_eq!(buffer.get_pixel(x, y), Some(colors::BACKGROUND));
    }

    // Only the front face looks at the camera.
    assert_eq!(stats.triangles, 12);
    assert_eq!(stats.drawn, 2);
    assert_eq!(stats.culled, 10);
    assert_eq!(stats.rejected, 0);
}

#[test_log::test]
fn frame_is_identical_for_any_worker_count() {
    let scene = turned_cube();
    let (reference, reference_stats) = render_with(1, RenderSettings::default(), &scene);

    for workers in [2, 3, 7] {
        let (renderer, stats) = render_with(workers, RenderSettings::default(), &scene);
        assert_eq!(renderer.front_buffer().pixels(), reference.front_buffer().pixels());
        assert_eq!(renderer.front_buffer().depths(), reference.front_buffer().depths());
        // Fragment counts include overwritten pixels and vary with timing.
        assert_eq!(
            (stats.drawn, stats.culled, stats.rejected, stats.degenerate),
            (
                reference_stats.drawn,
                reference_stats.culled,
                reference_stats.rejected,
                reference_stats.degenerate
            )
        );
    }
}

#[test_log::test]
fn consecutive_frames_do_not_leak_into_each_other() {
    let mut renderer = Renderer::new(SIZE, SIZE, RenderSettings::default(), Some(3)).unwrap();
    let mut scene = turned_cube();
    renderer.render(&scene);

    scene.model.set_position(Vec3::new(5.0, 0.0, 0.0));
    renderer.render(&scene);
    renderer.render(&scene);

    let buffer = renderer.front_buffer();
    assert!(buffer.pixels().iter().all(|&p| p == colors::BACKGROUND));
    assert!(buffer.depths().iter().all(|&d| d == FAR_DEPTH));
}

#[test_log::test]
fn wireframe_draws_far_fewer_pixels_than_fill() {
    let scene = turned_cube();
    let (filled, _) = render_with(2, RenderSettings::default(), &scene);
    let (wire, _) = render_with(
        2,
        RenderSettings {
            render_mode: RenderMode::Wireframe,
            ..RenderSettings::default()
        },
        &scene,
    );

    let covered = |renderer: &Renderer| {
        renderer
            .front_buffer()
            .pixels()
            .iter()
            .filter(|&&p| p != colors::BACKGROUND)
            .count()
    };

    let wire_pixels = wire.front_buffer().pixels();
    assert!(wire_pixels.contains(&colors::WIREFRAME));
    assert!(wire_pixels
        .iter()
        .all(|&p| p == colors::WIREFRAME || p == colors::BACKGROUND));
    assert!(covered(&wire) * 2 < covered(&filled));
}

#[test_log::test]
fn obj_model_renders() {
    let obj = "\
v -0.5 -0.5 0.0
v 0.5 -0.5 0.0
v 0.0 0.5 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.5 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";
    let mesh = Mesh::from_obj_reader("triangle", &mut Cursor::new(obj)).unwrap();
    let (renderer, stats) = render_with(2, RenderSettings::default(), &Scene::new(mesh));

    assert_eq!(stats.drawn, 1);
    assert!(stats.fragments > 0);
    let mid = SIZE as i32 / 2;
    assert!(renderer.front_buffer().depth_at(mid, mid).unwrap() < FAR_DEPTH);
}
