//! Scene demo application
//!
//! Headless host for the scene graph: builds a small panel with a title, a
//! close button, a spinning badge and a pinned overlay, then drives events,
//! updates and rendering for a fixed number of frames and logs the z-sorted
//! draw list.
//!
//! Usage: `scene_demo [config.toml|config.ron] [frames]`

use scene_core::foundation::math::transform_point_2d;
use scene_core::prelude::*;
use scene_core::scene::TextureHandle;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_FRAMES: u32 = 5;
const FRAME_STEP: Duration = Duration::from_millis(16);

/// Demo failures
#[derive(Error, Debug)]
enum DemoError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("scene: {0}")]
    Scene(#[from] SceneError),

    #[error("invalid frame count '{0}'")]
    FrameCount(String),
}

/// Static rectangle with a label
struct Quad {
    label: &'static str,
    size: Vec2,
}

impl NodeBehavior for Quad {
    fn draw(&mut self, ctx: &mut NodeContext<'_>, states: &mut RenderStates, renderer: &mut dyn Renderer) {
        log::trace!("drawing {}", self.label);
        renderer.submit(DrawCommand {
            node: ctx.id(),
            z_index: ctx.z_index(),
            states: *states,
            local_bounds: Some(AABB::from_position_size(Vec2::zeros(), self.size)),
        });
    }
}

/// Clickable rectangle counting presses that land on its collider
struct Button {
    label: &'static str,
    clicks: u32,
}

impl NodeBehavior for Button {
    fn handle_event(&mut self, ctx: &mut NodeContext<'_>, event: &mut Event) {
        let Some(press) = event.pointer_button() else {
            return;
        };
        if event.handled || !press.pressed {
            return;
        }
        let hit = ctx
            .components()
            .get::<ColliderComponent>()
            .is_some_and(|c| c.hit(press.position));
        if hit {
            self.clicks += 1;
            log::info!("{} clicked ({} total)", self.label, self.clicks);
            event.mark_handled();
        }
    }

    fn draw(&mut self, ctx: &mut NodeContext<'_>, states: &mut RenderStates, renderer: &mut dyn Renderer) {
        let bounds = ctx
            .components()
            .get::<ColliderComponent>()
            .map(BoundsProvider::model_bounds);
        renderer.submit(DrawCommand {
            node: ctx.id(),
            z_index: ctx.z_index(),
            states: *states,
            local_bounds: bounds,
        });
    }
}

/// Rotates its node at a constant rate
struct Spinner {
    radians_per_second: f32,
}

impl NodeBehavior for Spinner {
    fn update(&mut self, ctx: &mut NodeContext<'_>, dt: Duration) {
        if let Some(transform) = ctx.transform_mut() {
            transform.rotate(self.radians_per_second * dt.as_secs_f32());
        }
    }

    fn draw(&mut self, ctx: &mut NodeContext<'_>, states: &mut RenderStates, renderer: &mut dyn Renderer) {
        renderer.submit(DrawCommand {
            node: ctx.id(),
            z_index: ctx.z_index(),
            states: *states,
            local_bounds: Some(AABB::from_position_size(Vec2::zeros(), Vec2::new(32.0, 32.0))),
        });
    }
}

/// Node ids the frame loop looks at
struct Layout {
    panel: NodeId,
    close: NodeId,
    badge: NodeId,
}

fn build_scene(scene: &mut Scene) -> Result<Layout, DemoError> {
    let root = scene.root();

    let panel = scene.create_node_with(Quad {
        label: "panel",
        size: Vec2::new(320.0, 120.0),
    });
    scene.set_name(panel, "panel");
    scene.attach_child(root, panel)?;
    scene.add_component(panel, TransformComponent::new().with_position(Vec2::new(40.0, 40.0)));
    scene.add_component(panel, ColliderComponent::from_size(Vec2::new(320.0, 120.0)).non_pickable());
    scene.set_render_overrides(
        panel,
        RenderOverrides {
            texture: Some(TextureHandle(1)),
            ..RenderOverrides::default()
        },
    );

    let title = scene.create_node_with(Quad {
        label: "title",
        size: Vec2::new(120.0, 16.0),
    });
    scene.set_name(title, "title");
    scene.attach_child(panel, title)?;
    if let Some(t) = scene.add_component(title, TransformComponent::new()) {
        t.set_relative_alignment(Anchor::LEFT | Anchor::TOP, 8.0);
    }

    let close = scene.create_node_with(Button {
        label: "close",
        clicks: 0,
    });
    scene.set_name(close, "close");
    scene.attach_child(panel, close)?;
    scene.add_component(close, ColliderComponent::from_size(Vec2::new(16.0, 16.0)));
    if let Some(t) = scene.add_component(close, TransformComponent::new()) {
        t.set_origin_flags(OriginType::TRANSLATION, Anchor::RIGHT | Anchor::TOP);
        t.set_relative_alignment(Anchor::RIGHT | Anchor::TOP, 8.0);
    }

    let badge = scene.create_node_with(Spinner {
        radians_per_second: std::f32::consts::PI,
    });
    scene.set_name(badge, "badge");
    scene.attach_child(panel, badge)?;
    scene.add_component(badge, ColliderComponent::from_size(Vec2::new(32.0, 32.0)));
    if let Some(t) = scene.add_component(badge, TransformComponent::new()) {
        t.set_origin_flags(OriginType::ALL, Anchor::CENTER);
        t.set_relative_alignment(Anchor::CENTER, 0.0);
    }

    let overlay = scene.create_node();
    scene.set_name(overlay, "overlay");
    scene.attach_child(root, overlay)?;
    let mut pinned = TransformComponent::new();
    pinned.set_position(Vec2::zeros(), Some(1000.0), Some(true));
    scene.add_component(overlay, pinned);
    scene.set_render_overrides(
        overlay,
        RenderOverrides {
            blend: Some(BlendMode::Add),
            ..RenderOverrides::default()
        },
    );

    let tooltip = scene.create_node_with(Quad {
        label: "tooltip",
        size: Vec2::new(80.0, 20.0),
    });
    scene.set_name(tooltip, "tooltip");
    scene.attach_child(overlay, tooltip)?;
    scene.add_component(tooltip, TransformComponent::new().with_position(Vec2::new(300.0, 20.0)));

    log::info!("built scene with {} nodes", scene.len());
    Ok(Layout {
        panel,
        close,
        badge,
    })
}

/// Input script: one event per frame, cycling
fn scripted_event(frame: u32) -> Option<Event> {
    match frame % 4 {
        0 => Some(Event::pointer_moved_to(Vec2::new(344.0, 56.0))),
        1 => Some(Event::pointer_button_at(MouseButton::Left, true, Vec2::new(344.0, 56.0))),
        2 => Some(Event::key_input(KeyCode::Escape, true)),
        _ => None,
    }
}

fn run(config: SceneConfig, frames: u32) -> Result<(), DemoError> {
    let mut scene = Scene::with_config(config)?;
    let layout = build_scene(&mut scene)?;

    let last_z = scene.update_z_ordering_from_root();
    log::debug!("z-indices assigned up to {last_z}");

    // settle alignment and collider bounds before the first event
    scene.update(scene.root(), Duration::ZERO);

    let mut timer = Timer::fixed(FRAME_STEP);
    let mut resolver = GlobalTransformResolver::new();
    let mut queue = RenderQueue::new();

    for frame in 0..frames {
        let dt = timer.tick();
        let mut event = scripted_event(frame);
        if let Some(position) = event.as_ref().and_then(Event::pointer_position) {
            log::debug!("frame {frame}: pointer over {:?}", scene.pick(position));
        }

        queue.clear();
        scene.run_frame(event.as_mut(), dt, &mut queue);

        if let Some(global) = resolver.resolve(&scene, layout.badge) {
            let centre = transform_point_2d(&global, Vec2::new(16.0, 16.0));
            log::info!("frame {frame}: badge centre at ({:.1}, {:.1})", centre.x, centre.y);
        }
        for command in queue.sorted() {
            log::info!(
                "frame {frame}: z={:<5} {:<8} {:?}",
                command.z_index,
                scene.name(command.node).unwrap_or("?"),
                command.world_bounds()
            );
        }
    }

    let (hits, misses) = resolver.stats();
    log::info!(
        "ran {} frames ({:?} simulated); panel at z {:?}, close button at z {:?}; resolver {hits} hits / {misses} misses",
        timer.frame_count(),
        timer.total(),
        scene.z_index(layout.panel),
        scene.z_index(layout.close),
    );
    Ok(())
}

fn main() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SceneConfig::load(&path)?,
        None => SceneConfig::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw.parse().map_err(|_| DemoError::FrameCount(raw))?,
        None => DEFAULT_FRAMES,
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();
    log::info!("Starting scene demo ({frames} frames)");

    run(config, frames)?;
    log::info!("Scene demo finished successfully");
    Ok(())
}
