//! raypick demo
//!
//! Builds a small scene (or loads an STL file), simulates the asynchronous mesh
//! load, then sweeps a virtual cursor over the viewport and logs every pick.
//!
//! ```text
//! raypick [model.stl] [--config picking.toml]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use raypick::{
    Camera, DebugLines, Mesh, MeshId, PickingConfig, PickingScene, SceneNode, Transform, Vec2,
    Vec3, Viewport, load_stl,
};

const CUBE: MeshId = MeshId(0);
const FLOOR: MeshId = MeshId(1);
const MODEL: MeshId = MeshId(2);

/// Cursor positions per viewport axis in the sweep.
const SWEEP_STEPS: usize = 8;

#[derive(Default)]
struct Args {
    model: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a file path")?;
                args.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("unknown flag '{flag}'"),
            _ if args.model.is_none() => args.model = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument '{arg}'"),
        }
    }

    Ok(args)
}

/// Root scaled by 10 holding either the loaded model or a cube on a floor.
fn build_hierarchy(has_model: bool) -> SceneNode {
    let root = SceneNode::group("root").with_transform(Transform::new().uniform_scale(10.0));

    if has_model {
        return root.with_child(
            SceneNode::mesh("model", MODEL).with_transform(Transform::new().uniform_scale(0.05)),
        );
    }

    root.with_child(
        SceneNode::mesh("cube", CUBE).with_transform(
            Transform::from_position(Vec3::new(0.0, 0.025, 0.0)).uniform_scale(0.05),
        ),
    )
    .with_child(SceneNode::mesh("floor", FLOOR).with_transform(Transform::new().uniform_scale(0.1)))
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => PickingConfig::load(path)?,
        None => PickingConfig::default(),
    };

    let camera = Camera::new()
        .at(0.0, 0.8, 1.5)
        .rotated(-30.0, 0.0)
        .clip_planes(0.1, 100.0);
    let mut scene = PickingScene::new(camera, config);
    let viewport = Viewport::sized(800.0, 600.0);
    let mut lines = DebugLines::with_capacity(4);

    scene.on_hierarchy_loaded(&build_hierarchy(args.model.is_some()));

    // Nothing is pickable until the mesh data arrives.
    let early = scene.frame(viewport.center(), viewport, &mut lines);
    info!(hit = early.is_some(), segments = lines.segment_count(), "frame before mesh load");

    match &args.model {
        Some(path) => {
            let model = load_stl(path)
                .with_context(|| format!("Failed to load model '{}'", path.display()))?;
            scene.on_mesh_loaded(MODEL, &model);
        }
        None => {
            scene.on_mesh_loaded(CUBE, &Mesh::cube());
            scene.on_mesh_loaded(FLOOR, &Mesh::plane(2.0));
        }
    }

    let mut hits = 0;
    for row in 0..SWEEP_STEPS {
        for col in 0..SWEEP_STEPS {
            let cursor = Vec2::new(
                viewport.width * (col as f32 + 0.5) / SWEEP_STEPS as f32,
                viewport.height * (row as f32 + 0.5) / SWEEP_STEPS as f32,
            );

            match scene.frame(cursor, viewport, &mut lines) {
                Some(hit) => {
                    hits += 1;
                    info!(
                        x = cursor.x,
                        y = cursor.y,
                        mesh = hit.mesh,
                        triangle = hit.triangle,
                        distance = hit.distance,
                        segments = lines.segment_count(),
                        "picked"
                    );
                }
                None => info!(x = cursor.x, y = cursor.y, segments = lines.segment_count(), "miss"),
            }
        }
    }

    info!(
        hits,
        frames = SWEEP_STEPS * SWEEP_STEPS,
        meshes = scene.geometry().len(),
        "sweep finished"
    );
    Ok(())
}
