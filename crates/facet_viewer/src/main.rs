//! Facet viewer: renders a demo scene to PNG.
//!
//! Usage:
//!   facet_viewer [--method NAME | --all] [--state camera.json]
//!                [--save-state camera.json] [--output frame.png]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use facet_core::{Mesh, OwnerPose, RenderMode, Rgba, Scene, Texture};
use facet_math::{Vec2, Vec3};
use facet_renderer::{Camera, CameraState, RenderMethod};

#[derive(Debug, Default)]
struct Args {
    method: Option<String>,
    all: bool,
    state: Option<PathBuf>,
    save_state: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().with_context(|| format!("{} needs a value", name));
        match arg.as_str() {
            "--method" => args.method = Some(value("--method")?),
            "--all" => args.all = true,
            "--state" => args.state = Some(value("--state")?.into()),
            "--save-state" => args.save_state = Some(value("--save-state")?.into()),
            "--output" | "-o" => args.output = Some(value("--output")?.into()),
            "--help" | "-h" => {
                println!(
                    "Usage: facet_viewer [--method NAME | --all] [--state FILE] [--save-state FILE] [--output FILE]"
                );
                println!(
                    "Methods: {}",
                    RenderMethod::ALL.map(RenderMethod::name).join(", ")
                );
                std::process::exit(0);
            }
            other => bail!("Unknown argument '{}'", other),
        }
    }

    Ok(args)
}

/// A few cubes, a textured billboard and two outlined meshes.
fn demo_scene() -> Scene {
    let checker = Arc::new(Texture::checker(
        64,
        8,
        Rgba::rgb(230, 230, 230),
        Rgba::rgb(40, 90, 200),
    ));

    let mut scene = Scene::new();
    scene.add(Mesh::cube(Vec3::new(8.0, -2.0, 0.0), 1.0).with_color(Rgba::rgb(200, 80, 60)));
    scene.add(Mesh::cube(Vec3::new(11.0, 1.5, 0.5), 1.5).with_color(Rgba::rgb(80, 180, 90)));
    scene.add(Mesh::cube(Vec3::new(6.0, 0.5, -1.0), 0.6).with_color(Rgba::rgb(220, 200, 70)));
    scene.add(
        Mesh::cube(Vec3::new(9.0, -0.5, 2.0), 0.8)
            .with_render_mode(RenderMode::Both)
            .with_color(Rgba::rgb(120, 120, 220))
            .with_wireframe_color(Rgba::rgb(255, 255, 0)),
    );
    scene.add(
        Mesh::cube(Vec3::new(14.0, -4.0, 1.0), 1.2)
            .with_render_mode(RenderMode::Wireframe)
            .with_wireframe_color(Rgba::rgb(0, 255, 255)),
    );
    scene.add(Mesh::billboard(Vec3::new(16.0, 0.0, 0.0), 4.0).with_texture(checker));
    scene
}

fn write_png(camera: &Camera, path: &Path) -> Result<()> {
    let target = camera.target();
    let image = image::RgbaImage::from_raw(target.width(), target.height(), target.as_bytes().to_vec())
        .context("Render target size does not match its pixel buffer")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = parse_args()?;
    log::info!("Starting Facet Viewer");

    let mut camera = match &args.state {
        Some(path) => {
            let state = CameraState::load(path)
                .with_context(|| format!("Failed to load camera state from {}", path.display()))?;
            Camera::from_state(&state)
        }
        None => Camera::default(),
    };
    if let Some(method) = &args.method {
        camera.set_rendering_method_by_name(method);
    }

    let scene = demo_scene();
    let owner = OwnerPose::new(Vec2::ZERO, 0.0, 0.5);
    let output = args.output.unwrap_or_else(|| PathBuf::from("frame.png"));

    let methods: Vec<RenderMethod> = if args.all {
        RenderMethod::ALL.to_vec()
    } else {
        vec![camera.settings().rendering_method]
    };

    for method in methods {
        camera.configure(|s| s.rendering_method = method);
        camera.render(&scene, &owner);

        let path = if args.all {
            let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
            output.with_file_name(format!("{}_{}.png", stem, method))
        } else {
            output.clone()
        };
        write_png(&camera, &path)?;
    }

    if let Some(path) = &args.save_state {
        camera
            .save_state()
            .save(path)
            .with_context(|| format!("Failed to save camera state to {}", path.display()))?;
        log::info!("Saved camera state to {}", path.display());
    }

    Ok(())
}
