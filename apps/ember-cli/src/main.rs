use anyhow::Context;
use clap::{Parser, Subcommand};
use ember_camera::{Camera, Projection};
use ember_common::{CameraConfig, EngineConfig, Transform};
use ember_gl::{GlBackend, GlCall, RecordingBackend};
use ember_input::{FrameInput, Key};
use ember_render::{BASIC_FRAGMENT_SHADER, BASIC_VERTEX_SHADER, MeshData, Model, Shader};
use glam::Mat4;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ember-cli", about = "CLI tool for ember rendering operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Print a projection matrix
    Projection {
        /// Vertical field of view in degrees (perspective only)
        #[arg(long, default_value = "70")]
        fov: f32,
        /// Width divided by height
        #[arg(long, default_value = "1.7777778")]
        aspect: f32,
        #[arg(long, default_value = "0.01")]
        near: f32,
        #[arg(long, default_value = "1000")]
        far: f32,
        /// Build an orthographic projection with this vertical extent instead
        #[arg(long)]
        ortho_height: Option<f32>,
    },
    /// Render frames against a recording backend and print the GL calls
    Trace {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "2")]
        frames: u32,
        /// Shader base path, overriding the config
        #[arg(short, long)]
        shader: Option<PathBuf>,
        /// Emit the calls as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration to a file
    WriteConfig {
        /// Output path
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Info => {
            println!("ember-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", ember_common::crate_info());
            println!("gl: {}", ember_gl::crate_info());
            println!("input: {}", ember_input::crate_info());
            println!("render: {}", ember_render::crate_info());
            println!("camera: {}", ember_camera::crate_info());
        }
        Commands::Projection {
            fov,
            aspect,
            near,
            far,
            ortho_height,
        } => {
            let projection = match ortho_height {
                Some(height) => Projection::Orthographic {
                    height,
                    aspect,
                    near,
                    far,
                },
                None => Projection::Perspective {
                    fov: fov.to_radians(),
                    aspect,
                    near,
                    far,
                },
            };
            println!("{projection:?}");
            print_matrix(&projection.matrix());
        }
        Commands::Trace {
            frames,
            shader,
            json,
        } => {
            let shader = shader.or(config.shader.clone());
            let calls = trace(&config, shader, frames)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&calls)?);
            } else {
                for (i, call) in calls.iter().enumerate() {
                    println!("{i:4}  {call:?}");
                }
                println!("{} calls", calls.len());
            }
        }
        Commands::WriteConfig { path } => {
            config.save(&path)?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}

/// Row-major printout.
fn print_matrix(m: &Mat4) {
    for r in 0..4 {
        let row = m.row(r);
        println!(
            "[{:>12.6} {:>12.6} {:>12.6} {:>12.6}]",
            row.x, row.y, row.z, row.w
        );
    }
}

fn perspective_camera(config: &CameraConfig, aspect: f32) -> Camera {
    Camera::perspective(config.fov_degrees.to_radians(), aspect, config.near, config.far)
        .with_transform(Transform::from_position(config.start_position))
}

/// Input for frame `i`: walk forward, look right on even frames, boost on the last one.
fn scripted_input(i: u32, frames: u32) -> FrameInput {
    let mut input = FrameInput::idle().with_key(Key::W);
    if i % 2 == 0 {
        input = input.with_mouse_delta(2.0, 0.0);
    }
    if i + 1 == frames {
        input = input.with_key(Key::LeftShift);
    }
    input
}

fn draw_frame<B: GlBackend>(shader: &Shader<B>, model: &Model<B>, camera: &Camera) {
    let Some(view_projection) = camera.view_projection() else {
        return;
    };
    shader.bind();
    shader.set_uniform_f32("u_tint", &[1.0, 1.0, 1.0, 1.0]);
    shader.set_uniform_mat4("u_mvp", &view_projection);
    model.draw();
    shader.unbind();
}

/// Run the full pipeline headless and return every recorded call,
/// resource release included.
fn trace(config: &EngineConfig, shader: Option<PathBuf>, frames: u32) -> anyhow::Result<Vec<GlCall>> {
    let gl = Arc::new(RecordingBackend::new());
    let width = config.window.width;
    let height = config.window.height;

    let shader = match shader {
        Some(base) => Shader::load(gl.clone(), &base)
            .with_context(|| format!("failed to build shader {}", base.display()))?,
        None => Shader::from_sources(gl.clone(), BASIC_VERTEX_SHADER, BASIC_FRAGMENT_SHADER)
            .context("failed to build the built-in shader")?,
    };
    let mesh = MeshData::cube();
    let model = Model::from_vertices(gl.clone(), &mesh.vertices, &mesh.indices)?;

    let mut camera = perspective_camera(&config.camera, width as f32 / height.max(1) as f32);
    camera.adjust_to_viewport(gl.as_ref(), width, height);

    let dt = 1.0 / 60.0;
    for i in 0..frames {
        let input = scripted_input(i, frames);
        camera.process_input(
            &input,
            dt,
            config.camera.move_speed,
            config.camera.mouse_sensitivity,
        );
        draw_frame(&shader, &model, &camera);
    }

    if let Some(t) = camera.transform() {
        tracing::info!(
            "camera after {frames} frames: ({:.3}, {:.3}, {:.3})",
            t.position.x,
            t.position.y,
            t.position.z
        );
    }

    drop(model);
    drop(shader);
    tracing::debug!("{} objects still live", gl.live_objects());
    Ok(gl.take_calls())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_boosts_only_the_last_frame() {
        use ember_input::InputSource;
        assert!(!scripted_input(0, 3).is_key_down(Key::LeftShift));
        assert!(scripted_input(2, 3).is_key_down(Key::LeftShift));
        assert_eq!(scripted_input(1, 3).mouse_delta().x, 0.0);
        assert_eq!(scripted_input(0, 3).mouse_delta().x, 2.0);
    }

    #[test]
    fn trace_draws_once_per_frame_and_releases_everything() {
        let calls = trace(&EngineConfig::default(), None, 3).unwrap();
        let draws = calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements { count: 36, .. }))
            .count();
        assert_eq!(draws, 3);
        assert!(calls.contains(&GlCall::Viewport {
            x: 0,
            y: 0,
            width: 1280,
            height: 720
        }));
        assert_eq!(calls.last(), Some(&GlCall::DeleteProgram(1)));
    }

    #[test]
    fn trace_with_missing_shader_fails() {
        let result = trace(
            &EngineConfig::default(),
            Some(PathBuf::from("/no/such/shader")),
            1,
        );
        assert!(result.is_err());
    }
}
