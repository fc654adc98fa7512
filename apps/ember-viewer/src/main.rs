use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui_glow;
use ember_camera::Camera;
use ember_common::{CameraConfig, EngineConfig, Transform};
use ember_gl::{GlBackend, GlowBackend};
use ember_input::{FrameInput, InputState, Key};
use ember_render::{BASIC_FRAGMENT_SHADER, BASIC_VERTEX_SHADER, MeshData, Model, Shader};
use glam::Mat4;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ember-viewer", about = "Ember desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shader base path, overriding the config
    #[arg(short, long)]
    shader: Option<PathBuf>,
}

/// egui keys forwarded to the engine. Shift and control come from modifiers,
/// which egui does not split into left and right.
const KEY_MAP: [(egui::Key, Key); 12] = [
    (egui::Key::W, Key::W),
    (egui::Key::A, Key::A),
    (egui::Key::S, Key::S),
    (egui::Key::D, Key::D),
    (egui::Key::Q, Key::Q),
    (egui::Key::E, Key::E),
    (egui::Key::ArrowUp, Key::Up),
    (egui::Key::ArrowDown, Key::Down),
    (egui::Key::ArrowLeft, Key::Left),
    (egui::Key::ArrowRight, Key::Right),
    (egui::Key::Space, Key::Space),
    (egui::Key::Escape, Key::Escape),
];

const TINT: [f32; 4] = [1.0, 0.85, 0.7, 1.0];

/// GPU resources and camera, shared with the paint callback.
struct Scene {
    gl: Arc<GlowBackend>,
    shader: Shader<GlowBackend>,
    model: Model<GlowBackend>,
    camera: Camera,
    viewport: (u32, u32),
}

impl Scene {
    fn new(gl: Arc<GlowBackend>, config: &EngineConfig) -> Result<Self> {
        let shader = match &config.shader {
            Some(base) => Shader::load(gl.clone(), base)
                .with_context(|| format!("failed to build shader {}", base.display()))?,
            None => Shader::from_sources(gl.clone(), BASIC_VERTEX_SHADER, BASIC_FRAGMENT_SHADER)
                .context("failed to build the built-in shader")?,
        };

        let mesh = MeshData::cube();
        let model = Model::from_vertices(gl.clone(), &mesh.vertices, &mesh.indices)?;

        let window = &config.window;
        let camera = Camera::perspective(
            config.camera.fov_degrees.to_radians(),
            window.width as f32 / window.height.max(1) as f32,
            config.camera.near,
            config.camera.far,
        )
        .with_transform(Transform::from_position(config.camera.start_position));

        Ok(Self {
            gl,
            shader,
            model,
            camera,
            viewport: (0, 0),
        })
    }

    fn paint(&mut self, width: u32, height: u32, spin: f32) {
        if self.viewport != (width, height) {
            self.camera.adjust_to_viewport(self.gl.as_ref(), width, height);
            self.viewport = (width, height);
        }
        let Some(view_projection) = self.camera.view_projection() else {
            return;
        };

        self.gl.set_depth_test(true);
        self.gl.clear_depth();
        self.shader.bind();
        self.shader.set_uniform_f32("u_tint", &TINT);
        self.shader
            .set_uniform_mat4("u_mvp", &(view_projection * Mat4::from_rotation_y(spin)));
        self.model.draw();
        self.shader.unbind();
        self.gl.set_depth_test(false);
    }
}

struct ViewerApp {
    scene: Option<Arc<Mutex<Scene>>>,
    input: InputState,
    camera_config: CameraConfig,
    spin: f32,
}

impl ViewerApp {
    fn new(cc: &eframe::CreationContext<'_>, config: EngineConfig) -> Result<Self> {
        let gl = cc
            .gl
            .clone()
            .context("no OpenGL context; the viewer needs the glow renderer")?;
        let scene = Scene::new(Arc::new(GlowBackend::new(gl)), &config)?;
        tracing::info!("scene ready");

        Ok(Self {
            scene: Some(Arc::new(Mutex::new(scene))),
            input: InputState::new(),
            camera_config: config.camera,
            spin: 0.0,
        })
    }

    /// Feed this frame's egui input into the accumulator; returns the frame time.
    fn gather_input(&mut self, ctx: &egui::Context) -> f32 {
        let input = &mut self.input;
        ctx.input(|i| {
            input.handle_focus(i.focused);
            for (egui_key, key) in KEY_MAP {
                input.handle_key(key, i.key_down(egui_key));
            }
            input.handle_key(Key::LeftShift, i.modifiers.shift);
            input.handle_key(Key::LeftControl, i.modifiers.ctrl);
            // Mouse look only while the secondary button is held. egui is y-down.
            if i.pointer.secondary_down() {
                let delta = i.pointer.delta();
                input.handle_mouse_motion(delta.x, -delta.y);
            }
            i.stable_dt
        })
    }

    fn step(&mut self, scene: &Mutex<Scene>, frame: &FrameInput, dt: f32) {
        if let Ok(mut scene) = scene.lock() {
            scene.camera.process_input(
                frame,
                dt,
                self.camera_config.move_speed,
                self.camera_config.mouse_sensitivity,
            );
        }
        self.spin += dt * 0.5;
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = self.gather_input(ctx);
        let frame_input = self.input.poll();
        let Some(scene) = self.scene.clone() else {
            return;
        };
        self.step(&scene, &frame_input, dt);

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                let spin = self.spin;
                let scene = scene.clone();
                let callback = egui::PaintCallback {
                    rect: ui.max_rect(),
                    callback: Arc::new(egui_glow::CallbackFn::new(move |info, _painter| {
                        let viewport = info.viewport_in_pixels();
                        if let Ok(mut scene) = scene.lock() {
                            scene.paint(
                                viewport.width_px.max(1) as u32,
                                viewport.height_px.max(1) as u32,
                                spin,
                            );
                        }
                    })),
                };
                ui.painter().add(callback);
            });

        if let Ok(scene) = scene.lock() {
            if let Some(t) = scene.camera.transform() {
                egui::Window::new("camera").resizable(false).show(ctx, |ui| {
                    ui.label(format!(
                        "position: ({:.2}, {:.2}, {:.2})",
                        t.position.x, t.position.y, t.position.z
                    ));
                    let f = t.forward();
                    ui.label(format!("forward: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
                    ui.label(format!("aspect: {:.3}", scene.camera.projection().aspect()));
                    ui.separator();
                    ui.small("RMB: look | WASD: move | Shift: boost");
                });
            }
        }

        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Release GPU objects while the context is still current.
        if self.scene.take().is_some() {
            tracing::info!("released scene resources");
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    if cli.shader.is_some() {
        config.shader = cli.shader;
    }

    tracing::info!("ember-viewer starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width as f32, config.window.height as f32]),
        renderer: eframe::Renderer::Glow,
        depth_buffer: 24,
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let app = ViewerApp::new(cc, config).inspect_err(|e| tracing::error!("{e:#}"))?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with error: {e}"))
}
