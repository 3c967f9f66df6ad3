use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use case_reveal::assets::AssetSet;
use case_reveal::camera::OrbitCamera;
use case_reveal::cli::Cli;
use case_reveal::config::SceneConfig;
use case_reveal::core::{Clock, PointerAction, PointerInput};
use case_reveal::effects::{CommandSoundPlayer, SilentPlayer, SystemNavigator};
use case_reveal::interaction::ClickEnv;
use case_reveal::render::{Lighting, SceneRenderer};
use case_reveal::scene::SceneContext;
use case_reveal::traits::SoundPlayer;

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    scene: SceneContext,
    camera: OrbitCamera,
    input: PointerInput,
    clock: Clock,
    rng: StdRng,
    sound: Box<dyn SoundPlayer>,
    navigator: SystemNavigator,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera = OrbitCamera::new(&config.camera, aspect);
        let sound: Box<dyn SoundPlayer> = match &config.sound {
            Some(sound) => Box::new(CommandSoundPlayer::new(sound.player.clone())),
            None => Box::new(SilentPlayer),
        };

        Self {
            window: None,
            renderer: None,
            scene: SceneContext::mount(config, AssetSet::load),
            camera,
            input: PointerInput::new(),
            clock: Clock::new(),
            rng: StdRng::from_entropy(),
            sound,
            navigator: SystemNavigator::new(),
        }
    }

    fn click(&mut self) {
        let mut env = ClickEnv {
            camera_position: self.camera.position(),
            rng: &mut self.rng,
            sound: self.sound.as_mut(),
            navigator: &mut self.navigator,
        };
        self.scene.click(&mut env);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref()) else {
            return;
        };

        let delta = self.clock.tick();
        let keep_going = self.scene.frame(renderer, delta, self.camera.position());

        match renderer.render(&self.camera, &self.scene.draw_list()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, shutting down");
                self.shutdown(event_loop);
                return;
            }
            Err(e) => log::warn!("Frame skipped: {}", e),
        }

        if keep_going {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.scene.unmount();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let settings = &self.scene.config().window;
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(settings.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(settings.width, settings.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                self.shutdown(event_loop);
                return;
            }
        };

        let renderer = match SceneRenderer::new(window.clone(), Lighting::default()) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                self.shutdown(event_loop);
                return;
            }
        };

        let (width, height) = renderer.size();
        self.camera.set_aspect(width, height);
        self.clock.reset();
        window.request_redraw();

        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match self.input.process_event(&event) {
            Some(PointerAction::Click) => self.click(),
            Some(PointerAction::Orbit { dx, dy }) => self.camera.rotate(dx, dy),
            Some(PointerAction::Zoom(lines)) => self.camera.zoom(lines),
            Some(PointerAction::Quit) => {
                self.shutdown(event_loop);
                return;
            }
            None => {}
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    if renderer.resize(size.width, size.height) {
                        self.camera.set_aspect(size.width, size.height);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = SceneConfig::from_cli(&cli).context("Invalid scene configuration")?;
    log::info!("Loading assets from {}", config.asset_root.display());

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);

    println!("Case Reveal - Controls: click to open, drag to orbit, wheel to zoom, Escape to quit");
    event_loop.run_app(&mut app).context("Event loop terminated with an error")?;

    Ok(())
}
