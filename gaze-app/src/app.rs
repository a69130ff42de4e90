use crate::host::{ChannelKeyboard, PointerState, SessionEvent, ToneSynth, WindowPointer};
use crate::session::{SessionConfig, run_session, shared_scene};
use anyhow::{Result, anyhow};
use gaze_core::{AbortSignal, Key, KeyPress, MouseButton, Position, Resolution};
use gaze_experiment::ExperimentContext;
use gaze_render::{Scene, SceneRenderer};
use gaze_timing::{HighPrecisionTimer, Timer};
use gaze_tracker::HostServices;
use parking_lot::Mutex;
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton as WinitButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key as WinitKey, ModifiersState, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

const TONE_VOLUME: f32 = 0.5;

pub struct App {
    config: SessionConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SceneRenderer>,
    scene: Arc<Mutex<Scene>>,
    pointer: Arc<Mutex<PointerState>>,
    keys: Sender<KeyPress>,
    key_rx: Option<Receiver<KeyPress>>,
    abort: AbortSignal,
    proxy: EventLoopProxy<SessionEvent>,
    worker: Option<JoinHandle<()>>,
    timer: HighPrecisionTimer,
    modifiers: ModifiersState,
    outcome: Option<Result<(), String>>,

    should_exit: bool,
}

impl App {
    pub fn new(config: SessionConfig, proxy: EventLoopProxy<SessionEvent>) -> Self {
        let (keys, key_rx) = mpsc::channel();
        Self {
            scene: shared_scene(&config),
            config,
            window: None,
            pixels: None,
            renderer: None,
            pointer: Arc::new(Mutex::new(PointerState::default())),
            keys,
            key_rx: Some(key_rx),
            abort: AbortSignal::new(),
            proxy,
            worker: None,
            timer: HighPrecisionTimer::new(),
            modifiers: ModifiersState::empty(),
            outcome: None,
            should_exit: false,
        }
    }

    /// Opens the window, runs the session until it finishes or the window
    /// closes, and returns the session outcome.
    pub fn run(config: SessionConfig) -> Result<()> {
        let event_loop = EventLoop::<SessionEvent>::with_user_event().build()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting; shift+escape quits"
        );

        let mut app = App::new(config, event_loop.create_proxy());
        let result = event_loop.run_app(&mut app);
        app.shutdown();
        result?;

        match app.outcome.take() {
            Some(Err(e)) => Err(anyhow!(e)),
            Some(Ok(())) => Ok(()),
            None => Err(anyhow!("session interrupted")),
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;

        let attributes = Window::default_attributes()
            .with_title("Gaze")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor.clone()))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz = monitor.refresh_rate_millihertz().map(|mhz| mhz as f64 / 1000.0),
            "display"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);
        self.renderer = Some(SceneRenderer::new(
            size.width,
            size.height,
            &self.scene.lock(),
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        self.spawn_session(Resolution::new(size.width, size.height))
    }

    fn spawn_session(&mut self, resolution: Resolution) -> Result<()> {
        let key_rx = self
            .key_rx
            .take()
            .ok_or_else(|| anyhow!("session already started"))?;
        let host = HostServices::new(
            self.timer.clone(),
            WindowPointer::new(self.pointer.clone(), self.proxy.clone()),
            ChannelKeyboard::new(key_rx),
            ToneSynth::new(TONE_VOLUME),
            self.abort.clone(),
        );
        let config = self.config.clone();
        let scene = self.scene.clone();
        let proxy = self.proxy.clone();

        let worker = thread::Builder::new()
            .name("session".to_string())
            .spawn(move || {
                let mut ctx = ExperimentContext::new(resolution, host);
                let result = run_session(&mut ctx, &config, &scene, &mut rand::rng());
                let outcome = match result {
                    Ok(()) => {
                        info!("session complete");
                        Ok(())
                    }
                    Err(e) => {
                        error!(error = %format!("{e:#}"), "session failed");
                        Err(format!("{e:#}"))
                    }
                };
                if proxy.send_event(SessionEvent::Finished(outcome)).is_err() {
                    debug!("event loop gone before session finished");
                }
            })?;
        self.worker = Some(worker);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let scene = self.scene.lock().clone();

        let stats = renderer.render_frame(&scene, pixels.frame_mut(), &self.timer)?;
        let presented = self.timer.now();
        pixels.render()?;
        trace!(
            present_ms = self.timer.elapsed(presented).as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            dirty = stats.dirty_count,
            "frame"
        );
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(size.width, size.height) {
                warn!(error = %e, "failed to resize renderer");
            }
        }
        debug!(width = size.width, height = size.height, "resized");
    }

    fn handle_key(&mut self, key: &WinitKey, event_loop: &ActiveEventLoop) {
        let key = match key {
            WinitKey::Named(NamedKey::Escape) if self.modifiers.shift_key() => {
                info!("quit requested");
                self.cleanup_and_exit(event_loop);
                return;
            }
            WinitKey::Named(NamedKey::Escape) => Key::Escape,
            WinitKey::Named(NamedKey::Space) => Key::Space,
            WinitKey::Character(s) => match s.chars().next() {
                Some(c) => Key::Char(c.to_ascii_lowercase()),
                None => return,
            },
            _ => return,
        };
        let press = KeyPress {
            key,
            timestamp: self.timer.now(),
        };
        if self.keys.send(press).is_err() {
            debug!(?key, "session not listening; key dropped");
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.abort.trigger();
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.should_exit = true;
        event_loop.exit();
    }

    /// Stops the session thread and waits for it to close the tracker.
    fn shutdown(&mut self) {
        self.abort.trigger();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("session thread panicked");
            }
        }
        if let Some(renderer) = &self.renderer {
            let total = renderer.times().total.summary();
            info!(
                frames = renderer.times().total.len(),
                avg_ms = total.average_frame_time_ns / 1e6,
                jitter_ms = total.jitter_ns / 1e6,
                max_ms = total.max_frame_time_ns / 1e6,
                "render timing"
            );
        }
    }
}

fn button(button: WinitButton) -> Option<MouseButton> {
    match button {
        WinitButton::Left => Some(MouseButton::Left),
        WinitButton::Middle => Some(MouseButton::Middle),
        WinitButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

impl ApplicationHandler<SessionEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to start");
                self.outcome = Some(Err(format!("{e:#}")));
                self.cleanup_and_exit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(error = %e, "render failed");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.lock().position = Position::new(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button: b, .. } => {
                if let Some(b) = button(b) {
                    self.pointer
                        .lock()
                        .set_button(b, state == ElementState::Pressed);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_key(&event.logical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: SessionEvent) {
        match event {
            SessionEvent::WarpCursor(pos) => {
                if let Some(window) = &self.window {
                    if let Err(e) = window.set_cursor_position(PhysicalPosition::new(pos.x, pos.y)) {
                        debug!(error = %e, "cursor warp not supported");
                    }
                }
            }
            SessionEvent::CursorVisible(visible) => {
                if let Some(window) = &self.window {
                    window.set_cursor_visible(visible);
                }
            }
            SessionEvent::Finished(outcome) => {
                self.outcome = Some(outcome);
                self.cleanup_and_exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(button(WinitButton::Left), Some(MouseButton::Left));
        assert_eq!(button(WinitButton::Right), Some(MouseButton::Right));
        assert_eq!(button(WinitButton::Back), None);
    }
}
