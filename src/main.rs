//! Shape Slicer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Display;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, MouseEvent};

    use shape_slicer::audio::{AudioManager, SoundEffect};
    use shape_slicer::consts::*;
    use shape_slicer::persistence::{LocalStorageStore, ScoreStore};
    use shape_slicer::platform::Viewport;
    use shape_slicer::renderer::RenderState;
    use shape_slicer::settings::{QualityPreset, Settings};
    use shape_slicer::sim::{GameEvent, GamePhase, GameState, PointerEvent, TickInput, tick};
    use shape_slicer::ui::{Hud, Overlay};

    fn js_err(msg: impl Display) -> JsValue {
        JsValue::from_str(&msg.to_string())
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        settings: Settings,
        audio: AudioManager,
        store: LocalStorageStore,
        canvas: HtmlCanvasElement,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// HUD as last written to the DOM
        last_hud: Option<Hud>,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                state: GameState::new(seed),
                render_state: None,
                settings,
                audio,
                store: LocalStorageStore,
                canvas,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                last_hud: None,
            }
        }

        fn viewport(&self) -> Viewport {
            let rect = self.canvas.get_bounding_client_rect();
            Viewport::new(
                rect.left() as f32,
                rect.top() as f32,
                rect.width() as f32,
                rect.height() as f32,
            )
        }

        fn world_pos(&self, event: &MouseEvent) -> Vec2 {
            self.viewport()
                .client_to_world(event.client_x() as f32, event.client_y() as f32)
        }

        fn push_pointer(&mut self, event: PointerEvent) {
            self.input.pointer.push(event);
        }

        /// A stroke is armed, or a press is queued for the next tick
        fn stroke_pending(&self) -> bool {
            self.state.stroke.is_some()
                || self
                    .input
                    .pointer
                    .iter()
                    .any(|e| matches!(e, PointerEvent::Down(_)))
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pointer.clear();
                self.input.pause = false;
                self.input.resume = false;
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            if let Some(effect) = SoundEffect::for_event(&event) {
                self.audio.play(effect);
            }

            match event {
                GameEvent::ScoreChanged(score) => {
                    if let Err(e) = self.store.save_last_score(score) {
                        log::warn!("Could not save score: {}", e);
                    }
                }
                GameEvent::Resumed => {
                    // Don't count paused wall-clock time as a frame
                    self.last_time = 0.0;
                    self.accumulator = 0.0;
                }
                _ => {}
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            let hud = Hud::from_state(&self.state, self.settings.effective_combo_flash());
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }

            if let Some(el) = document.query_selector(".ui-score").ok().flatten() {
                el.set_text_content(Some(&hud.score));
            }
            if let Some(el) = document.query_selector(".ui-timer").ok().flatten() {
                el.set_text_content(Some(&hud.timer));
            }

            if let Some(el) = document
                .get_element_by_id("combo-text")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let opacity = match &hud.combo {
                    Some(text) => {
                        el.set_text_content(Some(text));
                        "1"
                    }
                    None => "0",
                };
                let _ = el.style().set_property("opacity", opacity);
            }

            if let Some(el) = document.get_element_by_id("game-container") {
                let _ = el
                    .class_list()
                    .toggle_with_force("combo-reset", hud.combo_reset_flash);
            }

            for overlay in [Overlay::StopMenu, Overlay::Result] {
                let Some(id) = overlay.element_id() else { continue };
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.class_list().toggle_with_force("hidden", hud.overlay != overlay);
                }
            }
            if hud.overlay == Overlay::Result {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&self.state.score.to_string()));
                }
            }

            self.last_hud = Some(hud);
        }

        /// Step to the next quality preset and persist it
        fn cycle_quality(&mut self, document: &Document) {
            let next = self.settings.quality.next();
            self.settings.apply_preset(next);
            self.settings.save();
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.apply_settings(&self.settings);
            }
            show_quality(document, next);
            log::info!("Quality: {}", next.as_str());
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            let tuning = self.state.tuning.clone();
            let autoplay = self.input.autoplay;
            self.state = GameState::with_tuning(seed, tuning);
            self.accumulator = 0.0;
            self.last_time = 0.0;
            self.input = TickInput {
                autoplay,
                ..TickInput::default()
            };
            self.last_hud = None;
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Shape Slicer starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| js_err("no canvas"))?
            .dyn_into()
            .map_err(|_| js_err("#canvas is not a canvas"))?;

        // Backing store matches the CSS size at device resolution
        let dpr = window.device_pixel_ratio();
        let client_w = match canvas.client_width() {
            0 => VIEW_WIDTH as i32,
            w => w,
        };
        let client_h = match canvas.client_height() {
            0 => VIEW_HEIGHT as i32,
            h => h,
        };
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        show_quality(&document, settings.quality);
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), settings.clone())));
        log::info!("Game initialized with seed: {}", seed);

        match game.borrow().store.load_last_score() {
            Ok(Some(score)) => log::info!("Last score: {}", score),
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring stored score: {}", e),
        }

        // Initialize WebGPU (WebGL2 fallback)
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, &settings)
            .await
            .map_err(js_err)?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&window, &canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(&window, &document, game.clone());

        request_animation_frame(game);

        log::info!("Shape Slicer running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        // Stroke start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() != 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                g.audio.resume();
                let p = g.world_pos(&event);
                g.push_pointer(PointerEvent::Down(p));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Guide line follows the pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.stroke_pending() {
                    let p = g.world_pos(&event);
                    g.push_pointer(PointerEvent::Move(p));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Leaving hides the guide, the stroke stays armed
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().push_pointer(PointerEvent::Leave);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Stroke end: on the canvas, and on the window (capture) for releases
        // outside it. A second Up after the stroke is consumed is a no-op.
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() != 0 {
                    return;
                }
                let mut g = game.borrow_mut();
                let p = g.world_pos(&event);
                g.push_pointer(PointerEvent::Up(p));
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            let _ = window.add_event_listener_with_callback_and_bool(
                "mouseup",
                closure.as_ref().unchecked_ref(),
                true,
            );
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" | "p" | "P" => match g.state.phase {
                        GamePhase::Playing => g.input.pause = true,
                        GamePhase::Paused => g.input.resume = true,
                        GamePhase::Over => {}
                    },
                    "q" | "Q" => {
                        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                            g.cycle_quality(&document);
                        }
                    }
                    "i" | "I" => {
                        g.input.autoplay = !g.input.autoplay;
                        log::info!("Autoplay: {}", g.input.autoplay);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn show_quality(document: &Document, quality: QualityPreset) {
        if let Some(el) = document.query_selector(".ui-quality").ok().flatten() {
            el.set_text_content(Some(&format!("Quality: {}", quality.as_str())));
        }
    }

    fn on_click(document: &Document, selector: &str, mut f: impl FnMut() + 'static) {
        let Some(btn) = document.query_selector(selector).ok().flatten() else {
            log::warn!("Missing button {}", selector);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| f());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, ".ui-button", move || {
                game.borrow_mut().input.pause = true;
            });
        }

        {
            let game = game.clone();
            on_click(document, "#resume-btn", move || {
                game.borrow_mut().input.resume = true;
            });
        }

        {
            let game = game.clone();
            let doc = document.clone();
            on_click(document, ".ui-quality", move || {
                game.borrow_mut().cycle_quality(&doc);
            });
        }

        on_click(document, "#restart-btn", move || {
            let seed = js_sys::Date::now() as u64;
            game.borrow_mut().restart(seed);
            log::info!("Game restarted with seed: {}", seed);
        });
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut g = game.borrow_mut();
                if hidden && g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (tab hidden)");
                }
                let mute = hidden && g.settings.mute_on_blur;
                g.audio.set_muted(mute);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.input.pause = true;
                    log::info!("Auto-paused (window blur)");
                }
                let mute = g.settings.mute_on_blur;
                g.audio.set_muted(mute);
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Failed to start: {:?}", e);
    }
}

/// Command line of the native build
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug)]
#[command(name = "shape-slicer")]
#[command(about = "Plays one headless Shape Slicer round on autopilot and logs the result")]
struct Args {
    /// RNG seed for the round
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// JSON file with tuning overrides (missing fields keep their defaults)
    #[arg(long)]
    tuning: Option<std::path::PathBuf>,
}

/// Headless round driven by the autopilot
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use shape_slicer::consts::SIM_DT;
    use shape_slicer::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
    use shape_slicer::{MemoryStore, ScoreStore, Tuning};

    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Shape Slicer (native) starting...");
    log::info!("Native mode runs a headless demo round - use `trunk serve` for the web version");

    let tuning = match &args.tuning {
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::error!("Could not load tuning from {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => Tuning::default(),
    };
    let seed = args.seed;

    let max_ticks = ((tuning.round_secs as f32 + 2.0) / SIM_DT) as u64;
    let mut state = GameState::with_tuning(seed, tuning);
    let mut store = MemoryStore::new();
    let input = TickInput {
        autoplay: true,
        ..TickInput::default()
    };

    let (mut cuts, mut bombs, mut breaks, mut best_combo) = (0u32, 0u32, 0u32, 0u32);
    for _ in 0..max_ticks {
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            match event {
                GameEvent::ShapeSliced { .. } => cuts += 1,
                GameEvent::BombSliced => bombs += 1,
                GameEvent::ComboBroken => breaks += 1,
                GameEvent::ComboIncreased(n) => best_combo = best_combo.max(n),
                GameEvent::ScoreChanged(score) => {
                    if let Err(e) = store.save_last_score(score) {
                        log::warn!("Could not save score: {}", e);
                    }
                }
                _ => {}
            }
        }
        if state.phase == GamePhase::Over {
            break;
        }
    }

    log::info!(
        "Round over (seed {}): score {}, {} shapes cut, {} bombs, best combo x{}, {} combo breaks",
        seed,
        state.score,
        cuts,
        bombs,
        best_combo,
        breaks
    );
    match store.load_last_score() {
        Ok(Some(score)) => log::info!("Last score saved: {}", score),
        Ok(None) => log::info!("No score saved"),
        Err(e) => log::warn!("Could not read score: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["shape-slicer"]).unwrap();
        assert_eq!(args.seed, 42);
        assert!(args.tuning.is_none());
    }

    #[test]
    fn test_args_seed_and_tuning() {
        let args =
            Args::try_parse_from(["shape-slicer", "--seed", "7", "--tuning", "fast.json"]).unwrap();
        assert_eq!(args.seed, 7);
        assert_eq!(args.tuning.as_deref(), Some(std::path::Path::new("fast.json")));
    }

    #[test]
    fn test_args_reject_bad_seed() {
        assert!(Args::try_parse_from(["shape-slicer", "--seed", "abc"]).is_err());
        assert!(Args::try_parse_from(["shape-slicer", "abc"]).is_err());
    }
}
