//! Virtual Slots entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, WheelEvent};

    use virtual_slots::Settings;
    use virtual_slots::assets::{LoadSignal, REEL_STRIP_URL, ReelStrip, fetch_reel_strip, load_signal};
    use virtual_slots::camera::OrbitCamera;
    use virtual_slots::input::SpinControl;
    use virtual_slots::renderer::{SceneRenderState, SceneView};
    use virtual_slots::sim::{GameState, TickInput, tick};

    /// Fallback frame time for the first frame
    const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SceneRenderState>,
        camera: OrbitCamera,
        controls: SpinControl,
        settings: Settings,
        reel_strip: LoadSignal<ReelStrip>,
        last_time: f64,
        // Canvas size in CSS pixels
        viewport: Vec2,
        // Orbit drag
        drag_from: Option<Vec2>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        loading_hidden: bool,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, reel_strip: LoadSignal<ReelStrip>) -> Self {
            let mut camera = OrbitCamera::default();
            camera.rotate_speed = settings.rotate_speed;
            camera.zoom_speed = settings.zoom_speed;
            Self {
                state: GameState::new(seed),
                render_state: None,
                camera,
                controls: SpinControl::default(),
                settings,
                reel_strip,
                last_time: 0.0,
                viewport: Vec2::ONE,
                drag_from: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                loading_hidden: false,
            }
        }

        fn set_viewport(&mut self, w: f32, h: f32) {
            self.viewport = Vec2::new(w, h);
            self.camera.set_viewport(w, h);
        }

        /// Pointer pressed at `pos` (CSS pixels). Picks the start button,
        /// otherwise begins an orbit drag.
        fn pointer_down(&mut self, pos: Vec2) {
            let ray = self.camera.screen_ray(pos, self.viewport);
            if !self.controls.pointer_down(&ray) {
                self.drag_from = Some(pos);
            }
        }

        fn pointer_move(&mut self, pos: Vec2) {
            if let Some(from) = self.drag_from {
                self.camera.rotate(pos - from, self.viewport.y);
                self.drag_from = Some(pos);
            }
        }

        fn pointer_up(&mut self) {
            self.controls.pointer_up();
            self.drag_from = None;
        }

        /// Run one simulation frame
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);

            let input = TickInput {
                spin_requested: self.controls.take_spin_request(),
                reels_ready: self.reel_strip.is_ready(),
                attract: self.settings.effective_attract(),
            };
            tick(&mut self.state, &input, dt);
            self.camera.update(dt);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (59000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let view = SceneView {
                button: self.controls.button,
                show_attract: self.settings.effective_attract() && self.reel_strip.is_ready(),
            };
            if let Some(ref mut render_state) = self.render_state {
                let result = self.reel_strip.with(|strip| {
                    render_state.render(&self.state, &self.camera, Some(strip), &view, &self.settings, time)
                });
                let result = match result {
                    Some(result) => result,
                    None => render_state.render(&self.state, &self.camera, None, &view, &self.settings, time),
                };
                match result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
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
        fn update_hud(&mut self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            if let Some(el) = document.query_selector("#hud-games .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.counters.games_played.to_string()));
            }

            if let Some(el) = document.query_selector("#hud-credits .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.counters.credits_won.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if !self.loading_hidden && self.reel_strip.is_ready() {
                if let Some(loading) = document.get_element_by_id("loading") {
                    let _ = loading.set_attribute("class", "hidden");
                }
                self.loading_hidden = true;
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Virtual Slots starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();

        // Start the reel strip download; the machine stays idle until it lands
        let (completer, reel_strip) = load_signal::<ReelStrip>();
        wasm_bindgen_futures::spawn_local(async move {
            match fetch_reel_strip(REEL_STRIP_URL).await {
                Ok(strip) => {
                    log::info!("Reel strip loaded ({} segments)", strip.segments.len());
                    completer.complete(strip);
                }
                Err(e) => log::error!("Failed to load {}: {}", REEL_STRIP_URL, e),
            }
        });

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings, reel_strip)));
        game.borrow_mut()
            .set_viewport(client_w as f32, client_h as f32);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state = SceneRenderState::new(surface, &adapter, width, height).await;
        render_state.set_start_time(js_sys::Date::now());
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_resize_handler(&canvas, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Virtual Slots running!");
    }

    fn touch_pos(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<Vec2> {
        let touch = event.touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some(Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse down - press the button or start orbiting
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().pointer_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - orbit while dragging
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().pointer_move(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up anywhere releases the button and ends the drag
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().pointer_up();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Wheel zoom
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                let notches = event.delta_y().signum() as f32;
                game.borrow_mut().camera.zoom(notches);
            });
            let _ = canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_pos(&canvas_clone, &event) {
                    game.borrow_mut().pointer_down(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(pos) = touch_pos(&canvas_clone, &event) {
                    game.borrow_mut().pointer_move(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().pointer_up();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "f" | "F" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    key => {
                        if g.controls.key_down(key) {
                            event.prevent_default();
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().controls.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::UiEvent| {
            let window = web_sys::window().unwrap();
            let dpr = window.device_pixel_ratio();
            let client_w = canvas_clone.client_width();
            let client_h = canvas_clone.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas_clone.set_width(width);
            canvas_clone.set_height(height);

            let mut g = game.borrow_mut();
            g.set_viewport(client_w as f32, client_h as f32);
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FIRST_FRAME_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Play headless games and report the machine's return
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser)]
#[command(name = "virtual-slots", about = "Headless Virtual Slots session")]
struct Args {
    /// Number of games to play
    #[arg(default_value_t = 1000)]
    games: u64,
    /// RNG seed (defaults to the current time)
    seed: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use std::time::{SystemTime, UNIX_EPOCH};
    use virtual_slots::sim::run_session;

    env_logger::init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });

    log::info!("Virtual Slots (native) playing {} games with seed {}", args.games, seed);

    let totals = match run_session(seed, args.games, 1.0 / 60.0) {
        Ok(totals) => totals,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    println!("games:            {}", totals.games);
    println!("wins:             {}", totals.wins);
    println!("credits won:      {}", totals.credits);
    println!("return per game:  {:.4}", totals.return_per_game());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
