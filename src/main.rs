//! Flappy Combat entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use flappy_combat::Session;
    use flappy_combat::persistence::LocalStore;
    use flappy_combat::platform::{Intent, default_store, intent_for_key_down, intent_for_key_up};
    use flappy_combat::session::LoopToken;
    use flappy_combat::sim::{ExplosionKind, GamePhase, WeaponKind};

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStore>,
        ctx: CanvasRenderingContext2d,
        /// Current loop generation
        token: Option<LoopToken>,
        /// Pending requestAnimationFrame id
        frame_handle: Option<i32>,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, ctx: CanvasRenderingContext2d) -> Self {
            Self {
                session: Session::new(seed, default_store()),
                ctx,
                token: None,
                frame_handle: None,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Oldest sample is the one we are about to overwrite
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Draw the entity lists
        fn render(&self, time: f64) {
            let ctx = &self.ctx;
            let state = self.session.state();
            let settings = self.session.settings();
            let bounds = state.bounds();
            let (w, h) = (f64::from(bounds.x), f64::from(bounds.y));

            ctx.set_fill_style_str("#70c5ce");
            ctx.fill_rect(0.0, 0.0, w, h);

            // Bird
            let bird = &state.bird;
            let center = bird.center();
            let blink = bird.is_invulnerable(state.clock_ms) && (time / 100.0) as i64 % 2 == 0;
            if !blink {
                ctx.save();
                let _ = ctx.translate(f64::from(center.x), f64::from(center.y));
                if settings.effective_rotation() {
                    let _ = ctx.rotate(f64::from(bird.rotation));
                }
                ctx.set_fill_style_str("#ffd447");
                ctx.fill_rect(
                    f64::from(-bird.size.x / 2.0),
                    f64::from(-bird.size.y / 2.0),
                    f64::from(bird.size.x),
                    f64::from(bird.size.y),
                );
                ctx.restore();
            }

            // Enemies with health bars
            for enemy in &state.enemies {
                let (x, y) = (f64::from(enemy.pos.x), f64::from(enemy.pos.y));
                let (ew, eh) = (f64::from(enemy.size.x), f64::from(enemy.size.y));
                ctx.set_fill_style_str(&format!("#{:06x}", enemy.color));
                ctx.fill_rect(x, y, ew, eh);

                let frac = f64::from(enemy.health.max(0)) / f64::from(enemy.max_health.max(1));
                ctx.set_fill_style_str("#400");
                ctx.fill_rect(x, y - 6.0, ew, 3.0);
                ctx.set_fill_style_str("#2ecc40");
                ctx.fill_rect(x, y - 6.0, ew * frac, 3.0);
            }

            for projectile in &state.projectiles {
                ctx.set_fill_style_str(projectile_color(projectile.weapon));
                ctx.fill_rect(
                    f64::from(projectile.pos.x),
                    f64::from(projectile.pos.y),
                    f64::from(projectile.size.x),
                    f64::from(projectile.size.y),
                );
            }

            if settings.effective_explosions() {
                for explosion in &state.explosions {
                    let t = f64::from(explosion.progress(state.clock_ms));
                    let radius = f64::from(explosion.radius) * (0.5 + 0.5 * t);
                    ctx.set_global_alpha(1.0 - t);
                    ctx.set_stroke_style_str(match explosion.kind {
                        ExplosionKind::Kill => "#ff851b",
                        ExplosionKind::Missile => "#ff4136",
                        ExplosionKind::Electric => "#7fdbff",
                    });
                    ctx.set_line_width(3.0);
                    ctx.begin_path();
                    let _ = ctx.arc(
                        f64::from(explosion.center.x),
                        f64::from(explosion.center.y),
                        radius,
                        0.0,
                        TAU,
                    );
                    ctx.stroke();
                }
                ctx.set_global_alpha(1.0);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.session.snapshot();
            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            let set_visible = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("hud-score", &hud.score.to_string());
            set_text("hud-high", &hud.high_score.to_string());
            set_text("hud-health", &format!("{}/{}", hud.health.max(0), hud.max_health));
            set_text(
                "hud-combo",
                &if hud.combo > 1 {
                    format!("x{}", hud.combo)
                } else {
                    String::new()
                },
            );
            let ammo = hud
                .ammo
                .iter()
                .find(|a| a.weapon == hud.weapon)
                .and_then(|a| a.ammo.zip(a.max_ammo))
                .map(|(ammo, max)| format!("{}/{}", ammo, max))
                .unwrap_or_else(|| "∞".to_string());
            set_text("hud-weapon", hud.weapon.spec().name);
            set_text("hud-ammo", &ammo);
            if self.session.settings().show_fps {
                set_text("hud-fps", &self.fps.to_string());
            }

            set_visible("ready-prompt", hud.phase == GamePhase::Ready);
            set_visible("pause-menu", hud.phase == GamePhase::Paused);
            set_visible("game-over", hud.phase == GamePhase::GameOver);
            if hud.phase == GamePhase::GameOver {
                set_text("final-score", &hud.score.to_string());
            }
        }
    }

    fn projectile_color(kind: WeaponKind) -> &'static str {
        match kind {
            WeaponKind::Stone => "#888888",
            WeaponKind::Ak47 => "#ffd700",
            WeaponKind::Laser => "#ff0000",
            WeaponKind::Missile => "#ff851b",
            WeaponKind::Electric => "#7fdbff",
            WeaponKind::Flame => "#ff4500",
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Flappy Combat starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No canvas element");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, ctx)));
        {
            let g = game.borrow();
            let bounds = g.session.state().bounds();
            canvas.set_width(bounds.x as u32);
            canvas.set_height(bounds.y as u32);
        }
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_pause_menu(game.clone());
        setup_auto_pause(game.clone());
        setup_teardown(game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        start_loop(game);
        log::info!("Flappy Combat running!");
    }

    fn push_intent(game: &Rc<RefCell<Game>>, intent: Intent, at_ms: f64) {
        game.borrow_mut().session.push_intent(intent, at_ms);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Click / tap to flap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                push_intent(&game, Intent::Flap, event.time_stamp());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                push_intent(&game, Intent::Flap, event.time_stamp());
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let key = event.key();
                if let Some(intent) = intent_for_key_down(&key) {
                    // Keep space and arrows from scrolling the page
                    if matches!(key.as_str(), " " | "ArrowUp" | "ArrowDown") {
                        event.prevent_default();
                    }
                    push_intent(&game, intent, event.time_stamp());
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(intent) = intent_for_key_up(&event.key()) {
                    push_intent(&game, intent, event.time_stamp());
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            let token = g.session.start();
            g.token = Some(token);
            g.last_time = 0.0;
        }
        request_animation_frame(game);
    }

    /// Cancel the pending frame and invalidate the loop token
    fn stop_loop(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        if let Some(handle) = g.frame_handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
        g.session.stop();
        g.token = None;
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(token) = game.borrow().token else {
            return;
        };
        let game_for_frame = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game_for_frame, token, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: LoopToken, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame_handle = None;

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            if !g.session.update(token, dt) {
                return;
            }
            g.track_fps(time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().session.restart(seed);
                // Restart also revives a loop stopped by teardown
                if game.borrow().token.is_none() {
                    start_loop(game.clone());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_pause_menu(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().session.resume();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow_mut().session.pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if game.borrow_mut().session.pause() {
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Stop the loop when the page is being torn down
    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            stop_loop(&game);
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy Combat (native) starting...");
    log::info!("Native mode runs a headless autopilot match - serve the wasm build to play");

    headless_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot smoke run: two simulated minutes at 60 fps or until game over
#[cfg(not(target_arch = "wasm32"))]
fn headless_run() {
    use flappy_combat::Session;
    use flappy_combat::platform::{Intent, default_store, now_ms};
    use flappy_combat::sim::{GameEvent, GamePhase};

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    let started = now_ms();
    let mut session = Session::new(seed, default_store());
    let token = session.start();
    session.push_intent(Intent::ToggleIdle, started);

    let frame_dt = 1.0 / 60.0;
    let mut fired = 0usize;
    let mut kills = 0usize;
    for _ in 0..(120 * 60) {
        session.update(token, frame_dt);
        for event in session.events() {
            match event {
                GameEvent::WeaponFired { .. } => fired += 1,
                GameEvent::EnemyKilled { .. } => kills += 1,
                _ => {}
            }
        }
        if session.phase() == GamePhase::GameOver {
            break;
        }
    }
    session.stop();

    let hud = session.snapshot();
    println!(
        "seed {}: score {}, kills {}, shots {}, health {}/{}, {:.1}s simulated ({:?})",
        seed,
        hud.score,
        kills,
        fired,
        hud.health.max(0),
        hud.max_health,
        session.state().clock_ms / 1000.0,
        hud.phase
    );
    log::info!("Headless run took {:.0}ms", now_ms() - started);
}
