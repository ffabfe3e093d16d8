use raylib::prelude::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use mystery_shorts::config::Config;
use mystery_shorts::init;
use mystery_shorts::pipeline::{build_pipeline, GenerationState, Step};
use mystery_shorts::platform;
use mystery_shorts::set_log_hook;

const LOG_MAX_LINES: usize = 300;
const LOG_LINE_MAX: usize = 600;
const TOPIC_MAX_CHARS: usize = 120;
const DEFAULT_TOPIC: &str = "The deadly secret of the Fugu fish";

const COLOR_BG: Color = Color::new(25, 25, 25, 255);
const COLOR_BTN: Color = Color::new(40, 90, 170, 255);
const COLOR_BTN_HOVER: Color = Color::new(70, 120, 200, 255);
const COLOR_BTN_DISABLED: Color = Color::new(60, 60, 60, 255);
const COLOR_LOG_BG: Color = Color::new(18, 18, 18, 255);
const COLOR_LOG_TEXT: Color = Color::new(210, 210, 210, 255);
const COLOR_PROGRESS: Color = Color::new(245, 158, 11, 255);
const COLOR_INPUT_BG: Color = Color::new(12, 12, 12, 255);

struct AppState {
    running: Arc<AtomicBool>,
    gen_state: Arc<Mutex<GenerationState>>,
    log_buffer: Arc<Mutex<Vec<String>>>,
}

fn push_log_line(buffer: &Arc<Mutex<Vec<String>>>, line: &str) {
    let mut guard = buffer.lock().unwrap_or_else(|e| e.into_inner());
    if guard.len() >= LOG_MAX_LINES {
        let excess = guard.len() + 1 - LOG_MAX_LINES;
        guard.drain(0..excess);
    }
    let mut text = line.to_string();
    if text.len() > LOG_LINE_MAX {
        text.truncate(LOG_LINE_MAX);
    }
    guard.push(text);
}

fn draw_button(
    d: &mut RaylibDrawHandle,
    rect: Rectangle,
    label: &str,
    enabled: bool,
    font_size: f32,
) -> bool {
    let mouse = d.get_mouse_position();
    let hot = rect.check_collision_point_rec(mouse);

    let bg = if !enabled {
        COLOR_BTN_DISABLED
    } else if hot {
        COLOR_BTN_HOVER
    } else {
        COLOR_BTN
    };

    d.draw_rectangle_rounded(rect, 0.25, 10, bg);
    d.draw_rectangle_rounded_lines(rect, 0.25, 10, Color::new(20, 20, 20, 255));

    let ts = d.measure_text(label, font_size as i32);
    let pos_x = rect.x + (rect.width - ts as f32) * 0.5;
    let pos_y = rect.y + (rect.height - font_size) * 0.5;

    d.draw_text(label, pos_x as i32, pos_y as i32, font_size as i32, Color::RAYWHITE);

    enabled && hot && d.is_mouse_button_released(MouseButton::MOUSE_BUTTON_LEFT)
}

fn draw_log_panel(d: &mut RaylibDrawHandle, rect: Rectangle, lines: &[String]) {
    d.draw_rectangle_rec(rect, COLOR_LOG_BG);
    d.draw_rectangle_lines_ex(rect, 2.0, Color::new(40, 40, 40, 255));

    let font_size = 14;
    let pad = 8.0;
    let line_h = 16.0;
    let max_lines = ((rect.height - 2.0 * pad) / line_h).floor().max(1.0) as usize;

    let start = lines.len().saturating_sub(max_lines);

    let mut y = rect.y + pad;
    for line in lines.iter().skip(start) {
        let pos_x = rect.x + pad;
        d.draw_text(line, pos_x as i32, y as i32, font_size, COLOR_LOG_TEXT);
        y += line_h;
    }
}

fn draw_progress_bar(d: &mut RaylibDrawHandle, rect: Rectangle, progress: u8) {
    d.draw_rectangle_rec(rect, COLOR_LOG_BG);
    d.draw_rectangle_lines_ex(rect, 1.0, Color::new(40, 40, 40, 255));
    let fill = rect.width * (progress.min(100) as f32 / 100.0);
    d.draw_rectangle_rec(
        Rectangle::new(rect.x, rect.y, fill, rect.height),
        COLOR_PROGRESS,
    );
}

fn start_generation_thread(state: &AppState, topic: String) {
    if state.running.load(Ordering::SeqCst) {
        return;
    }

    state.running.store(true, Ordering::SeqCst);

    let running = Arc::clone(&state.running);
    let gen_state = Arc::clone(&state.gen_state);
    let log_buffer = Arc::clone(&state.log_buffer);

    std::thread::spawn(move || {
        let hook_buffer = Arc::clone(&log_buffer);
        let hook = Arc::new(Mutex::new(move |line: &str| {
            push_log_line(&hook_buffer, line);
        }));

        set_log_hook(Some(hook));

        // Starting a new run discards the previous one's state.
        *gen_state.lock().unwrap_or_else(|e| e.into_inner()) = GenerationState::idle();

        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(err) => {
                push_log_line(&log_buffer, &format!("[ERROR] {}", err));
                push_log_line(&log_buffer, "Failed to initialize async runtime");
                running.store(false, Ordering::SeqCst);
                set_log_hook(None);
                return;
            }
        };

        let shared = Arc::clone(&gen_state);
        let result = rt.block_on(async move {
            let cfg = Config::load("config.json").await?;
            init::ensure_directories(&cfg.output_dir).await?;
            let mut pipeline = build_pipeline(&cfg)?;
            pipeline.set_state_hook(Some(Arc::new(move |s: &GenerationState| {
                *shared.lock().unwrap_or_else(|e| e.into_inner()) = s.clone();
            })));
            pipeline.start_generation(&topic).await;
            anyhow::Ok(())
        });

        if let Err(err) = result {
            push_log_line(&log_buffer, &format!("[ERROR] {}", err));
        }

        set_log_hook(None);
        running.store(false, Ordering::SeqCst);
    });
}

fn snapshot_logs(buffer: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    buffer.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

fn clear_logs(buffer: &Arc<Mutex<Vec<String>>>) {
    buffer.lock().unwrap_or_else(|e| e.into_inner()).clear();
}

fn snapshot_state(state: &Arc<Mutex<GenerationState>>) -> GenerationState {
    state.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

fn main() {
    tracing_subscriber::fmt::init();

    // Resolve the configured output directory up front so the
    // open-folder button agrees with where clips land. Falls back to
    // the config default when config.json is absent.
    let rt = tokio::runtime::Runtime::new().expect("Failed to create async runtime");
    let output_dir = rt.block_on(async {
        match Config::load("config.json").await {
            Ok(cfg) => {
                if let Err(err) = init::ensure_directories(&cfg.output_dir).await {
                    eprintln!("[WARN] Failed to create output directory: {}", err);
                }
                cfg.output_dir
            }
            Err(err) => {
                eprintln!("[WARN] {:#}", err);
                "output".to_string()
            }
        }
    });
    drop(rt);

    let (mut rl, thread) = raylib::init()
        .size(920, 560)
        .resizable()
        .title("Mystery Shorts")
        .build();
    rl.set_target_fps(60);

    let state = AppState {
        running: Arc::new(AtomicBool::new(false)),
        gen_state: Arc::new(Mutex::new(GenerationState::idle())),
        log_buffer: Arc::new(Mutex::new(Vec::with_capacity(LOG_MAX_LINES))),
    };

    let mut topic = DEFAULT_TOPIC.to_string();

    while !rl.window_should_close() {
        let can_start = !state.running.load(Ordering::SeqCst);

        if can_start {
            while let Some(c) = rl.get_char_pressed() {
                if !c.is_control() && topic.chars().count() < TOPIC_MAX_CHARS {
                    topic.push(c);
                }
            }
            if rl.is_key_pressed(KeyboardKey::KEY_BACKSPACE) {
                topic.pop();
            }
        }

        let gen = snapshot_state(&state.gen_state);

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(COLOR_BG);

        d.draw_text("Which culinary mystery shall we film?", 30, 20, 20, Color::RAYWHITE);
        let input_rect = Rectangle::new(30.0, 50.0, 560.0, 40.0);
        d.draw_rectangle_rec(input_rect, COLOR_INPUT_BG);
        d.draw_rectangle_lines_ex(input_rect, 1.0, Color::new(60, 60, 60, 255));
        d.draw_text(&topic, 40, 62, 18, COLOR_LOG_TEXT);

        let start_label = if can_start {
            "GENERATE VIDEO"
        } else {
            "RUNNING..."
        };

        if draw_button(
            &mut d,
            Rectangle::new(30.0, 110.0, 260.0, 70.0),
            start_label,
            can_start,
            22.0,
        ) {
            clear_logs(&state.log_buffer);
            start_generation_thread(&state, topic.clone());
        }

        if draw_button(
            &mut d,
            Rectangle::new(330.0, 110.0, 260.0, 44.0),
            "Open Output Folder",
            true,
            18.0,
        ) {
            platform::reveal_output_dir(std::path::Path::new(&output_dir));
        }

        let status = format!(
            "Status: {} ({}%)",
            gen.step.as_str().to_uppercase(),
            gen.progress
        );
        d.draw_text(&status, 30, 200, 18, Color::new(220, 220, 220, 255));
        draw_progress_bar(&mut d, Rectangle::new(30.0, 228.0, 560.0, 14.0), gen.progress);

        if !gen.message.is_empty() {
            let color = if gen.step == Step::Error {
                Color::new(230, 90, 90, 255)
            } else {
                Color::new(220, 220, 220, 255)
            };
            d.draw_text(&gen.message, 30, 254, 16, color);
        }

        d.draw_text("Log", 30, 290, 24, Color::RAYWHITE);
        let lines = snapshot_logs(&state.log_buffer);
        draw_log_panel(
            &mut d,
            Rectangle::new(30.0, 324.0, 860.0, 210.0),
            &lines,
        );
    }
}
