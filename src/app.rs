use crate::audio::Bell;
use crate::config::{save_settings_atomic, toggle_sound, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_intent};
use crate::model::Rules;
use crate::render::{
    canvas_to_cells, draw_apparatus_ascii, draw_text, shows_apparatus, ui_overlay, Cell,
    Renderer, Terminal, Viewport,
};
use crate::session::{Intent, Session};
use crossterm::style::Color;
use std::cmp::{max, min};
use std::time::{Duration, Instant};

const HELP: &str = "Sayfalar arasında ←/→ ile gezinin.\n\
Düzenek Kurma: 1-5 ile malzemeleri yerleştirin.\n\
Hipotez: 1-3 ile seçin; seçmeden deneye geçilemez.\n\n\
Deney Prosedürü:\n\
  space  ısıtmayı başlat / durdur\n\
  ↑ ↓    alev şiddeti (%20-%100), 2-9/0 doğrudan\n\
  i      saat camına buz ekle (süblimleşme %10 olmalı)\n\
  r      deneyi sıfırla\n\n\
m sesi açar/kapatır. Esc veya F1 bu pencereyi kapatır.";

pub(crate) struct App {
    /// As read from disk; only in-app choices are written back.
    saved: Settings,
    /// `saved` with command-line overrides applied.
    settings: Settings,
    session: Session,
    paths: Paths,
    term: Terminal,
    bell: Bell,
    should_quit: bool,
}

impl App {
    fn init(saved: Settings, settings: Settings, paths: Paths) -> anyhow::Result<Self> {
        let rules = Rules::for_model(settings.model);
        let session = Session::new(rules, settings.seed, settings.particle_cap);
        log::info!(
            "starting with {:?} model, {:?} per tick",
            session.rules.model,
            session.tick_period()
        );
        let bell = Bell {
            enabled: settings.sound_enabled,
        };

        let term = Terminal::begin()?;

        Ok(Self {
            saved,
            settings,
            session,
            paths,
            term,
            bell,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        let mut last_frame = Instant::now();

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            // input
            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                let Some(intent) = map_event_to_intent(&self.session, ev) else {
                    continue;
                };
                match intent {
                    Intent::Quit => {
                        self.should_quit = true;
                        break;
                    }
                    Intent::ToggleSound => {
                        self.bell.enabled = toggle_sound(&mut self.settings, &mut self.saved);
                    }
                    // a refusal stays on screen as the session notice
                    _ => {
                        let _ = self.session.apply(intent, &mut self.bell);
                    }
                }
            }

            // physics runs only through the session's ticker
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            self.session.advance(real_dt, &mut self.bell);
            self.session.animate();

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.saved)?;
        log::info!(
            "quit after {} ticks, {} observations",
            self.session.state.experiment_time,
            self.session.log.records().len()
        );
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = Color::Black;
        self.term.cur.clear(bg);

        let cols = self.term.cols as i32;
        let rows = self.term.rows as i32;
        let lesson = self.session.lesson;

        let panel_w = if shows_apparatus(lesson) {
            max(0, min(max(48, cols * 3 / 5), cols - 10))
        } else {
            cols
        };

        if shows_apparatus(lesson) {
            // apparatus sits right of the text panel, between title and notice rows
            let cells = Viewport {
                x: panel_w,
                y: 1,
                w: cols - panel_w,
                h: max(0, rows - 3),
            };
            if self.settings.enable_braille {
                self.term.canvas.clear(crate::render::Pixel::default());
                let vp = Viewport {
                    x: cells.x * 2,
                    y: cells.y * 4,
                    w: cells.w * 2,
                    h: cells.h * 4,
                };
                Renderer::draw_apparatus(&mut self.term.canvas, &self.session, vp);
                canvas_to_cells(
                    &self.term.canvas,
                    &mut self.term.cur,
                    cells,
                    self.settings.enable_color,
                    bg,
                );
            } else {
                draw_apparatus_ascii(
                    &mut self.term.cur,
                    &self.session,
                    cells.x + cells.w / 2,
                    cells.y + cells.h / 2,
                );
            }
        }

        ui_overlay(
            &mut self.term.cur,
            &self.session,
            &self.settings,
            panel_w.max(0) as u16,
        );

        if self.session.show_help {
            self.draw_center_box("Yardım", HELP);
        }

        self.term.present()?;
        Ok(())
    }

    fn draw_center_box(&mut self, title: &str, body: &str) {
        let w = self.term.cols;
        let h = self.term.rows;

        let bw = min(64, w.saturating_sub(4));
        let bh = min(18, h.saturating_sub(4));
        if bw < 4 || bh < 4 {
            return;
        }

        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;
        let frame = |ch| Cell {
            ch,
            fg: Color::White,
            bg: Color::Black,
        };

        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                self.term.cur.set(x, y, frame(' '));
            }
        }
        for x in x0..x0 + bw {
            self.term.cur.set(x, y0, frame('─'));
            self.term.cur.set(x, y0 + bh - 1, frame('─'));
        }
        for y in y0..y0 + bh {
            self.term.cur.set(x0, y, frame('│'));
            self.term.cur.set(x0 + bw - 1, y, frame('│'));
        }
        self.term.cur.set(x0, y0, frame('┌'));
        self.term.cur.set(x0 + bw - 1, y0, frame('┐'));
        self.term.cur.set(x0, y0 + bh - 1, frame('└'));
        self.term.cur.set(x0 + bw - 1, y0 + bh - 1, frame('┘'));

        draw_text(&mut self.term.cur, x0 + 2, y0 + 1, title, Color::Cyan, Color::Black);

        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y0 + bh - 1 {
                break;
            }
            draw_text(&mut self.term.cur, x0 + 2, yy, line, Color::White, Color::Black);
            yy += 1;
        }
    }
}

pub(crate) fn run(saved: Settings, settings: Settings, paths: Paths) -> anyhow::Result<()> {
    let mut app = App::init(saved, settings, paths)?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
