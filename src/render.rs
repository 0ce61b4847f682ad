use crate::config::Settings;
use crate::lesson::{hypothesis_feedback, page_text, REVIEW_QUESTIONS};
use crate::model::{EquipmentItem, Hypothesis, LessonPhase, PhysicsModel, FLAME_MAX};
use crate::particles::ParticleKind;
use crate::session::Session;
use crossterm::{
    cursor,
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Pixel {
    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn clear(&mut self, p: Pixel) {
        self.px.fill(p);
    }
    fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }

    fn hline(&mut self, x0: i32, x1: i32, y: i32, p: Pixel) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.blend_over(x, y, p);
        }
    }

    fn vline(&mut self, x: i32, y0: i32, y1: i32, p: Pixel) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.blend_over(x, y, p);
        }
    }

    fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, p: Pixel) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.hline(x0, x1, y, p);
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        // Braille: 2×4 pixels per cell
        let canvas = PixelCanvas::new(cols as u32 * 2, rows as u32 * 4);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
            canvas,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        // blank prev matches a blank screen only after a clear
        queue!(self.out, Clear(ClearType::All))?;
        log::debug!("terminal resized to {}x{}", c, r);
        Ok(true)
    }

    /// Writes only the cells that changed since the last frame.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for (x, y, c) in changed_cells(&self.prev, &self.cur) {
            queue!(self.out, cursor::MoveTo(x, y))?;

            if last_fg != Some(c.fg) {
                queue!(self.out, SetForegroundColor(c.fg))?;
                last_fg = Some(c.fg);
            }
            if last_bg != Some(c.bg) {
                queue!(self.out, SetBackgroundColor(c.bg))?;
                last_bg = Some(c.bg);
            }

            queue!(self.out, Print(c.ch))?;
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/// Cells of `cur` that differ from `prev`, row-major. Both buffers share a size.
fn changed_cells<'a>(
    prev: &'a CellBuffer,
    cur: &'a CellBuffer,
) -> impl Iterator<Item = (u16, u16, Cell)> + 'a {
    let w = cur.w.max(1) as usize;
    cur.cells
        .iter()
        .zip(&prev.cells)
        .enumerate()
        .filter(|(_, (c, p))| c != p)
        .map(move |(i, (c, _))| ((i % w) as u16, (i / w) as u16, *c))
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

/// Converts the canvas region under `vp` (in cells) to braille glyphs.
pub(crate) fn canvas_to_cells(
    canvas: &PixelCanvas,
    out: &mut CellBuffer,
    vp: Viewport,
    enable_color: bool,
    bg: Color,
) {
    let x_end = (vp.x + vp.w).clamp(0, out.w as i32) as u32;
    let y_end = (vp.y + vp.h).clamp(0, out.h as i32) as u32;

    for cy in vp.y.max(0) as u32..y_end {
        for cx in vp.x.max(0) as u32..x_end {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];

                    // threshold: treat alpha as ink
                    if p.a >= 32 {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink_count += 1;
                    }
                }
            }

            if mask == 0 {
                continue;
            }
            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');

            let fg = if enable_color && ink_count > 0 {
                Color::Rgb {
                    r: (sum_r / ink_count) as u8,
                    g: (sum_g / ink_count) as u8,
                    b: (sum_b / ink_count) as u8,
                }
            } else {
                Color::White
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

/* -----------------------------
   Apparatus schematic
------------------------------ */

/// Rectangle in whatever unit the caller works in (cells or subpixels).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewport {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
}

const GLASS: Pixel = Pixel::rgba(170, 200, 220, 200);
const METAL: Pixel = Pixel::rgba(140, 140, 150, 220);
const SAMPLE: Pixel = Pixel::rgba(245, 245, 235, 235);
const ICE: Pixel = Pixel::rgba(140, 220, 255, 230);
const CRYSTAL: Pixel = Pixel::rgba(250, 250, 255, 240);
const VAPOR: Pixel = Pixel::rgba(210, 210, 210, 90);

pub(crate) struct Renderer;

impl Renderer {
    /// Draws placed equipment and the live experiment into a subpixel viewport.
    pub(crate) fn draw_apparatus(canvas: &mut PixelCanvas, s: &Session, vp: Viewport) {
        let eq = &s.equipment;
        let st = &s.state;
        let fx = |f: f32| vp.x + (vp.w as f32 * f) as i32;
        let fy = |f: f32| vp.y + (vp.h as f32 * f) as i32;

        let cx = fx(0.5);
        let half_w = (vp.w as f32 * 0.18) as i32;
        let top = fy(0.2);
        let bottom = fy(0.62);

        if eq.tripod {
            canvas.hline(cx - half_w - 4, cx + half_w + 4, bottom + 1, METAL);
            for (x0, x1) in [(cx - half_w, cx - half_w - 6), (cx + half_w, cx + half_w + 6)] {
                let y_end = fy(0.92);
                let steps = (y_end - bottom).max(1);
                for i in 0..=steps {
                    let x = x0 + (x1 - x0) * i / steps;
                    canvas.blend_over(x, bottom + 1 + i, METAL);
                }
            }
        }

        if eq.burner {
            canvas.fill(cx - 5, fy(0.86), cx + 5, fy(0.95), METAL);
            if st.heating_active {
                let t = st.flame_intensity as f32 / FLAME_MAX as f32;
                let height = (vp.h as f32 * 0.14 * t).max(2.0) as i32;
                let base = fy(0.86) - 1;
                for i in 0..height {
                    let width = ((height - i) as f32 / height as f32 * 4.0) as i32;
                    let hot = 255 - (i * 120 / height.max(1)) as u8;
                    let p = Pixel::rgba(255, hot, 40, 230);
                    canvas.hline(cx - width, cx + width, base - i, p);
                }
            }
        }

        if eq.beaker {
            canvas.vline(cx - half_w, top, bottom, GLASS);
            canvas.vline(cx + half_w, top, bottom, GLASS);
            canvas.hline(cx - half_w, cx + half_w, bottom, GLASS);

            // vapor haze thickens with sublimation and thins as it deposits
            let haze = (st.sublimation_level - st.crystallization_level).max(0.0) / 100.0;
            if haze > 0.0 {
                let a = (VAPOR.a as f32 * haze.sqrt()) as u8;
                let phase = (st.experiment_time % 3) as i32;
                for y in top + 2..bottom - 1 {
                    for x in cx - half_w + 1..cx + half_w {
                        if (x + y + phase) % 3 == 0 {
                            canvas.blend_over(x, y, Pixel { a, ..VAPOR });
                        }
                    }
                }
            }
        }

        if eq.sample {
            let pile = (st.naphthalene_mass / 100.0 * vp.h as f32 * 0.06).round() as i32;
            if pile > 0 {
                let pile_w = half_w / 2;
                canvas.fill(cx - pile_w, bottom - pile, cx + pile_w, bottom - 1, SAMPLE);
            }
        }

        if eq.watch_glass {
            let gw = half_w + 4;
            for dx in -gw..=gw {
                let sag = dx * dx * 3 / (gw * gw).max(1);
                canvas.blend_over(cx + dx, top - 2 + (3 - sag), GLASS);
            }

            // crystals cluster under the glass
            let count = (st.crystallization_level / 100.0 * (gw * 2) as f32 * 1.5) as i32;
            for i in 0..count {
                let dx = ((i * 37) % (gw * 2 + 1)) - gw;
                let sag = dx * dx * 3 / (gw * gw).max(1);
                let dy = 2 + (i * 13) % 3;
                canvas.blend_over(cx + dx, top - 2 + (3 - sag) + dy, CRYSTAL);
            }
        }

        if eq.ice {
            for i in 0..4 {
                let x = cx - 6 + i * 4;
                canvas.fill(x, top - 6, x + 2, top - 4, ICE);
            }
        }

        for p in s.particles.iter() {
            let color = match p.kind {
                ParticleKind::Vapor => Pixel::rgba(220, 220, 230, 200),
                ParticleKind::Crystal => CRYSTAL,
                ParticleKind::Heat => Pixel::rgba(255, 120, 40, 210),
            };
            let a = (color.a as f32 * (0.3 + 0.7 * p.freshness())) as u8;
            canvas.blend_over(fx(p.x), fy(p.y), Pixel { a, ..color });
        }
    }
}

pub(crate) fn draw_apparatus_ascii(buf: &mut CellBuffer, s: &Session, cx: i32, cy: i32) {
    let bg = Color::Black;
    let eq = &s.equipment;
    let st = &s.state;

    let mut grid: Vec<(String, Color)> = Vec::new();
    if eq.ice {
        grid.push(("     ▪ ▪ ▪ ▪     ".into(), Color::Cyan));
    } else {
        grid.push(("                 ".into(), Color::White));
    }
    if eq.watch_glass {
        let crystals = (st.crystallization_level / 100.0 * 11.0).round() as usize;
        let under: String = (0..11).map(|i| if i < crystals { '*' } else { ' ' }).collect();
        grid.push(("   \\_________/   ".into(), Color::Grey));
        grid.push((format!("    {under}    "), Color::White));
    } else {
        grid.push(("                 ".into(), Color::White));
        grid.push(("                 ".into(), Color::White));
    }
    let vapor = if st.sublimation_level > 50.0 {
        "~ ~ ~ ~ ~"
    } else if st.sublimation_level > 5.0 {
        " ~   ~   "
    } else {
        "         "
    };
    if eq.beaker {
        grid.push((format!("    |  {vapor}|    "), Color::Grey));
        grid.push((format!("    |  {vapor}|    "), Color::Grey));
        let sample = if !eq.sample || st.naphthalene_mass <= 0.0 {
            "         "
        } else if st.naphthalene_mass > 50.0 {
            "  █████  "
        } else {
            "   ▄▄▄   "
        };
        grid.push((format!("    |{sample}  |    "), Color::Grey));
        grid.push(("    |___________|    ".into(), Color::Grey));
    }
    if eq.tripod {
        grid.push(("   /  ========  \\   ".into(), Color::DarkGrey));
    }
    if eq.burner {
        let flame = if st.heating_active {
            if st.flame_intensity > 60 {
                "  (^^^)  "
            } else {
                "   (^)   "
            }
        } else {
            "         "
        };
        grid.push((format!("  /   {flame}   \\  "), Color::Red));
        grid.push(("       [=====]       ".into(), Color::DarkGrey));
    }

    let h = grid.len() as i32;
    let y0 = cy - h / 2;
    for (yy, (line, fg)) in grid.iter().enumerate() {
        let y = y0 + yy as i32;
        if y < 0 || y >= buf.h as i32 {
            continue;
        }
        let x0 = cx - line.chars().count() as i32 / 2;
        let mut x = x0;
        for ch in line.chars() {
            if x >= 0 && x < buf.w as i32 {
                buf.set(x as u16, y as u16, Cell { ch, fg: *fg, bg });
            }
            x += 1;
        }
    }
}

/* -----------------------------
   Text panel
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Whether the apparatus schematic shares the screen on this page.
pub(crate) fn shows_apparatus(phase: LessonPhase) -> bool {
    matches!(phase, LessonPhase::Setup | LessonPhase::Experiment)
}

/// Writes lines top-down inside the panel, dropping any past `max_y`.
struct Panel<'a> {
    buf: &'a mut CellBuffer,
    x: u16,
    y: u16,
    w: usize,
    max_y: u16,
}

impl Panel<'_> {
    fn line(&mut self, s: &str, fg: Color) {
        if self.y < self.max_y {
            let clipped = clip(s, self.w);
            draw_text(self.buf, self.x, self.y, &clipped, fg, Color::Black);
        }
        self.y = self.y.saturating_add(1);
    }

    fn gap(&mut self) {
        self.y = self.y.saturating_add(1);
    }
}

pub(crate) fn ui_overlay(buf: &mut CellBuffer, s: &Session, settings: &Settings, panel_w: u16) {
    let bg = Color::Black;
    let fg = Color::White;
    let dim = Color::DarkGrey;

    let lesson = s.lesson;
    let title = format!(
        "Süblimleşme ve Kırağılaşma  |  {}/{} {}",
        lesson.index() + 1,
        LessonPhase::ALL.len(),
        lesson.label()
    );
    let title = clip(&title, buf.w.saturating_sub(2) as usize);
    draw_text(buf, 1, 0, &title, Color::Cyan, bg);

    let footer_y = buf.h.saturating_sub(1);
    let notice_y = buf.h.saturating_sub(2);
    let mut p = Panel {
        buf: &mut *buf,
        x: 1,
        y: 2,
        w: panel_w.saturating_sub(2) as usize,
        max_y: notice_y,
    };

    for line in page_text(lesson) {
        p.line(line, fg);
    }
    if !page_text(lesson).is_empty() {
        p.gap();
    }

    match lesson {
        LessonPhase::Setup => draw_setup(&mut p, s),
        LessonPhase::Hypothesis => draw_hypothesis(&mut p, s),
        LessonPhase::Experiment => draw_experiment(&mut p, s, settings),
        LessonPhase::Observation => draw_observations(&mut p, s),
        LessonPhase::Analysis => draw_analysis(&mut p, s),
        LessonPhase::Evaluation => draw_evaluation(&mut p, s),
        _ => {}
    }

    if let Some(notice) = s.notice {
        draw_text(buf, 1, notice_y, &format!("⚠ {notice}"), Color::Yellow, bg);
    }

    let help = match lesson {
        LessonPhase::Setup => "1-5 yerleştir | ←/→ sayfa | r sıfırla | h yardım | q çık",
        LessonPhase::Hypothesis => "1-3 seç | enter devam | ←/→ sayfa | h yardım | q çık",
        LessonPhase::Experiment => {
            "space ısıt/durdur | ↑↓ alev | i buz | r sıfırla | ←/→ sayfa | m ses | q çık"
        }
        LessonPhase::Evaluation => "yazın | tab soru | enter cevaplar | ←/→ sayfa | esc çık",
        _ => "←/→ sayfa | r sıfırla | m ses | h yardım | q çık",
    };
    let sound = if settings.sound_enabled { "ses açık" } else { "ses kapalı" };
    draw_text(buf, 1, footer_y, &format!("{help}  [{sound}]"), dim, bg);
}

fn draw_setup(p: &mut Panel<'_>, s: &Session) {
    p.line("Malzemeleri yerleştirin:", Color::White);
    for (i, item) in EquipmentItem::ALL.iter().enumerate() {
        if *item == EquipmentItem::Ice {
            continue;
        }
        let placed = s.equipment.is_placed(*item);
        let mark = if placed { "[x]" } else { "[ ]" };
        let fg = if placed { Color::Green } else { Color::White };
        p.line(&format!("  {} {} {}", i + 1, mark, item.label()), fg);
    }
    p.gap();
    if s.state.setup_complete {
        p.line("Düzenek hazır! Deney sayfasında ısıtmaya başlayabilirsiniz.", Color::Green);
    }
}

fn draw_hypothesis(p: &mut Panel<'_>, s: &Session) {
    for (i, h) in Hypothesis::ALL.iter().enumerate() {
        let chosen = s.hypothesis == Some(*h);
        let mark = if chosen { "(•)" } else { "( )" };
        let fg = if chosen { Color::Cyan } else { Color::White };
        p.line(&format!("  {} {} {}", i + 1, mark, h.label()), fg);
    }
}

fn draw_experiment(p: &mut Panel<'_>, s: &Session, settings: &Settings) {
    let st = &s.state;
    let width = 16;
    let gauge = |name: &str, v: f32, max: f32, unit: &str| {
        format!("{name:<13} {} {:>6.1}{unit}", bar(v / max, width), v)
    };

    let heat_col = if st.heating_active { Color::Red } else { Color::White };
    p.line(&gauge("Sıcaklık", st.temperature, s.rules.max_temp_c, "°C"), heat_col);
    p.line(&gauge("Süblimleşme", st.sublimation_level, 100.0, "%"), Color::White);
    p.line(&gauge("Naftalin", st.naphthalene_mass, 100.0, "%"), Color::White);
    p.line(&gauge("Kristalleşme", st.crystallization_level, 100.0, "%"), Color::Cyan);
    if st.heating_active {
        p.line(&gauge("Alev", st.flame_intensity as f32, 100.0, "%"), Color::Yellow);
    } else {
        p.line("Alev          (ocak kapalı)", Color::DarkGrey);
    }
    p.gap();

    p.line(
        &format!(
            "Aşama: {}   Süre: {} {}   Kristal: {:.2} mm",
            s.phase.label(),
            if s.timer_running() { "▶" } else { "■" },
            s.rules.elapsed_label(st.experiment_time),
            st.crystal_size_mm()
        ),
        Color::White,
    );
    if settings.model == PhysicsModel::Extended {
        p.line(
            &format!(
                "Basınç {:.1} hPa | Nem %{:.0} | Buhar {:.2} | İletim {:.2}",
                st.pressure_hpa, st.humidity, st.vapor_density, st.heat_conduction
            ),
            Color::DarkGrey,
        );
    }

    let ice_hint = if st.ice_added {
        "Buz eklendi, saat camı soğuyor."
    } else if st.sublimation_level < crate::model::ICE_MIN_SUBLIMATION {
        "Buz: önce süblimleşmeyi bekleyin."
    } else {
        "Buz eklenebilir (i)."
    };
    p.line(ice_hint, Color::DarkGrey);
    if !st.setup_complete {
        p.line("Düzenek eksik: önce Düzenek Kurma sayfasını tamamlayın.", Color::Yellow);
    }
    p.gap();

    p.line("Son gözlemler:", Color::White);
    let recs = s.log.records();
    for rec in recs.iter().skip(recs.len().saturating_sub(3)) {
        p.line(
            &format!("  {:>4} {:>4}°C  {}", rec.time, rec.temperature, rec.stage),
            Color::Grey,
        );
    }
}

fn draw_observations(p: &mut Panel<'_>, s: &Session) {
    let recs = s.log.records();
    if recs.is_empty() {
        p.line("Henüz gözlem yok. Deney sayfasında ısıtmaya başlayın.", Color::DarkGrey);
        return;
    }
    p.line(
        &format!("{:<24} {:>5} {:>6}  {}", "Aşama", "Zaman", "Sıc.", "Gözlem"),
        Color::Cyan,
    );
    for rec in recs {
        p.line(
            &format!(
                "{:<24} {:>5} {:>4}°C  {}",
                rec.stage, rec.time, rec.temperature, rec.observation
            ),
            Color::White,
        );
        p.line(&format!("{:<38}↳ {}", "", rec.explanation), Color::DarkGrey);
    }
}

fn draw_analysis(p: &mut Panel<'_>, s: &Session) {
    let st = &s.state;
    p.line(
        &format!(
            "Ölçülen: {:.0}°C, süblimleşme %{:.1}, kalan naftalin %{:.1}, kristal %{:.1}",
            st.temperature, st.sublimation_level, st.naphthalene_mass, st.crystallization_level
        ),
        Color::White,
    );
    p.gap();
    if let Some(h) = s.hypothesis {
        let fg = if h.is_correct() { Color::Green } else { Color::Yellow };
        p.line("Hipotez Kontrolü", Color::Cyan);
        p.line(hypothesis_feedback(h.is_correct()), fg);
    }
}

fn draw_evaluation(p: &mut Panel<'_>, s: &Session) {
    for (i, q) in REVIEW_QUESTIONS.iter().enumerate() {
        let focused = s.answer_focus == i;
        p.line(
            &format!("{}. {}", i + 1, q.question),
            if focused { Color::Cyan } else { Color::White },
        );
        let cursor = if focused { "_" } else { "" };
        p.line(&format!("   > {}{}", s.answers[i], cursor), Color::White);
        p.line(&format!("   İpucu: {}", q.hint), Color::DarkGrey);
        p.gap();
    }
    if s.answers_revealed {
        p.line("Örnek Cevaplar", Color::Green);
        for (i, q) in REVIEW_QUESTIONS.iter().enumerate() {
            p.line(&format!("  {}. {}", i + 1, q.sample_answer), Color::Green);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rules;

    fn row(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).map(|x| buf.cells[buf.idx(x, y)].ch).collect()
    }

    #[test]
    fn notice_is_drawn_above_footer() {
        let mut s = Session::new(Rules::default(), 1, 8);
        s.notice = Some(crate::error::Blocked::SetupIncomplete);
        let mut buf = CellBuffer::new(100, 30);
        ui_overlay(&mut buf, &s, &Settings::default(), 100);
        assert!(row(&buf, 28).contains("Önce düzeneği tamamlayın."));
    }

    #[test]
    fn only_changed_cells_are_presented() {
        let prev = CellBuffer::new(4, 3);
        let mut cur = CellBuffer::new(4, 3);
        assert_eq!(changed_cells(&prev, &cur).count(), 0);

        draw_text(&mut cur, 1, 2, "ab", Color::Green, Color::Black);
        let dirty: Vec<_> = changed_cells(&prev, &cur).map(|(x, y, c)| (x, y, c.ch)).collect();
        assert_eq!(dirty, vec![(1, 2, 'a'), (2, 2, 'b')]);
    }

    #[test]
    fn clip_marks_truncation() {
        assert_eq!(clip("abcdef", 4), "abc…");
        assert_eq!(clip("abc", 4), "abc");
    }

    #[test]
    fn apparatus_draws_only_placed_items() {
        let s = Session::new(Rules::default(), 1, 8);
        let mut canvas = PixelCanvas::new(80, 80);
        let vp = Viewport {
            x: 0,
            y: 0,
            w: 80,
            h: 80,
        };
        Renderer::draw_apparatus(&mut canvas, &s, vp);
        assert!(canvas.px.iter().all(|p| p.a == 0));
    }
}
