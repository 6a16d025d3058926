/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Sinks receive the frame's text blocks (board, stats, message, panel)
///   2. Compose builds the next screen into the `front` buffer
///   3. Only cells that differ from `back` (previous screen) are emitted
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout while playing:
///   row 0           player summary
///   rows 2..        board (one column per cell) | living enemies
///   below board     message bar, help line
///   data panel      boxed overlay on top of the board area

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::present::{DataPanelSink, MessageSink, RenderSink, StatsSink};

use super::input::StartForm;

// ── ScreenCell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct ScreenCell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl ScreenCell {
    /// Explicit background for every cell, so cleared areas and drawn
    /// areas match.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 24 };

    const BLANK: ScreenCell = ScreenCell { ch: ' ', fg: Color::White, bg: ScreenCell::BASE_BG };

    /// Never produced by compose, so every position differs from it.
    const INVALID: ScreenCell = ScreenCell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        ScreenCell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of ScreenCells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<ScreenCell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![ScreenCell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![ScreenCell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(ScreenCell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: ScreenCell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> ScreenCell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            ScreenCell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies one column; clipped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, ScreenCell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, ScreenCell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect::<String>().trim_end().to_string()
    }
}

// ── Frame text pushed through the sinks ──

#[derive(Default)]
struct FrameText {
    board: String,
    player: String,
    enemies: String,
    message: Option<String>,
    panel: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Start,
    Playing,
    GameOver,
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 30, g: 30, b: 70 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 170, b: 60 };
const PANEL_BG: Color = Color::Rgb { r: 40, g: 40, b: 48 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 60 };
const GOOD: Color = Color::Rgb { r: 90, g: 230, b: 90 };
const BAD: Color = Color::Rgb { r: 240, g: 70, b: 70 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
    frame: FrameText,
    /// Help line shown under the board.
    pub help: String,
    /// Key names shown on the game-over screen.
    pub restart_key: String,
    pub quit_key: String,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            frame: FrameText::default(),
            help: String::new(),
            restart_key: "r".into(),
            quit_key: "q".into(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(ScreenCell::BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn draw_start(&mut self, form: &StartForm) -> io::Result<()> {
        self.begin(Screen::Start)?;
        self.compose_start(form);
        self.finish()
    }

    /// Draw the play screen from whatever the sinks last received.
    pub fn draw_playing(&mut self) -> io::Result<()> {
        self.begin(Screen::Playing)?;
        self.compose_playing();
        self.finish()
    }

    pub fn draw_game_over(&mut self, summary: &str) -> io::Result<()> {
        self.begin(Screen::GameOver)?;
        self.compose_game_over(summary);
        self.finish()
    }

    // ── Frame lifecycle ──

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(ScreenCell::INVALID);
    }

    fn begin(&mut self, screen: Screen) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(ScreenCell::BASE_BG), Clear(ClearType::All))?;
        }
        if self.last_screen != Some(screen) {
            self.back.cells.fill(ScreenCell::INVALID);
            queue!(self.writer, SetBackgroundColor(ScreenCell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }
        self.front.clear();
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = ScreenCell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_start(&mut self, form: &StartForm) {
        let title = [
            r"  ___                                 ___                 _ ",
            r" |   \ _  _ _ _  __ _ ___ ___ _ _    / __|_ _ __ ___ __ _| |",
            r" | |) | || | ' \/ _` / -_) _ \ ' \  | (__| '_/ _` \ V  V / |",
            r" |___/ \_,_|_||_\__, \___\___/_||_|  \___|_| \__,_|\_/\_/|_|",
            r"                |___/                                       ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 1 + i, line, ACCENT, Color::Reset);
        }

        let base = 8;
        self.front.put_str(6, base, "Name:", Color::White, Color::Reset);
        let name_field = format!("{:<width$}", form.name, width = super::input::NAME_MAX + 1);
        self.front.put_str(13, base, &name_field, Color::Black, MSG_BG);
        self.front.put_str(13 + form.name.chars().count(), base, "_", Color::Black, MSG_BG);

        self.front.put_str(6, base + 2, "Race:", Color::White, Color::Reset);
        let race = format!("< {} >", form.race());
        self.front.put_str(13, base + 2, &race, GOOD, Color::Reset);

        let help = [
            "Type a name (empty keeps the default)",
            "Tab / Left / Right   change race",
            "Enter                enter the dungeon",
            "Esc                  quit",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_str(6, base + 5 + i, line, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_playing(&mut self) {
        let buf_w = self.front.width;

        // ── HUD row ──
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(" {} ", self.frame.player);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Board ──
        let mut board_w = 0;
        let mut board_h = 0;
        for (dy, line) in self.frame.board.lines().enumerate() {
            let row = MAP_ROW + dy;
            for (dx, ch) in line.chars().enumerate() {
                self.front.set(dx, row, ScreenCell::new(ch, glyph_color(ch), Color::Reset));
            }
            board_w = board_w.max(line.chars().count());
            board_h = dy + 1;
        }

        // ── Enemy list beside the board ──
        let side_x = board_w + 2;
        if side_x < buf_w {
            self.front.put_str(side_x, MAP_ROW, "Enemies", ACCENT, Color::Reset);
            for (i, line) in self.frame.enemies.lines().enumerate() {
                self.front.put_str(side_x, MAP_ROW + 1 + i, line, BAD, Color::Reset);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + board_h + 1;
        if let Some(msg) = &self.frame.message {
            let text = format!(" > {msg} ");
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &text, Color::Black, MSG_BG);
        }

        // ── Help line ──
        let help = self.help.clone();
        self.front.put_str(0, msg_row + 2, &help, Color::DarkGrey, Color::Reset);

        // ── Data panel overlay ──
        if let Some(panel) = self.frame.panel.clone() {
            self.compose_panel(&panel, board_w, board_h);
        }
    }

    /// Boxed panel centred over the board area.
    fn compose_panel(&mut self, text: &str, board_w: usize, board_h: usize) {
        let lines: Vec<&str> = text.lines().collect();
        let inner_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_w = inner_w + 4;
        let box_h = lines.len() + 2;
        let box_x = board_w.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + board_h.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, ScreenCell::new(' ', Color::White, PANEL_BG));
            }
        }
        let edge = format!("+{}+", "-".repeat(box_w - 2));
        self.front.put_str(box_x, box_y, &edge, ACCENT, PANEL_BG);
        self.front.put_str(box_x, box_y + box_h - 1, &edge, ACCENT, PANEL_BG);
        for (i, line) in lines.iter().enumerate() {
            let fg = if i == 0 { ACCENT } else { Color::White };
            self.front.put_str(box_x + 2, box_y + 1 + i, line, fg, PANEL_BG);
        }
    }

    fn compose_game_over(&mut self, summary: &str) {
        let box_art = [
            "+================================+",
            "|        YOU HAVE DIED           |",
            "+================================+",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 3 + i, l, BAD, Color::Reset);
        }
        self.front.put_str(6, 8, summary, Color::White, Color::Reset);
        let restart = format!("{:<6} restart", self.restart_key);
        let quit = format!("{:<6} quit", self.quit_key);
        self.front.put_str(6, 10, &restart, GOOD, Color::Reset);
        self.front.put_str(6, 11, &quit, Color::DarkGrey, Color::Reset);
    }
}

/// Colour for a board glyph.
fn glyph_color(ch: char) -> Color {
    match ch {
        '#' => Color::Grey,
        '@' => Color::Rgb { r: 255, g: 240, b: 80 },
        'R' => Color::Rgb { r: 200, g: 120, b: 90 },
        'E' => Color::Rgb { r: 230, g: 90, b: 60 },
        'D' => Color::Rgb { r: 255, g: 40, b: 40 },
        'f' => GOOD,
        's' => Color::Rgb { r: 100, g: 200, b: 255 },
        'a' => Color::Rgb { r: 160, g: 160, b: 255 },
        '"' | '=' => Color::Magenta,
        _ => Color::White,
    }
}

// ── Sinks ──

impl RenderSink for Renderer {
    fn show_board(&mut self, text: &str) {
        self.frame.board = text.to_string();
    }
}

impl StatsSink for Renderer {
    fn show_stats(&mut self, player: &str, enemies: &str) {
        self.frame.player = player.to_string();
        self.frame.enemies = enemies.to_string();
    }
}

impl MessageSink for Renderer {
    fn show_message(&mut self, msg: &str) {
        self.frame.message = Some(msg.to_string());
    }
    fn hide_message(&mut self) {
        self.frame.message = None;
    }
}

impl DataPanelSink for Renderer {
    fn show_panel(&mut self, text: &str) {
        self.frame.panel = Some(text.to_string());
    }
    fn hide_panel(&mut self) {
        self.frame.panel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::present::{present, Panel};
    use crate::sim::world::tests::playing;

    fn offscreen() -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(140, 32);
        r.back.resize(140, 32);
        r
    }

    #[test]
    fn playing_screen_layout() {
        let s = playing();
        let mut r = offscreen();
        r.help = "WASD move".into();
        present(&s, None, &mut r);
        r.compose_playing();

        assert!(r.front.row_text(HUD_ROW).contains("Name: Legolas (Elf)"));
        assert_eq!(r.front.get(15, MAP_ROW + 15).ch, '@');
        assert_eq!(r.front.get(0, MAP_ROW).ch, '#');
        assert_eq!(r.front.get(12, MAP_ROW + 11).fg, glyph_color('R'));
        assert!(r.front.row_text(MAP_ROW + 1).ends_with("Emu: 5"));
        // no message: bar row left blank
        assert_eq!(r.front.row_text(MAP_ROW + 25), "");
        assert_eq!(r.front.row_text(MAP_ROW + 27), "WASD move");
    }

    #[test]
    fn message_and_panel_overlay() {
        let mut s = playing();
        s.set_message("You picked up: Peach!".into());
        let mut r = offscreen();
        present(&s, Some(Panel::Backpack), &mut r);
        r.compose_playing();

        assert!(r.front.row_text(MAP_ROW + 25).contains("You picked up: Peach!"));
        let shown = (0..r.front.height).any(|y| r.front.row_text(y).contains("Items:"));
        assert!(shown);
        // the overlay never reaches the session board
        assert_eq!(s.board.get(15, 15), crate::domain::cell::Cell::Player);
    }

    #[test]
    fn start_and_game_over_screens() {
        let mut r = offscreen();
        let mut form = StartForm::new(&["Elf".to_string(), "Orc".to_string()], "Elf");
        form.name = "Gimli".into();
        r.compose_start(&form);
        assert!(r.front.row_text(8).contains("Gimli"));
        assert!(r.front.row_text(10).contains("< Elf >"));

        r.front.clear();
        r.compose_game_over("Name: Gimli (Orc) | Health: 0");
        assert!(r.front.row_text(4).contains("YOU HAVE DIED"));
        assert!(r.front.row_text(8).contains("Health: 0"));
        assert!(r.front.row_text(10).trim_start().starts_with("r "));
        assert!(r.front.row_text(10).ends_with("restart"));

        r.restart_key = "F5".into();
        r.quit_key = "Esc".into();
        r.front.clear();
        r.compose_game_over("Name: Gimli (Orc) | Health: 0");
        assert!(r.front.row_text(10).contains("F5     restart"));
        assert!(r.front.row_text(11).contains("Esc    quit"));
    }
}
