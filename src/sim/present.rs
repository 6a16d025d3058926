/// Presentation boundary: the sinks a frontend implements and the routine
/// that feeds them one frame.
///
/// Sinks only display. Nothing here mutates the Session.

use super::projection;
use super::world::Session;

pub trait RenderSink {
    /// Flattened board, one line per row.
    fn show_board(&mut self, text: &str);
}

pub trait StatsSink {
    fn show_stats(&mut self, player: &str, enemies: &str);
}

pub trait MessageSink {
    fn show_message(&mut self, msg: &str);
    fn hide_message(&mut self);
}

pub trait DataPanelSink {
    fn show_panel(&mut self, text: &str);
    fn hide_panel(&mut self);
}

/// Everything a full frontend provides.
pub trait Sinks: RenderSink + StatsSink + MessageSink + DataPanelSink {}

impl<T: RenderSink + StatsSink + MessageSink + DataPanelSink> Sinks for T {}

/// Data panel selection.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Panel {
    Backpack,
    Enemies,
}

impl Panel {
    pub fn text(self, s: &Session) -> String {
        match self {
            Panel::Backpack => projection::backpack_listing(s),
            Panel::Enemies => projection::enemy_table(s),
        }
    }
}

/// Push the current Session to every sink.
pub fn present<S: Sinks + ?Sized>(s: &Session, panel: Option<Panel>, sink: &mut S) {
    sink.show_board(&s.board.to_text());
    sink.show_stats(&projection::player_summary(s), &projection::enemy_summary(s));
    match &s.message {
        Some(msg) => sink.show_message(msg),
        None => sink.hide_message(),
    }
    match panel {
        Some(p) => sink.show_panel(&p.text(s)),
        None => sink.hide_panel(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::entity::MoveDir;
    use crate::sim::step::resolve_turn;
    use crate::sim::world::tests::playing;

    /// Keeps the last value pushed to each sink.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub board: String,
        pub player: String,
        pub enemies: String,
        pub message: Option<String>,
        pub panel: Option<String>,
        pub frames: usize,
    }

    impl RenderSink for Recorder {
        fn show_board(&mut self, text: &str) {
            self.board = text.to_string();
            self.frames += 1;
        }
    }

    impl StatsSink for Recorder {
        fn show_stats(&mut self, player: &str, enemies: &str) {
            self.player = player.to_string();
            self.enemies = enemies.to_string();
        }
    }

    impl MessageSink for Recorder {
        fn show_message(&mut self, msg: &str) {
            self.message = Some(msg.to_string());
        }
        fn hide_message(&mut self) {
            self.message = None;
        }
    }

    impl DataPanelSink for Recorder {
        fn show_panel(&mut self, text: &str) {
            self.panel = Some(text.to_string());
        }
        fn hide_panel(&mut self) {
            self.panel = None;
        }
    }

    #[test]
    fn frame_reaches_every_sink() {
        let s = playing();
        let mut rec = Recorder::default();
        present(&s, None, &mut rec);
        assert_eq!(rec.board, s.board.to_text());
        assert_eq!(rec.board.lines().count(), 24);
        assert!(rec.player.starts_with("Name: Legolas (Elf)"));
        assert_eq!(rec.enemies, "Emu: 5\nRat: 10\n");
        assert_eq!(rec.message, None);
        assert_eq!(rec.panel, None);
    }

    #[test]
    fn message_shown_then_hidden() {
        let mut s = playing();
        for e in s.room_mut().enemies.iter_mut() {
            e.disturbed = false;
        }
        s.player.x = 11;
        s.player.y = 18;
        s.redraw();
        let mut rec = Recorder::default();

        resolve_turn(&mut s, MoveDir::Down).unwrap();
        present(&s, None, &mut rec);
        assert_eq!(rec.message.as_deref(), Some("You picked up: Peach!"));

        resolve_turn(&mut s, MoveDir::Up).unwrap();
        present(&s, None, &mut rec);
        assert_eq!(rec.message, None);
    }

    #[test]
    fn panel_does_not_touch_the_board() {
        let s = playing();
        let before = s.board.clone();
        let mut rec = Recorder::default();
        present(&s, Some(Panel::Backpack), &mut rec);
        assert_eq!(rec.panel.as_deref(), Some("Items:\nEmpty."));
        present(&s, Some(Panel::Enemies), &mut rec);
        assert!(rec.panel.as_deref().unwrap_or("").contains("Ratatouille"));
        assert_eq!(s.board, before);
        present(&s, None, &mut rec);
        assert_eq!(rec.panel, None);
        assert_eq!(rec.frames, 3);
    }
}
