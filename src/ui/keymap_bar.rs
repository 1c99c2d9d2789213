//! Keymap help bar UI component.

use crate::app::Focus;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Which key set the help bar describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeymapMode {
    /// Open-file prompt.
    Prompt,
    /// Plot overlay.
    Plot,
    /// Main screen with the given focus.
    Browse(Focus),
}

/// Draw the keymap help bar.
pub(super) fn draw_keymap(f: &mut Frame<'_>, area: Rect, mode: KeymapMode, colors: &ThemeColors) {
    let keymap_text = match mode {
        KeymapMode::Prompt => "Enter:open | Esc:cancel | Type a file path",
        KeymapMode::Plot => "m:mode | +-:row | c:colors | q/Esc:close",
        KeymapMode::Browse(Focus::Tree) => {
            "q:quit | jk:nav | hl:collapse/expand | gg/G:first/last | Tab:attrs | p:plot | o:open | T:theme"
        },
        KeymapMode::Browse(Focus::Attributes) => {
            "q:quit | jk:nav | 1/2/3:tab | Enter/Space:toggle | Tab:tree | p:plot | T:theme"
        },
    };

    let paragraph =
        Paragraph::new(keymap_text).style(Style::default().fg(colors.fg0).bg(colors.bg0));

    f.render_widget(paragraph, area);
}
