//! UI 主题：树、面板、状态栏的颜色集中在这里。

use crate::kernel::ContainerState;
use ratatui::style::Color;

pub const COLOR_SUPPORT_ENV: &str = "DOCKTREE_COLOR_SUPPORT";

#[derive(Debug, Clone)]
pub struct UiTheme {
    pub focus_border: Color,
    pub inactive_border: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub muted_fg: Color,
    pub project_fg: Color,
    pub service_fg: Color,
    pub running_fg: Color,
    pub paused_fg: Color,
    pub exited_fg: Color,
    pub error_fg: Color,
    pub info_fg: Color,
    pub key_fg: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalColorSupport {
    TrueColor,
    Ansi256,
    Ansi16,
}

pub fn detect_terminal_color_support() -> TerminalColorSupport {
    if let Ok(value) = std::env::var(COLOR_SUPPORT_ENV) {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "truecolor" | "24bit" | "rgb" => return TerminalColorSupport::TrueColor,
            "256" | "ansi256" => return TerminalColorSupport::Ansi256,
            "16" | "ansi16" | "basic" => return TerminalColorSupport::Ansi16,
            _ => {}
        }
    }

    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let term = std::env::var("TERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") || term.contains("direct") {
        return TerminalColorSupport::TrueColor;
    }
    if term.contains("256color") {
        return TerminalColorSupport::Ansi256;
    }
    TerminalColorSupport::Ansi16
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            focus_border: Color::Indexed(6),    // Cyan
            inactive_border: Color::Indexed(8), // DarkGray
            selected_bg: Color::Indexed(8),
            selected_fg: Color::Indexed(15),
            muted_fg: Color::Indexed(8),
            project_fg: Color::Rgb(0x4F, 0xC1, 0xFF),
            service_fg: Color::Rgb(0x9C, 0xDC, 0xFE),
            running_fg: Color::Rgb(0x6A, 0xC9, 0x55),
            paused_fg: Color::Rgb(0xDC, 0xDC, 0xAA),
            exited_fg: Color::Rgb(0xD1, 0x69, 0x69),
            error_fg: Color::Indexed(1),
            info_fg: Color::Indexed(6),
            key_fg: Color::Indexed(3),
        }
    }
}

impl UiTheme {
    pub fn adapt_to_terminal_capabilities(&mut self) {
        self.apply_color_support(detect_terminal_color_support());
    }

    fn apply_color_support(&mut self, support: TerminalColorSupport) {
        if support == TerminalColorSupport::TrueColor {
            return;
        }
        for color in [
            &mut self.focus_border,
            &mut self.inactive_border,
            &mut self.selected_bg,
            &mut self.selected_fg,
            &mut self.muted_fg,
            &mut self.project_fg,
            &mut self.service_fg,
            &mut self.running_fg,
            &mut self.paused_fg,
            &mut self.exited_fg,
            &mut self.error_fg,
            &mut self.info_fg,
            &mut self.key_fg,
        ] {
            *color = map_color_for_support(*color, support);
        }
    }

    pub fn container_fg(&self, state: ContainerState) -> Color {
        match state {
            ContainerState::Running => self.running_fg,
            ContainerState::Paused | ContainerState::Restarting | ContainerState::Created => {
                self.paused_fg
            }
            _ => self.exited_fg,
        }
    }
}

fn map_color_for_support(color: Color, support: TerminalColorSupport) -> Color {
    match (support, color) {
        (TerminalColorSupport::TrueColor, value) => value,
        (TerminalColorSupport::Ansi256, Color::Rgb(r, g, b)) => {
            Color::Indexed(rgb_to_ansi256_index(r, g, b))
        }
        (TerminalColorSupport::Ansi16, Color::Rgb(r, g, b)) => {
            Color::Indexed(rgb_to_ansi16_index(r, g, b))
        }
        (_, value) => value,
    }
}

fn rgb_to_ansi256_index(r: u8, g: u8, b: u8) -> u8 {
    // 6x6x6 cube only; the 16 base colors vary between terminals.
    let level = |v: u8| -> u8 {
        match v {
            0..=47 => 0,
            48..=114 => 1,
            _ => (v - 35) / 40,
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

fn rgb_to_ansi16_index(r: u8, g: u8, b: u8) -> u8 {
    let mut best_index = 0u8;
    let mut best_distance = u32::MAX;

    for (index, (pr, pg, pb)) in ANSI16_RGB.iter().copied().enumerate() {
        let distance = color_distance_sq(r, g, b, pr, pg, pb);
        if distance < best_distance {
            best_distance = distance;
            best_index = index as u8;
        }
    }

    best_index
}

fn color_distance_sq(r1: u8, g1: u8, b1: u8, r2: u8, g2: u8, b2: u8) -> u32 {
    let dr = i32::from(r1) - i32::from(r2);
    let dg = i32::from(g1) - i32::from(g2);
    let db = i32::from(b1) - i32::from(b2);
    (dr * dr + dg * dg + db * db) as u32
}

const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

#[cfg(test)]
#[path = "../../tests/unit/app/theme.rs"]
mod tests;
