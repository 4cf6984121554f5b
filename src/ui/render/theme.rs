use ratatui::style::{Color, Modifier, Style};

pub(super) const UI_MARGIN: u16 = 1;
pub(super) const HEADER_HEIGHT: u16 = 3;
pub(super) const FOOTER_HEIGHT: u16 = 1;
pub(super) const SITE_LIST_WIDTH: u16 = 36;
pub(super) const CHART_MIN_HEIGHT: u16 = 8;
pub(super) const CHART_ROW_TOP: u16 = 50;
pub(super) const CHART_ROW_BOTTOM: u16 = 50;
/// Headroom above the largest plotted value.
pub(super) const Y_HEADROOM: f64 = 1.2;
/// Y range used when every value is absent or zero.
pub(super) const MIN_Y_MAX_SECS: f64 = 0.1;
pub(super) const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub(super) const CHART_BG_RGB: (u8, u8, u8) = (0x0a, 0x0a, 0x0a);
pub(super) const PANEL_BORDER_RGB: (u8, u8, u8) = (0xe5, 0xe7, 0xeb);
pub(super) const PANEL_TEXT_RGB: (u8, u8, u8) = (0xff, 0xff, 0xff);
pub(super) const PANEL_MUTED_RGB: (u8, u8, u8) = (0xd1, 0xd5, 0xdb);
pub(super) const SELECTED_BG_RGB: (u8, u8, u8) = (0x1f, 0x29, 0x37);
pub(super) const ACCENT_TTFB_RGB: (u8, u8, u8) = (0x60, 0xa5, 0xfa);
pub(super) const ACCENT_LOADING_RGB: (u8, u8, u8) = (0x34, 0xd3, 0x99);
pub(super) const ACCENT_GREEN_RGB: (u8, u8, u8) = (0x22, 0xc5, 0x5e);
pub(super) const ACCENT_AMBER_RGB: (u8, u8, u8) = (0xf5, 0x9e, 0x0b);
pub(super) const ACCENT_RED_RGB: (u8, u8, u8) = (0xef, 0x44, 0x44);

pub(super) fn style_color(no_color: bool, color: Color) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().fg(color)
    }
}

pub(super) const fn rgb(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub(super) fn panel_block_style(no_color: bool) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default()
            .bg(rgb(CHART_BG_RGB))
            .fg(rgb(PANEL_TEXT_RGB))
    }
}

pub(super) fn panel_border_style(no_color: bool) -> Style {
    style_color(no_color, rgb(PANEL_BORDER_RGB))
}

pub(super) fn panel_title_style(no_color: bool) -> Style {
    style_color(no_color, rgb(PANEL_TEXT_RGB)).add_modifier(Modifier::BOLD)
}

pub(super) fn muted_style(no_color: bool) -> Style {
    style_color(no_color, rgb(PANEL_MUTED_RGB))
}

pub(super) fn app_background_style(no_color: bool) -> Style {
    if no_color {
        Style::default()
    } else {
        Style::default().bg(rgb(CHART_BG_RGB))
    }
}

/// Highlight for the selected site; reversed video without color.
pub(super) fn selected_style(no_color: bool) -> Style {
    if no_color {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
            .bg(rgb(SELECTED_BG_RGB))
            .fg(rgb(PANEL_TEXT_RGB))
            .add_modifier(Modifier::BOLD)
    }
}
