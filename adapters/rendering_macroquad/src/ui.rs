//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the control panel UI for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Whether the reset button was pressed during this frame.
    pub reset_pressed: bool,
}

/// Snapshot of the control panel's layout and data for the current frame.
#[derive(Clone, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour of the panel window.
    pub background: Color,
    /// Progress readout shown above the button.
    pub label: &'a str,
    /// Whether a run is currently in flight.
    pub loading: bool,
}

/// Renders the progress readout and the reset button.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .font_size(28)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(22, 96, 136, 255))
        .color_hovered(Color::from_rgba(30, 124, 170, 255))
        .color_clicked(Color::from_rgba(16, 72, 104, 255))
        .color_inactive(Color::from_rgba(22, 96, 136, 160))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut button_pressed = false;
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, context.label);
        let status = if context.loading {
            "Terraforming..."
        } else {
            "Click the planet or restart."
        };
        ui.label(None, status);

        button_pressed = ui.button(None, "Restart terraforming");
    });

    ui.pop_skin();

    ControlPanelUiResult {
        reset_pressed: button_pressed,
    }
}
