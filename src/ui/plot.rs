use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::{ANOMALY_COLOR, BATTERY_COLOR};
use crate::data::projector::display_label;
use crate::data::range::DisplayZone;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Time-series charts (central panel)
// ---------------------------------------------------------------------------

/// A plot with date-time labels on the x axis and hover labels.
fn time_plot(id: &str, height: f32, y_label: &str, zone: DisplayZone) -> Plot<'static> {
    Plot::new(id.to_string())
        .height(height)
        .legend(Legend::default())
        .y_axis_label(y_label.to_string())
        .x_axis_formatter(move |mark, _range| display_label(mark.value, zone))
        .label_formatter(move |name, value| {
            let when = display_label(value.x, zone);
            if name.is_empty() {
                format!("{when}\n{:.3}", value.y)
            } else {
                format!("{name}\n{when}\n{:.3}", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
}

fn empty_chart(ui: &mut Ui, height: f32, message: &str) {
    ui.allocate_ui([ui.available_width(), height].into(), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(message);
        });
    });
}

pub fn battery_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let view = state.projector.view();
    if !view.primary.has_values() || view.primary.is_empty() {
        empty_chart(ui, height, "No battery data in view.");
        return;
    }

    let points: PlotPoints = view.primary.points().into();
    time_plot("battery_plot", height, "Voltage (V)", state.projector.zone()).show(
        ui,
        |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Battery Voltage")
                    .color(BATTERY_COLOR)
                    .width(1.5),
            );
        },
    );
}

/// Selected strain channel with the anomaly markers that fall in view.
pub fn strain_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let channel = state.selected_channel.as_str();
    let points = state.projector.view().channel_points(channel);
    if points.is_empty() {
        empty_chart(ui, height, &format!("No {channel} data in view."));
        return;
    }

    let color: Color32 = state.palette.color_for(channel);
    let markers = state.anomaly_points();
    time_plot("strain_plot", height, "Strain", state.projector.zone()).show(
        ui,
        |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points))
                    .name(channel)
                    .color(color)
                    .width(1.5),
            );
            if !markers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(markers))
                        .name("Anomaly")
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(4.0)
                        .color(ANOMALY_COLOR),
                );
            }
        },
    );
}
