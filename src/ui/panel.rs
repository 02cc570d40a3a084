//! Galaxy parameter and visibility panel
//!
//! Edits happen on local copies; a change is pushed to the scene as a
//! [`SceneEvent`] once the widget is released, so dragging a slider does
//! not regenerate the galaxy every frame.

use crate::config::Visibility;
use crate::events::{EventQueue, SceneEvent};
use crate::galaxy::{GalaxyParameters, Rgb};
use imgui::{Condition, Ui};

/// Read-only figures shown under the controls
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStatus {
    pub particles: usize,
    pub generation: u64,
    pub hovered_markers: usize,
    pub duck_hovered: bool,
    pub assets_loading: bool,
}

pub struct GalaxyPanel {
    parameters: GalaxyParameters,
    visibility: Visibility,
}

impl GalaxyPanel {
    pub fn new(parameters: GalaxyParameters, visibility: Visibility) -> Self {
        Self {
            parameters,
            visibility,
        }
    }

    pub fn parameters(&self) -> &GalaxyParameters {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn draw(&mut self, ui: &Ui, events: &mut EventQueue, status: &PanelStatus) {
        ui.window("Galaxy")
            .size([340.0, 430.0], Condition::FirstUseEver)
            .position([10.0, 10.0], Condition::FirstUseEver)
            .build(|| {
                if ui.collapsing_header("Visibility", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                    self.draw_visibility(ui, events);
                }
                if ui.collapsing_header("Generator", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                    self.draw_generator(ui, events);
                }

                ui.separator();
                ui.text(format!(
                    "Particles: {} (build #{})",
                    status.particles, status.generation
                ));
                ui.text(format!(
                    "Hovered: {} markers, duck {}",
                    status.hovered_markers,
                    if status.duck_hovered { "yes" } else { "no" }
                ));
                if status.assets_loading {
                    ui.text_disabled("Loading models...");
                }
            });
    }

    fn draw_visibility(&mut self, ui: &Ui, events: &mut EventQueue) {
        let mut changed = false;
        changed |= ui.checkbox("Show duck", &mut self.visibility.show_duck);
        changed |= ui.checkbox("Show fox", &mut self.visibility.show_fox);
        changed |= ui.checkbox("Show galaxy", &mut self.visibility.show_galaxy);
        if changed {
            events.push(SceneEvent::VisibilityChanged(self.visibility));
        }
    }

    fn draw_generator(&mut self, ui: &Ui, events: &mut EventQueue) {
        let params = &mut self.parameters;
        let mut committed = false;

        let mut count = params.count as u32;
        if ui.slider("Count", 100, 100_000, &mut count) {
            params.count = count as usize;
        }
        committed |= ui.is_item_deactivated_after_edit();

        ui.slider("Size", 0.001, 0.1, &mut params.size);
        committed |= ui.is_item_deactivated_after_edit();

        ui.slider("Radius", 0.01, 20.0, &mut params.radius);
        committed |= ui.is_item_deactivated_after_edit();

        let mut branches = params.branches as u32;
        if ui.slider("Branches", 1, 20, &mut branches) {
            params.branches = branches as usize;
        }
        committed |= ui.is_item_deactivated_after_edit();

        ui.slider("Spin", -5.0, 5.0, &mut params.spin);
        committed |= ui.is_item_deactivated_after_edit();

        ui.slider("Randomness", 0.0, 2.0, &mut params.randomness);
        committed |= ui.is_item_deactivated_after_edit();

        ui.slider("Randomness power", 1.0, 10.0, &mut params.randomness_power);
        committed |= ui.is_item_deactivated_after_edit();

        let mut inside = params.inside_color.to_array();
        if ui.color_edit3("Inside color", &mut inside) {
            params.inside_color = Rgb::from_array(inside);
        }
        committed |= ui.is_item_deactivated_after_edit();

        let mut outside = params.outside_color.to_array();
        if ui.color_edit3("Outside color", &mut outside) {
            params.outside_color = Rgb::from_array(outside);
        }
        committed |= ui.is_item_deactivated_after_edit();

        if ui.button("Reset") {
            *params = GalaxyParameters::default();
            committed = true;
        }

        if committed {
            events.push(SceneEvent::ParametersChanged(params.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_starts_from_given_state() {
        let params = GalaxyParameters {
            count: 500,
            ..GalaxyParameters::default()
        };
        let visibility = Visibility {
            show_fox: false,
            ..Visibility::default()
        };
        let panel = GalaxyPanel::new(params.clone(), visibility);

        assert_eq!(panel.parameters(), &params);
        assert!(!panel.visibility().show_fox);
        assert!(panel.visibility().show_duck);
    }
}
