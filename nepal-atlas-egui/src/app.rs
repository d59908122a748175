use std::sync::Arc;

use egui::{Color32, RichText};
use nepal_atlas::info::InfoPanel;
use nepal_atlas::layer::{OverlayKind, ShapeKind};
use nepal_atlas::loader::{BoundaryLoad, DataProvider, UrlDataProvider};
use nepal_atlas::{AppState, AtlasConfig, AtlasError, LoadStatus, MapView, Messenger};
use serde::{Deserialize, Serialize};

use crate::map_widget::MapWidget;

const DRAW_TOOLS: [ShapeKind; 4] = [
    ShapeKind::Polyline,
    ShapeKind::Polygon,
    ShapeKind::Rectangle,
    ShapeKind::Marker,
];

/// Settings restored on the next start.
#[derive(Debug, Serialize, Deserialize)]
struct SavedSettings {
    view: MapView,
    basemap: String,
    overlays: Vec<(OverlayKind, bool)>,
}

#[derive(Debug, Clone)]
struct RepaintMessenger {
    context: egui::Context,
}

impl Messenger for RepaintMessenger {
    fn request_redraw(&self) {
        log::trace!("Redraw requested");
        self.context.request_repaint();
    }
}

pub struct AtlasApp {
    state: AppState,
    map: MapWidget,
    provider: Arc<dyn DataProvider>,
    messenger: Arc<dyn Messenger>,
    boundary_load: Option<BoundaryLoad>,
}

impl AtlasApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AtlasConfig) -> Result<Self, AtlasError> {
        let provider: Arc<dyn DataProvider> = Arc::new(UrlDataProvider::from_config(&config)?);
        let messenger: Arc<dyn Messenger> = Arc::new(RepaintMessenger {
            context: cc.egui_ctx.clone(),
        });

        let mut state = AppState::new(config)?;
        if let Some(saved) = cc
            .storage
            .and_then(|storage| eframe::get_value::<SavedSettings>(storage, eframe::APP_KEY))
        {
            restore(&mut state, saved);
        }

        let mut app = Self {
            state,
            map: MapWidget::new(provider.clone(), messenger.clone()),
            provider,
            messenger,
            boundary_load: None,
        };
        app.start_load();

        Ok(app)
    }

    fn start_load(&mut self) {
        self.state.begin_load();
        self.boundary_load = Some(BoundaryLoad::spawn(
            self.provider.clone(),
            self.state.config().overlays.clone(),
            Some(self.messenger.clone()),
        ));
    }

    fn poll_load(&mut self) {
        let Some(load) = &mut self.boundary_load else {
            return;
        };

        if let Some(result) = load.poll() {
            self.boundary_load = None;
            self.state.apply_boundaries(result);
        }
    }

    fn layers_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Basemap");
        let active = self.state.basemaps().active_index();
        let names: Vec<String> = self
            .state
            .basemaps()
            .iter()
            .map(|basemap| basemap.name().to_string())
            .collect();
        for (index, name) in names.iter().enumerate() {
            if ui.radio(index == active, name.as_str()).clicked() {
                self.state.select_basemap(index);
            }
        }

        ui.add_space(4.0);
        ui.heading("Overlays");
        for kind in OverlayKind::ALL {
            let mut visible = self.state.overlays().get(kind).is_visible();
            if ui.checkbox(&mut visible, kind.layer_name()).changed() {
                self.state.set_overlay_visible(kind, visible);
            }
        }
    }

    fn query_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Query");
        for kind in OverlayKind::ALL {
            if ui
                .radio(self.state.query_layer() == Some(kind), kind.feature_name())
                .clicked()
            {
                self.state.select_query_layer(kind);
            }
        }
    }

    fn draw_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Draw");
        ui.horizontal_wrapped(|ui| {
            for tool in DRAW_TOOLS {
                let selected = self.state.draw_session().tool() == Some(tool);
                if ui.selectable_label(selected, tool.name()).clicked() {
                    if selected {
                        self.state.cancel_drawing();
                    } else {
                        self.state.start_drawing(tool);
                    }
                }
            }
        });

        if self.state.draw_session().is_active() {
            ui.horizontal(|ui| {
                if ui.button("Finish").clicked() {
                    if let Err(err) = self.state.finish_drawing() {
                        log::debug!("Shape was not finished: {err}");
                    }
                }
                if ui.button("Cancel").clicked() {
                    self.state.cancel_drawing();
                }
            });
        }

        let mut remove = None;
        for (index, shape) in self.state.drawn().iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(format!("{}. {}", index + 1, shape.as_ref().kind().name()));
                if ui.small_button("✕").on_hover_text("Remove").clicked() {
                    remove = Some(index);
                }
            });
        }
        if let Some(index) = remove {
            self.state.remove_drawn(index);
        }

        if !self.state.drawn().is_empty() && ui.button("Clear drawings").clicked() {
            self.state.clear_drawn();
        }

        if let Some(measurement) = self.state.measurement() {
            ui.label(RichText::new(measurement.to_string()).strong());
        }
    }

    fn tools_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Spatial tools");

        let range = self.state.config().buffer;
        let mut distance = self.state.buffer_distance();
        let slider = egui::Slider::new(&mut distance, range.min_km..=range.max_km)
            .step_by(range.step_km)
            .show_value(false);
        if ui.add(slider).changed() {
            self.state.set_buffer_distance(distance);
        }
        ui.label(format!("Buffer distance: {} km", self.state.buffer_distance()));

        ui.horizontal_wrapped(|ui| {
            if ui.button("Buffer").clicked() {
                if let Err(err) = self.state.buffer() {
                    log::debug!("Buffer was not created: {err}");
                }
            }
            if ui.button("Centroid").clicked() {
                if let Err(err) = self.state.centroid() {
                    log::debug!("Centroid was not created: {err}");
                }
            }
            if ui.button("Union").clicked() {
                if let Err(err) = self.state.union() {
                    log::debug!("Union was not created: {err}");
                }
            }
        });

        if !self.state.results().is_empty() && ui.button("Clear results").clicked() {
            self.state.clear_results();
        }
    }

    fn info_ui(&self, ui: &mut egui::Ui) {
        let info = self.state.info();
        match info {
            InfoPanel::Empty => return,
            InfoPanel::Message(message) => {
                ui.label(message.as_str());
            }
            InfoPanel::Attributes(table) => {
                ui.heading(nepal_atlas::info::ATTRIBUTES_TITLE);
                egui::Grid::new("attributes")
                    .striped(true)
                    .num_columns(2)
                    .show(ui, |ui| {
                        for (key, value) in table.rows() {
                            ui.label(RichText::new(key).strong());
                            ui.label(value.as_str());
                            ui.end_row();
                        }
                    });
            }
        }

        ui.horizontal(|ui| {
            if ui.small_button("Copy text").clicked() {
                ui.ctx().copy_text(info.to_text());
            }
            if ui.small_button("Copy HTML").clicked() {
                ui.ctx().copy_text(info.to_html());
            }
        });
    }

    fn status_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.state.load_status().clone() {
                LoadStatus::NotStarted => {}
                LoadStatus::Loading => {
                    ui.spinner();
                    ui.label("Loading boundaries...");
                }
                LoadStatus::Loaded => {
                    ui.label(format!(
                        "{} boundary layers loaded",
                        self.state.overlays().populated_count()
                    ));
                }
                LoadStatus::Failed(message) => {
                    ui.colored_label(Color32::RED, format!("Boundaries were not loaded: {message}"));
                    if ui.button("Retry").clicked() {
                        self.start_load();
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let attribution = self.state.basemaps().active().attribution();
                match attribution.get_url() {
                    Some(url) => ui.hyperlink_to(attribution.get_text(), url),
                    None => ui.label(attribution.get_text()),
                };
            });
        });
    }

    fn alert_ui(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.state.alert() else {
            return;
        };

        let message = alert.to_string();
        let mut dismissed = false;
        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed || ctx.input(|input| input.key_pressed(egui::Key::Enter)) {
            self.state.dismiss_alert();
        }
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();

        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
            self.state.cancel_drawing();
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_ui(ui));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.layers_ui(ui);
                    ui.separator();
                    self.query_ui(ui);
                    ui.separator();
                    self.draw_ui(ui);
                    ui.separator();
                    self.tools_ui(ui);
                    ui.separator();
                    self.info_ui(ui);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.map.render(ui, &mut self.state));

        self.alert_ui(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = SavedSettings {
            view: *self.state.view(),
            basemap: self.state.basemaps().active().name().to_string(),
            overlays: OverlayKind::ALL
                .iter()
                .map(|kind| (*kind, self.state.overlays().get(*kind).is_visible()))
                .collect(),
        };
        eframe::set_value(storage, eframe::APP_KEY, &settings);
    }
}

fn restore(state: &mut AppState, saved: SavedSettings) {
    state.set_view(saved.view);

    let index = state
        .basemaps()
        .iter()
        .position(|basemap| basemap.name() == saved.basemap);
    if let Some(index) = index {
        state.select_basemap(index);
    }

    for (kind, visible) in saved.overlays {
        state.set_overlay_visible(kind, visible);
    }
}
