//! Egui application: the map with the navigation panel.

use std::sync::Arc;

use egui::{Align, Layout};
use galileo_egui::{EguiMap, EguiMapState};
use parking_lot::RwLock;
use towermap::TowerMapApp;

use crate::surface::GalileoSurface;

pub type SharedApp = Arc<RwLock<TowerMapApp<GalileoSurface>>>;

const BASIC_PANEL_WIDTH: f32 = 500.0;

pub struct ViewerApp {
    map: EguiMapState,
    app: SharedApp,
}

impl ViewerApp {
    pub fn new(map: EguiMapState, app: SharedApp) -> Self {
        Self { map, app }
    }

    fn toolbar(&self, ui: &mut egui::Ui) {
        let mut app = self.app.write();
        ui.horizontal(|ui| {
            if ui.button("☰").clicked() {
                app.nav_mut().toggle_basic();
            }
            if ui.button(app.nav().advanced_label()).clicked() {
                app.nav_mut().toggle_advanced();
            }
        });
    }

    fn details(&self, ui: &mut egui::Ui) {
        let app = self.app.read();
        let Some(feature) = app.selected_feature() else {
            ui.label("Click a tower or a coverage area to see its details.");
            return;
        };

        ui.heading(feature.properties.name().unwrap_or("Unnamed"));
        egui::Grid::new("properties")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (key, value) in feature.properties.iter() {
                    ui.label(key);
                    ui.label(value.to_label());
                    ui.end_row();
                }
            });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let notice = self.app.read().copyright_notice();
        egui::TopBottomPanel::bottom("copyright").show(ctx, |ui| {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.small(notice);
            });
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        let (is_open, is_advanced) = {
            let app = self.app.read();
            (app.nav().is_open(), app.nav().is_advanced())
        };

        if is_advanced {
            egui::CentralPanel::default().show(ctx, |ui| self.details(ui));
            return;
        }

        if is_open {
            egui::SidePanel::left("nav")
                .exact_width(BASIC_PANEL_WIDTH)
                .show(ctx, |ui| self.details(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            EguiMap::new(&mut self.map).show_ui(ui);
        });
    }
}
