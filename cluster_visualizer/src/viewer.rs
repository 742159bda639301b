use std::path::{Path, PathBuf};

use cluster_data::OverwritePolicy;
use eframe::egui;

use crate::{
    dialog::{Dialog, DialogWidget},
    figure::Figure,
    palette::Color,
    render, PlotError,
};

const SLICE_PANEL_WIDTH: f32 = 240.;

/// Opens a window showing `figure` and blocks until it is closed.
pub fn show(figure: Figure, pixels_per_unit: u32) -> Result<(), PlotError> {
    let image = render::render_rgb(&figure, pixels_per_unit)?;
    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(
            (image.width() as f32 + SLICE_PANEL_WIDTH + 40.).min(1600.0),
            (image.height() as f32 + 60.).min(1000.0),
        )),
        ..Default::default()
    };
    tracing::debug!("Opening viewer for {} slices.", figure.slice_count());
    eframe::run_native(
        "Cluster Visualizer",
        options,
        Box::new(move |cc| Box::new(FigureViewer::new(cc, figure, image, pixels_per_unit))),
    )
    .map_err(|e| PlotError::Viewer(e.to_string()))
}

/// Persisted between runs.
#[derive(serde::Deserialize, serde::Serialize, Default)]
struct ViewerSettings {
    mode: DarkLightMode,
    last_directory: Option<PathBuf>,
}

struct FigureViewer {
    settings: ViewerSettings,
    figure: Figure,
    image: image::RgbImage,
    texture: egui::TextureHandle,
    pixels_per_unit: u32,
    dialogs: DialogWidget,
}

enum MenuAction {
    SaveAs,
    Copy,
    Quit,
}

impl FigureViewer {
    fn new(
        cc: &eframe::CreationContext,
        figure: Figure,
        image: image::RgbImage,
        pixels_per_unit: u32,
    ) -> Self {
        let settings: ViewerSettings = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Default::default()
        };
        cc.egui_ctx.set_visuals(settings.mode.visuals());
        let size = [image.width() as usize, image.height() as usize];
        let texture = cc.egui_ctx.load_texture(
            "figure",
            egui::ColorImage::from_rgb(size, image.as_raw()),
            egui::TextureOptions::LINEAR,
        );
        Self {
            settings,
            figure,
            image,
            texture,
            pixels_per_unit,
            dialogs: Default::default(),
        }
    }

    #[must_use]
    fn menu(&mut self, ui: &mut egui::Ui) -> Option<MenuAction> {
        let mut action = None;
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Save as…").clicked() {
                    action = Some(MenuAction::SaveAs);
                    ui.close_menu();
                }
                if ui.button("Copy").clicked() {
                    action = Some(MenuAction::Copy);
                    ui.close_menu();
                }
                if ui.button("Quit").clicked() {
                    action = Some(MenuAction::Quit);
                    ui.close_menu();
                }
            });
            let (icon, hover, next) = match self.settings.mode {
                DarkLightMode::Dark => ("☀", "Switch to light mode", DarkLightMode::Light),
                DarkLightMode::Light => ("🌙", "Switch to dark mode", DarkLightMode::Dark),
            };
            if ui
                .add(egui::Button::new(icon).frame(false))
                .on_hover_text(hover)
                .clicked()
            {
                self.settings.mode = next;
                ui.ctx().set_visuals(next.visuals());
            }
        });
        action
    }

    fn save_as(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .add_filter("SVG image", &["svg"])
            .set_file_name("clusters.png");
        if let Some(directory) = &self.settings.last_directory {
            dialog = dialog.set_directory(directory);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        self.settings.last_directory = path.parent().map(Path::to_path_buf);
        // the native dialog already asked before replacing a file
        if let Err(e) = render::save(
            &self.figure,
            &path,
            self.pixels_per_unit,
            OverwritePolicy::Overwrite,
        ) {
            tracing::error!("Saving '{}' failed: {e}", path.display());
            self.dialogs.push(Dialog::error("Saving failed", &e));
        }
    }

    fn copy(&mut self) {
        let rgba = image::DynamicImage::ImageRgb8(self.image.clone()).into_rgba8();
        let image = arboard::ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: rgba.into_raw().into(),
        };
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_image(image));
        if let Err(e) = copied {
            tracing::error!("Copying the figure failed: {e}");
            self.dialogs.push(Dialog::error("Copying failed", &e));
        }
    }

    fn slice_table(&self, ui: &mut egui::Ui) {
        let clusters = self
            .figure
            .visible_panels()
            .next()
            .map(|p| p.series.iter().map(|s| (s.cluster, s.color)).collect::<Vec<_>>())
            .unwrap_or_default();
        egui_extras::TableBuilder::new(ui)
            .striped(true)
            .column(egui_extras::Column::auto().resizable(true))
            .columns(egui_extras::Column::auto(), clusters.len())
            .header(20., |mut header| {
                header.col(|ui| {
                    ui.strong("Slice");
                });
                for (cluster, color) in &clusters {
                    header.col(|ui| {
                        ui.colored_label(color32(*color), cluster.to_string());
                    });
                }
            })
            .body(|mut body| {
                for (title, counts) in slice_summary(&self.figure) {
                    body.row(18., |mut row| {
                        row.col(|ui| {
                            ui.label(title);
                        });
                        for count in counts {
                            row.col(|ui| {
                                ui.label(count.to_string());
                            });
                        }
                    });
                }
            });
    }
}

impl eframe::App for FigureViewer {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let dialogs_are_done = self.dialogs.progress(ctx);
        let mut action = None;
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.set_enabled(dialogs_are_done);
            action = self.menu(ui);
        });
        match action {
            Some(MenuAction::SaveAs) => self.save_as(),
            Some(MenuAction::Copy) => self.copy(),
            Some(MenuAction::Quit) => frame.close(),
            None => {}
        }
        egui::SidePanel::left("slices")
            .resizable(true)
            .default_width(SLICE_PANEL_WIDTH)
            .show(ctx, |ui| {
                ui.set_enabled(dialogs_are_done);
                self.slice_table(ui);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_enabled(dialogs_are_done);
            egui::ScrollArea::both().show(ui, |ui| {
                ui.image(&self.texture, self.texture.size_vec2());
            });
        });
    }

    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }
}

/// Title and points per cluster of every visible panel.
fn slice_summary(figure: &Figure) -> Vec<(String, Vec<usize>)> {
    figure
        .visible_panels()
        .map(|panel| {
            let title = if panel.title.is_empty() {
                "all".to_string()
            } else {
                panel.title.clone()
            };
            (title, panel.series.iter().map(|s| s.len()).collect())
        })
        .collect()
}

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

#[derive(PartialEq, Default, serde::Deserialize, serde::Serialize, Clone, Copy)]
enum DarkLightMode {
    Dark,
    #[default]
    Light,
}
impl DarkLightMode {
    fn visuals(&self) -> egui::Visuals {
        match self {
            DarkLightMode::Dark => egui::Visuals::dark(),
            DarkLightMode::Light => egui::Visuals::light(),
        }
    }
}

#[test]
fn summary_counts_points_per_cluster() {
    use crate::figure::{AxisLimits, GridGeometry, Panel, Series};
    use crate::palette::Marker;
    use cluster_data::ClusterId;

    let series = |cluster, n: usize| Series {
        cluster: ClusterId::new(cluster),
        color: Color::RED,
        marker: Marker::Circle,
        coordinates: vec![vec![0.; n], vec![1.; n]],
    };
    let panel = |column, title: &str, visible, series| Panel {
        row: 0,
        column,
        visible,
        title: title.to_string(),
        limits: vec![AxisLimits { min: 0., max: 1. }; 2],
        axis_titles: vec![None, None],
        x_tick_labels: false,
        y_tick_labels: false,
        series,
    };
    let figure = Figure {
        axes: vec!["x".into(), "y".into()],
        grid: GridGeometry { rows: 1, columns: 3 },
        subplot_size: (4., 4.),
        panels: vec![
            panel(0, "l=0.00", true, vec![series(1, 3), series(2, 0)]),
            panel(1, "", true, vec![series(1, 1), series(2, 2)]),
            panel(2, "", false, vec![]),
        ],
    };
    assert_eq!(
        slice_summary(&figure),
        vec![
            ("l=0.00".to_string(), vec![3, 0]),
            ("all".to_string(), vec![1, 2]),
        ]
    );
}
