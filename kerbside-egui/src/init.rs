use kerbside::error::KerbsideError;
use kerbside::{Polygon, RenderOptions, Renderer};

use crate::EguiPolygons;

struct PolygonsApp {
    polygons: EguiPolygons,
}

impl eframe::App for PolygonsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                self.polygons.show_ui(ui);
            });
    }
}

/// Shows polygons in a native window.
///
/// [`Renderer::render`] blocks until the window is closed.
#[derive(Default)]
pub struct EguiRenderer {
    native_options: Option<eframe::NativeOptions>,
}

impl EguiRenderer {
    /// Creates a renderer with the window configured from [`RenderOptions`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given native options for the next window instead of the ones derived from
    /// [`RenderOptions`].
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    fn native_options(&mut self, options: &RenderOptions) -> eframe::NativeOptions {
        self.native_options
            .take()
            .unwrap_or_else(|| eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([options.size[0] as f32, options.size[1] as f32])
                    .with_title(options.title.clone()),
                ..Default::default()
            })
    }
}

impl Renderer for EguiRenderer {
    fn render(
        &mut self,
        polygons: &[Polygon<f64>],
        options: &RenderOptions,
    ) -> Result<(), KerbsideError> {
        let app = PolygonsApp {
            polygons: EguiPolygons::new(polygons, options.clone()),
        };

        log::info!("Opening window with {} polygons", polygons.len());
        eframe::run_native(
            &options.title,
            self.native_options(options),
            Box::new(move |_cc| Ok(Box::new(app))),
        )
        .map_err(|err| KerbsideError::Render(err.to_string()))
    }
}
