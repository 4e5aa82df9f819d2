use egui::{Color32, Mesh, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use kerbside::render::{MeshPoint, PolygonMesh, ViewTransform};
use kerbside::{Color, Polygon, RenderOptions};

const ZOOM_SPEED: f32 = 0.002;

/// Widget showing a collection of polygons.
///
/// Dragging with the mouse moves the view, scrolling zooms it around the pointer and a double click
/// fits all the polygons back into the widget.
pub struct EguiPolygons {
    mesh: PolygonMesh,
    options: RenderOptions,
    transform: Option<ViewTransform>,
}

impl EguiPolygons {
    /// Tessellates the polygons for display.
    pub fn new(polygons: &[Polygon<f64>], options: RenderOptions) -> Self {
        let mesh = PolygonMesh::tessellate(polygons);
        log::debug!(
            "Prepared {} triangles and {} outlines for display",
            mesh.indices().len() / 3,
            mesh.outlines().len()
        );

        Self {
            mesh,
            options,
            transform: None,
        }
    }

    /// Draws the widget into all the available space of `ui` and handles its input.
    pub fn show_ui(&mut self, ui: &mut Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size().floor(), Sense::click_and_drag());

        if response.double_clicked() {
            self.transform = None;
        }

        let mut transform = self.transform.unwrap_or_else(|| self.fit(rect.size()));

        if response.dragged() {
            let delta = response.drag_delta();
            transform = transform.pan([delta.x, delta.y]);
        }

        if let Some(pointer) = response.hover_pos() {
            let scroll = ui.input(|input| input.smooth_scroll_delta.y);
            if scroll != 0.0 {
                let anchor = pointer - rect.min;
                transform = transform.zoom((scroll * ZOOM_SPEED).exp(), [anchor.x, anchor.y]);
            }
        }

        self.transform = Some(transform);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, to_color32(self.options.background));
        painter.add(Shape::mesh(self.screen_mesh(&transform, rect.min)));

        if self.options.draws_outline() {
            painter.extend(self.outline_shapes(&transform, rect.min));
        }
    }

    fn fit(&self, size: Vec2) -> ViewTransform {
        self.mesh
            .local_bounds()
            .map(|bounds| ViewTransform::fit(bounds, [size.x, size.y], self.options.margin))
            .unwrap_or_default()
    }

    fn screen_mesh(&self, transform: &ViewTransform, origin: Pos2) -> Mesh {
        let fill = to_color32(self.options.fill);
        let mut mesh = Mesh::default();
        for vertex in self.mesh.vertices() {
            mesh.colored_vertex(to_pos(transform.apply(*vertex), origin), fill);
        }
        mesh.indices.extend_from_slice(self.mesh.indices());

        mesh
    }

    fn outline_shapes<'a>(
        &'a self,
        transform: &'a ViewTransform,
        origin: Pos2,
    ) -> impl Iterator<Item = Shape> + 'a {
        let stroke = Stroke::new(self.options.outline_width, to_color32(self.options.outline));
        self.mesh.outlines().iter().map(move |ring| {
            Shape::closed_line(
                ring.iter()
                    .map(|p| to_pos(transform.apply(*p), origin))
                    .collect(),
                stroke,
            )
        })
    }
}

fn to_pos(point: MeshPoint, origin: Pos2) -> Pos2 {
    Pos2::new(origin.x + point[0], origin.y + point[1])
}

/// Converts Kerbside color into egui color.
pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}
