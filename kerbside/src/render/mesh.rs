use geo::BoundingRect;
use geo_types::{Polygon, Rect};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

/// Point in mesh or screen space.
pub type MeshPoint = [f32; 2];

/// Triangulated polygons.
///
/// Coordinates of the mesh are relative to the center of the polygons' bounding rectangle, so
/// that large projected coordinates keep their precision in `f32`.
#[derive(Debug, Clone)]
pub struct PolygonMesh {
    origin: [f64; 2],
    bounds: Option<Rect<f64>>,
    buffers: VertexBuffers<MeshPoint, u32>,
    outlines: Vec<Vec<MeshPoint>>,
}

impl PolygonMesh {
    /// Tessellates the polygons. Polygons that cannot be tessellated are skipped with a warning.
    pub fn tessellate(polygons: &[Polygon<f64>]) -> Self {
        let bounds = collection_bounds(polygons);
        let origin = bounds
            .map(|bounds| [bounds.center().x, bounds.center().y])
            .unwrap_or_default();

        let mut buffers = VertexBuffers::new();
        let mut outlines = vec![];
        let mut tessellator = FillTessellator::new();

        for polygon in polygons {
            let mut builder = Path::builder();
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                let points: Vec<MeshPoint> = ring
                    .coords()
                    .map(|c| [(c.x - origin[0]) as f32, (c.y - origin[1]) as f32])
                    .collect();

                let Some((first, mut rest)) = points.split_first() else {
                    continue;
                };
                if rest.last() == Some(first) {
                    rest = &rest[..rest.len() - 1];
                }

                let _ = builder.begin(point(first[0], first[1]));
                for p in rest {
                    let _ = builder.line_to(point(p[0], p[1]));
                }
                builder.end(true);

                outlines.push(points);
            }

            let path = builder.build();
            if let Err(err) = tessellator.tessellate_path(
                &path,
                &FillOptions::DEFAULT,
                &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                    vertex.position().to_array()
                }),
            ) {
                log::warn!("Tessellation failed: {err:?}");
            }
        }

        Self {
            origin,
            bounds,
            buffers,
            outlines,
        }
    }

    /// Returns true if the mesh has no triangles and no outlines.
    pub fn is_empty(&self) -> bool {
        self.buffers.indices.is_empty() && self.outlines.is_empty()
    }

    /// Point the mesh coordinates are relative to.
    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Bounding rectangle of the mesh as `[x_min, y_min, x_max, y_max]` in mesh coordinates.
    pub fn local_bounds(&self) -> Option<[f32; 4]> {
        self.bounds.map(centered_bounds)
    }

    /// Vertices of the triangles.
    pub fn vertices(&self) -> &[MeshPoint] {
        &self.buffers.vertices
    }

    /// Vertex indices, three per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.buffers.indices
    }

    /// Iterates over the fill triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [MeshPoint; 3]> + '_ {
        let vertices = &self.buffers.vertices;
        self.buffers.indices.chunks_exact(3).map(move |triangle| {
            [
                vertices[triangle[0] as usize],
                vertices[triangle[1] as usize],
                vertices[triangle[2] as usize],
            ]
        })
    }

    /// Closed rings of all the polygons, exteriors and interiors alike.
    pub fn outlines(&self) -> &[Vec<MeshPoint>] {
        &self.outlines
    }
}

/// Bounding rectangle of all the polygons, or `None` if there are no points.
pub(crate) fn collection_bounds(polygons: &[Polygon<f64>]) -> Option<Rect<f64>> {
    polygons
        .iter()
        .filter_map(|polygon| polygon.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        })
}

/// `bounds` as `[x_min, y_min, x_max, y_max]` relative to its own center.
pub(crate) fn centered_bounds(bounds: Rect<f64>) -> [f32; 4] {
    let half_width = (bounds.width() / 2.0) as f32;
    let half_height = (bounds.height() / 2.0) as f32;
    [-half_width, -half_height, half_width, half_height]
}

/// Mapping from mesh coordinates to screen pixels.
///
/// Screen y axis points down, so the mesh is flipped vertically.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset: [f32; 2],
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: [0.0, 0.0],
        }
    }
}

impl ViewTransform {
    /// Creates a transform that fits `bounds` (`[x_min, y_min, x_max, y_max]`) into a screen of the
    /// given size, leaving `margin` pixels at each side and keeping the aspect ratio.
    pub fn fit(bounds: [f32; 4], size: [f32; 2], margin: f32) -> Self {
        let [x_min, y_min, x_max, y_max] = bounds;
        let available_width = (size[0] - 2.0 * margin).max(1.0);
        let available_height = (size[1] - 2.0 * margin).max(1.0);
        let width = x_max - x_min;
        let height = y_max - y_min;

        let scale = match (width > 0.0, height > 0.0) {
            (true, true) => (available_width / width).min(available_height / height),
            (true, false) => available_width / width,
            (false, true) => available_height / height,
            (false, false) => 1.0,
        };

        let center_x = (x_min + x_max) / 2.0;
        let center_y = (y_min + y_max) / 2.0;

        Self {
            scale,
            offset: [
                size[0] / 2.0 - center_x * scale,
                size[1] / 2.0 + center_y * scale,
            ],
        }
    }

    /// Pixels per mesh unit.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Converts a mesh point into screen coordinates.
    pub fn apply(&self, p: MeshPoint) -> MeshPoint {
        [
            p[0] * self.scale + self.offset[0],
            -p[1] * self.scale + self.offset[1],
        ]
    }

    /// Moves the view by `delta` pixels.
    pub fn pan(self, delta: [f32; 2]) -> Self {
        Self {
            offset: [self.offset[0] + delta[0], self.offset[1] + delta[1]],
            ..self
        }
    }

    /// Scales the view by `factor` keeping the screen point `anchor` in place.
    pub fn zoom(self, factor: f32, anchor: [f32; 2]) -> Self {
        Self {
            scale: self.scale * factor,
            offset: [
                anchor[0] - (anchor[0] - self.offset[0]) * factor,
                anchor[1] - (anchor[1] - self.offset[1]) * factor,
            ],
        }
    }
}
