use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use geo_types::Rect;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::GmlError;
use crate::table::{FeatureRow, FeatureTable, RingBuffer};

/// Elements whose children are city objects.
const MEMBER_ELEMENTS: [&str; 2] = ["cityObjectMember", "featureMember"];

/// GML geometry elements. Leaves inside them are never treated as attributes.
const GEOMETRY_ELEMENTS: [&str; 16] = [
    "boundedBy",
    "Envelope",
    "Point",
    "LineString",
    "MultiCurve",
    "Polygon",
    "Surface",
    "MultiSurface",
    "CompositeSurface",
    "Solid",
    "MultiSolid",
    "LinearRing",
    "exterior",
    "interior",
    "posList",
    "pos",
];

/// Reader of CityGML documents.
///
/// Each city object (a child of a `core:cityObjectMember` or `gml:featureMember` element) becomes
/// one [`FeatureRow`]. Every exterior `gml:LinearRing` found inside the object produces one
/// [`RingBuffer`] in the row's geometry, in the order the rings appear in the document.
///
/// ```no_run
/// use kerbside_gml::GmlReader;
///
/// let table = GmlReader::default().read("Road Kerb/kerbs.gml", None, &["gml_id"]).unwrap();
/// for name in table.names() {
///     println!("{name:?}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GmlReader {
    default_dimension: usize,
}

impl Default for GmlReader {
    fn default() -> Self {
        Self {
            default_dimension: 3,
        }
    }
}

impl GmlReader {
    /// Creates a reader that assumes 3D coordinates when a `posList` does not declare
    /// `srsDimension`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets dimension used for `posList` elements without `srsDimension` attribute.
    pub fn with_default_dimension(mut self, dimension: usize) -> Self {
        self.default_dimension = dimension;
        self
    }

    /// Reads the file at `path`.
    ///
    /// If `bbox` is given, only the objects whose envelope intersects it are returned. Simple
    /// properties with names listed in `ignore_fields` are not stored in the rows' attributes.
    /// The file is closed before this method returns.
    pub fn read(
        &self,
        path: impl AsRef<Path>,
        bbox: Option<Rect<f64>>,
        ignore_fields: &[&str],
    ) -> Result<FeatureTable, GmlError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = self.parse(
            Reader::from_reader(BufReader::new(file)),
            bbox,
            ignore_fields,
        )?;

        log::debug!("Read {} features from {}", table.len(), path.display());
        Ok(table)
    }

    /// Same as [`GmlReader::read`] but parses the document from a string.
    pub fn parse_str(
        &self,
        xml: &str,
        bbox: Option<Rect<f64>>,
        ignore_fields: &[&str],
    ) -> Result<FeatureTable, GmlError> {
        self.parse(Reader::from_str(xml), bbox, ignore_fields)
    }

    fn parse<R: BufRead>(
        &self,
        mut reader: Reader<R>,
        bbox: Option<Rect<f64>>,
        ignore_fields: &[&str],
    ) -> Result<FeatureTable, GmlError> {
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut table = FeatureTable::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut feature: Option<FeatureState> = None;
        let mut skipped = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) => {
                    let frame = Frame::new(&element)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.has_children = true;
                    }

                    if let Some(state) = &mut feature {
                        state.start(&frame, &stack);
                    } else if stack
                        .last()
                        .is_some_and(|parent| MEMBER_ELEMENTS.contains(&parent.name()))
                    {
                        feature = Some(FeatureState::new(stack.len(), frame.gml_id.clone()));
                    }

                    stack.push(frame);
                }
                Event::Text(text) => {
                    if let Some(state) = &mut feature {
                        state.text.push_str(&text.unescape()?);
                    }
                }
                Event::End(_) => {
                    let frame = stack.pop();
                    match feature.take() {
                        Some(state) if stack.len() == state.depth => {
                            if bbox.is_none_or(|bbox| state.row.intersects(&bbox)) {
                                table.push(state.row);
                            } else {
                                skipped += 1;
                            }
                        }
                        Some(mut state) => {
                            if let Some(frame) = frame {
                                state.end(
                                    frame,
                                    &stack,
                                    ignore_fields,
                                    self.default_dimension,
                                )?;
                            }
                            feature = Some(state);
                        }
                        None => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        if let Some(frame) = stack.last() {
            return Err(GmlError::UnexpectedEof(frame.name.clone()));
        }

        if skipped > 0 {
            log::debug!("{skipped} features are outside of the bounding box");
        }

        Ok(table)
    }
}

#[derive(Debug)]
struct Frame {
    name: String,
    gml_id: Option<String>,
    dimension: Option<usize>,
    has_children: bool,
}

impl Frame {
    fn new(element: &BytesStart) -> Result<Self, GmlError> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let mut gml_id = None;
        let mut dimension = None;

        for attribute in element.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            match attribute.key.local_name().as_ref() {
                b"id" => gml_id = Some(attribute.unescape_value()?.into_owned()),
                b"srsDimension" => {
                    let value = attribute.unescape_value()?;
                    dimension = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| GmlError::Coordinate(value.to_string()))?,
                    );
                }
                _ => {}
            }
        }

        Ok(Self {
            name,
            gml_id,
            dimension,
            has_children: false,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct FeatureState {
    /// Index of the city object element in the element stack.
    depth: usize,
    row: FeatureRow,
    text: String,
    ring: Option<Vec<f64>>,
}

impl FeatureState {
    fn new(depth: usize, gml_id: Option<String>) -> Self {
        Self {
            depth,
            row: FeatureRow {
                gml_id,
                ..Default::default()
            },
            text: String::new(),
            ring: None,
        }
    }

    /// Elements between the city object and the current element.
    fn inner<'a>(&self, stack: &'a [Frame]) -> &'a [Frame] {
        stack.get(self.depth + 1..).unwrap_or_default()
    }

    fn start(&mut self, frame: &Frame, stack: &[Frame]) {
        self.text.clear();

        if frame.name == "LinearRing" && is_exterior_ring(self.inner(stack)) {
            self.ring = Some(Vec::new());
        }
    }

    fn end(
        &mut self,
        frame: Frame,
        stack: &[Frame],
        ignore_fields: &[&str],
        default_dimension: usize,
    ) -> Result<(), GmlError> {
        let text = std::mem::take(&mut self.text);

        match frame.name() {
            "posList" | "pos" if self.ring.is_some() => {
                let values = parse_coordinates(&text)?;
                let dimension = frame
                    .dimension
                    .or_else(|| stack.iter().rev().find_map(|f| f.dimension))
                    .unwrap_or(if frame.name == "pos" {
                        values.len()
                    } else {
                        default_dimension
                    });
                if let Some(ring) = &mut self.ring {
                    push_coordinates(ring, &values, dimension)?;
                }
            }
            "LinearRing" if self.ring.is_some() => {
                if let Some(ring) = self.ring.take() {
                    self.row.geometry.push(RingBuffer::new(ring));
                }
            }
            _ if !frame.has_children && !text.is_empty() => {
                let inner = self.inner(stack);
                if is_geometry(&frame) || inner.iter().any(is_geometry) {
                    return Ok(());
                }

                let key = inner
                    .iter()
                    .map(Frame::name)
                    .chain(std::iter::once(frame.name()))
                    .collect::<Vec<_>>()
                    .join("|");
                self.set_attribute(key, text, ignore_fields);
            }
            _ => {}
        }

        Ok(())
    }

    fn set_attribute(&mut self, key: String, value: String, ignore_fields: &[&str]) {
        match key.as_str() {
            "name" => {
                self.row.name.get_or_insert(value);
            }
            "function" => {
                self.row.function.get_or_insert(value);
            }
            _ if ignore_fields.contains(&key.as_str()) => {}
            _ => {
                self.row.attributes.entry(key).or_insert(value);
            }
        }
    }
}

/// Returns true if the nearest boundary element above a ring is an exterior one.
///
/// A solid's shell is also an `exterior`, so rings further down may still be polygon holes.
fn is_exterior_ring(ancestors: &[Frame]) -> bool {
    ancestors
        .iter()
        .rev()
        .find_map(|frame| match frame.name() {
            "exterior" | "outerBoundaryIs" => Some(true),
            "interior" | "innerBoundaryIs" => Some(false),
            _ => None,
        })
        .unwrap_or(false)
}

fn is_geometry(frame: &Frame) -> bool {
    frame.name.starts_with("lod") || GEOMETRY_ELEMENTS.contains(&frame.name())
}

fn parse_coordinates(text: &str) -> Result<Vec<f64>, GmlError> {
    text.split_whitespace()
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|_| GmlError::Coordinate(value.to_string()))
        })
        .collect()
}

/// Appends coordinates to the ring, widening 2D points with `z = 0`.
fn push_coordinates(
    ring: &mut Vec<f64>,
    values: &[f64],
    dimension: usize,
) -> Result<(), GmlError> {
    let error = || GmlError::Dimension {
        count: values.len(),
        dimension,
    };

    if dimension == 0 || values.len() % dimension != 0 {
        return Err(error());
    }

    match dimension {
        3 => ring.extend_from_slice(values),
        2 => {
            for point in values.chunks_exact(2) {
                ring.extend_from_slice(&[point[0], point[1], 0.0]);
            }
        }
        _ => {
            log::warn!("Unsupported coordinate dimension: {dimension}");
            return Err(error());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;

    const KERBS: &str = include_str!("../test-data/kerbs.gml");

    fn member(body: &str) -> String {
        format!(
            r#"<core:CityModel xmlns:core="http://www.opengis.net/citygml/2.0" xmlns:gml="http://www.opengis.net/gml">
                <core:cityObjectMember>{body}</core:cityObjectMember>
            </core:CityModel>"#
        )
    }

    #[test]
    fn reads_rows_in_document_order() {
        let table = GmlReader::new().parse_str(KERBS, None, &[]).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec![Some("Kerb A"), Some("Kerb B"), Some("Kerb C")]
        );
        assert_eq!(
            table.functions().collect::<Vec<_>>(),
            vec![Some("1"), Some("2"), Some("1")]
        );
        assert_eq!(table.get(0).unwrap().gml_id.as_deref(), Some("kerb_a"));
    }

    #[test]
    fn reads_every_exterior_ring() {
        let table = GmlReader::new().parse_str(KERBS, None, &[]).unwrap();
        let kerb_a = table.get(0).unwrap();

        assert_eq!(kerb_a.geometry.len(), 2);
        assert_eq!(kerb_a.geometry[0].len(), 15);
        assert_abs_diff_eq!(kerb_a.geometry[0].values()[3], 2.0);
        assert_abs_diff_eq!(kerb_a.geometry[0].values()[5], 10.5);
    }

    #[test]
    fn interior_rings_are_not_part_of_geometry() {
        let table = GmlReader::new().parse_str(KERBS, None, &[]).unwrap();
        let kerb_c = table.get(2).unwrap();

        assert_eq!(kerb_c.geometry.len(), 1);
        assert_eq!(kerb_c.geometry[0].len(), 15);
    }

    #[test]
    fn widens_two_dimensional_rings() {
        let xml = member(
            r#"<Road><function>3</function><lod1MultiSurface><gml:MultiSurface srsDimension="2">
                <gml:surfaceMember><gml:Polygon><gml:exterior><gml:LinearRing>
                    <gml:posList>0 0 1 0 1 1 0 0</gml:posList>
                </gml:LinearRing></gml:exterior></gml:Polygon></gml:surfaceMember>
            </gml:MultiSurface></lod1MultiSurface></Road>"#,
        );

        let table = GmlReader::new().parse_str(&xml, None, &[]).unwrap();
        let ring = &table.get(0).unwrap().geometry[0];
        assert_eq!(
            ring.values(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn reads_pos_elements() {
        let xml = member(
            r#"<Road><gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:pos>0 0 1</gml:pos><gml:pos>1 0 1</gml:pos><gml:pos>0 0 1</gml:pos>
            </gml:LinearRing></gml:exterior></gml:Polygon></Road>"#,
        );

        let table = GmlReader::new().parse_str(&xml, None, &[]).unwrap();
        assert_eq!(table.get(0).unwrap().geometry[0].len(), 9);
    }

    #[test]
    fn ignored_fields_are_dropped() {
        let table = GmlReader::new()
            .parse_str(
                KERBS,
                None,
                &["creationDate", "externalReference|externalObject|name"],
            )
            .unwrap();
        let attributes = &table.get(0).unwrap().attributes;

        assert!(!attributes.contains_key("creationDate"));
        assert!(!attributes.contains_key("externalReference|externalObject|name"));
        assert_eq!(
            attributes
                .get("externalReference|informationSystem")
                .map(String::as_str),
            Some("https://example.org/kerbs")
        );

        let table = GmlReader::new().parse_str(KERBS, None, &[]).unwrap();
        let attributes = &table.get(0).unwrap().attributes;
        assert_eq!(
            attributes.get("creationDate").map(String::as_str),
            Some("2021-03-04")
        );
    }

    #[test]
    fn name_and_function_cannot_be_ignored() {
        let table = GmlReader::new()
            .parse_str(KERBS, None, &["name", "function"])
            .unwrap();

        assert_eq!(table.get(1).unwrap().name.as_deref(), Some("Kerb B"));
        assert_eq!(table.get(1).unwrap().function.as_deref(), Some("2"));
    }

    #[test]
    fn bbox_drops_features_outside() {
        let bbox = Rect::new((-1.0, -1.0), (5.0, 5.0));
        let table = GmlReader::new().parse_str(KERBS, Some(bbox), &[]).unwrap();

        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec![Some("Kerb A"), Some("Kerb B")]
        );
    }

    #[test]
    fn reads_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/test-data/kerbs.gml");
        let table = GmlReader::new().read(path, None, &[]).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn missing_file() {
        let result = GmlReader::new().read("/definitely/not/here.gml", None, &[]);
        assert_matches!(result, Err(GmlError::Io(_)));
    }

    #[test]
    fn mismatched_tags() {
        let result = GmlReader::new().parse_str("<CityModel><a></b></CityModel>", None, &[]);
        assert_matches!(result, Err(GmlError::Xml(_)));
    }

    #[test]
    fn truncated_document() {
        let result =
            GmlReader::new().parse_str("<CityModel><cityObjectMember><Road>", None, &[]);
        assert_matches!(result, Err(GmlError::UnexpectedEof(name)) if name == "Road");
    }

    #[test]
    fn invalid_coordinates() {
        let xml = member(
            r#"<Road><gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:posList>0 0 one</gml:posList>
            </gml:LinearRing></gml:exterior></gml:Polygon></Road>"#,
        );

        let result = GmlReader::new().parse_str(&xml, None, &[]);
        assert_matches!(result, Err(GmlError::Coordinate(value)) if value == "one");
    }

    #[test]
    fn coordinates_not_matching_dimension() {
        let xml = member(
            r#"<Road><gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:posList srsDimension="3">0 0 0 1</gml:posList>
            </gml:LinearRing></gml:exterior></gml:Polygon></Road>"#,
        );

        let result = GmlReader::new().parse_str(&xml, None, &[]);
        assert_matches!(
            result,
            Err(GmlError::Dimension {
                count: 4,
                dimension: 3
            })
        );
    }

    #[test]
    fn holes_inside_solid_shell_are_skipped() {
        let xml = member(
            r#"<Building><lod2Solid><gml:Solid><gml:exterior><gml:CompositeSurface>
                <gml:surfaceMember><gml:Polygon>
                    <gml:exterior><gml:LinearRing>
                        <gml:posList srsDimension="3">0 0 0 10 0 0 10 10 0 0 10 0 0 0 0</gml:posList>
                    </gml:LinearRing></gml:exterior>
                    <gml:interior><gml:LinearRing>
                        <gml:posList srsDimension="3">4 4 0 6 4 0 6 6 0 4 4 0</gml:posList>
                    </gml:LinearRing></gml:interior>
                </gml:Polygon></gml:surfaceMember>
            </gml:CompositeSurface></gml:exterior></gml:Solid></lod2Solid></Building>"#,
        );

        let table = GmlReader::new().parse_str(&xml, None, &[]).unwrap();
        let rings = &table.get(0).unwrap().geometry;
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 15);
        assert_abs_diff_eq!(rings[0].values()[3], 10.0);
    }

    #[test]
    fn pos_list_without_dimension_uses_default() {
        let xml = member(
            r#"<Road><gml:Polygon><gml:exterior><gml:LinearRing>
                <gml:posList>0 0 1 0 1 1</gml:posList>
            </gml:LinearRing></gml:exterior></gml:Polygon></Road>"#,
        );

        let table = GmlReader::new().parse_str(&xml, None, &[]).unwrap();
        assert_eq!(
            table.get(0).unwrap().geometry[0].values(),
            &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]
        );

        let table = GmlReader::new()
            .with_default_dimension(2)
            .parse_str(&xml, None, &[])
            .unwrap();
        assert_eq!(
            table.get(0).unwrap().geometry[0].values(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]
        );
    }
}
