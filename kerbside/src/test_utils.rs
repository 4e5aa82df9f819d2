use std::path::Path;

/// Builds one city object with `rings` square surfaces placed along the x axis from `(x, y)`.
pub(crate) fn city_object(
    name: &str,
    function: Option<i64>,
    rings: usize,
    x: f64,
    y: f64,
) -> String {
    let function = function
        .map(|f| format!("<tran:function>{f}</tran:function>"))
        .unwrap_or_default();
    let surfaces: String = (0..rings)
        .map(|i| {
            let x0 = x + i as f64 * 2.0;
            let x1 = x0 + 1.0;
            let y1 = y + 1.0;
            format!(
                r#"<gml:surfaceMember><gml:Polygon><gml:exterior><gml:LinearRing>
                    <gml:posList srsDimension="3">{x0} {y} 1 {x1} {y} 1 {x1} {y1} 1 {x0} {y1} 1 {x0} {y} 1</gml:posList>
                </gml:LinearRing></gml:exterior></gml:Polygon></gml:surfaceMember>"#
            )
        })
        .collect();

    format!(
        r#"<core:cityObjectMember><tran:Road gml:id="{name}">
            <gml:name>{name}</gml:name>
            <core:creationDate>2021-01-01</core:creationDate>
            {function}
            <tran:lod2MultiSurface><gml:MultiSurface>{surfaces}</gml:MultiSurface></tran:lod2MultiSurface>
        </tran:Road></core:cityObjectMember>"#
    )
}

pub(crate) fn city_model(objects: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <core:CityModel xmlns:core="http://www.opengis.net/citygml/2.0"
                        xmlns:gml="http://www.opengis.net/gml"
                        xmlns:tran="http://www.opengis.net/citygml/transportation/2.0">
            {}
        </core:CityModel>"#,
        objects.concat()
    )
}

pub(crate) fn write_city_model(dir: &Path, file_name: &str, objects: &[String]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(file_name), city_model(objects)).unwrap();
}
