//! GeoJSON input (RFC 7946) for feature collections, single features and bare geometries.

use super::{GeoFeature, GeoProperties};
use anyhow::{Context, Result, anyhow, bail, ensure};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::Value;
use std::io::Read;

/// Parses a FeatureCollection, a Feature or a bare geometry into features.
pub fn parse_geojson(json: &str) -> Result<Vec<GeoFeature>> {
	let value: Value = serde_json::from_str(json).context("Failed to parse GeoJSON")?;
	features_from_json(&value)
}

pub fn read_geojson(reader: impl Read) -> Result<Vec<GeoFeature>> {
	let value: Value = serde_json::from_reader(reader).context("Failed to read GeoJSON")?;
	features_from_json(&value)
}

fn features_from_json(value: &Value) -> Result<Vec<GeoFeature>> {
	match object_type(value)? {
		"FeatureCollection" => value
			.get("features")
			.and_then(Value::as_array)
			.ok_or_else(|| anyhow!("FeatureCollection must have a 'features' array"))?
			.iter()
			.enumerate()
			.map(|(index, feature)| feature_from_json(feature).with_context(|| format!("in feature {index}")))
			.collect(),
		"Feature" => Ok(vec![feature_from_json(value)?]),
		_ => Ok(vec![GeoFeature::new(geometry_from_json(value)?)]),
	}
}

fn object_type(value: &Value) -> Result<&str> {
	value
		.get("type")
		.and_then(Value::as_str)
		.ok_or_else(|| anyhow!("GeoJSON object must have a 'type' string"))
}

pub fn feature_from_json(value: &Value) -> Result<GeoFeature> {
	ensure!(object_type(value)? == "Feature", "expected type 'Feature'");
	let geometry = geometry_from_json(
		value
			.get("geometry")
			.ok_or_else(|| anyhow!("Feature must have a 'geometry'"))?,
	)?;
	let mut feature = GeoFeature::new(geometry);
	if let Some(id) = value.get("id").and_then(Value::as_u64) {
		feature.set_id(id);
	}
	feature.properties = match value.get("properties") {
		Some(Value::Object(object)) => GeoProperties::from_json_object(object),
		Some(Value::Null) | None => GeoProperties::new(),
		Some(_) => bail!("Feature 'properties' must be an object or null"),
	};
	Ok(feature)
}

pub fn geometry_from_json(value: &Value) -> Result<Geometry<f64>> {
	let geometry_type = object_type(value)?;
	if geometry_type == "GeometryCollection" {
		let geometries = value
			.get("geometries")
			.and_then(Value::as_array)
			.ok_or_else(|| anyhow!("GeometryCollection must have a 'geometries' array"))?
			.iter()
			.map(geometry_from_json)
			.collect::<Result<Vec<_>>>()?;
		return Ok(Geometry::GeometryCollection(GeometryCollection::new_from(geometries)));
	}

	let coordinates = value
		.get("coordinates")
		.ok_or_else(|| anyhow!("{geometry_type} must have 'coordinates'"))?;

	Ok(match geometry_type {
		"Point" => Geometry::Point(Point::from(parse_position(coordinates)?)),
		"MultiPoint" => Geometry::MultiPoint(MultiPoint::new(
			parse_positions(coordinates)?.into_iter().map(Point::from).collect(),
		)),
		"LineString" => Geometry::LineString(parse_line(coordinates)?),
		"MultiLineString" => Geometry::MultiLineString(MultiLineString::new(
			as_array(coordinates)?
				.iter()
				.map(parse_line)
				.collect::<Result<Vec<_>>>()?,
		)),
		"Polygon" => Geometry::Polygon(parse_polygon(coordinates)?),
		"MultiPolygon" => Geometry::MultiPolygon(MultiPolygon::new(
			as_array(coordinates)?
				.iter()
				.map(parse_polygon)
				.collect::<Result<Vec<_>>>()?,
		)),
		other => bail!("unknown geometry type '{other}'"),
	})
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
	value.as_array().ok_or_else(|| anyhow!("coordinates must be arrays"))
}

fn parse_position(value: &Value) -> Result<Coord<f64>> {
	let array = as_array(value)?;
	ensure!(array.len() >= 2, "a position needs at least two numbers");
	let x = array[0].as_f64().ok_or_else(|| anyhow!("longitude must be a number"))?;
	let y = array[1].as_f64().ok_or_else(|| anyhow!("latitude must be a number"))?;
	Ok(Coord { x, y })
}

fn parse_positions(value: &Value) -> Result<Vec<Coord<f64>>> {
	as_array(value)?.iter().map(parse_position).collect()
}

fn parse_line(value: &Value) -> Result<LineString<f64>> {
	Ok(LineString::new(parse_positions(value)?))
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
	let mut rings = as_array(value)?.iter().map(parse_line).collect::<Result<Vec<_>>>()?;
	ensure!(!rings.is_empty(), "a polygon needs an exterior ring");
	let exterior = rings.remove(0);
	Ok(Polygon::new(exterior, rings))
}
