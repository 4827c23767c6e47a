//! STL (stereolithography) parsing for fetched mesh bytes.
//!
//! Both ASCII and binary formats are supported; the format is detected
//! automatically. Normals stored in the file are ignored — the renderer
//! recomputes smooth vertex normals after parsing.

use nalgebra::Point3;

use crate::error::LoadError;
use crate::geometry::Geometry;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Parse STL bytes into welded geometry.
///
/// Normals are not computed here; callers run
/// [`Geometry::compute_vertex_normals`] before rendering.
pub fn parse_stl(bytes: &[u8]) -> Result<Geometry, LoadError> {
    if bytes.len() < 6 {
        return Err(LoadError::Parse("data too small to be valid STL".into()));
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_SIZE)]);
    if head.trim_start().starts_with("solid") && !is_binary_stl_header(bytes) {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

/// Check if the header suggests binary STL despite starting with "solid".
///
/// Some binary files happen to carry "solid" in the 80-byte header; those
/// headers usually contain null bytes, which ASCII STL never does.
fn is_binary_stl_header(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_SIZE + 4 {
        return false;
    }
    bytes[..HEADER_SIZE].contains(&0)
}

fn parse_binary(bytes: &[u8]) -> Result<Geometry, LoadError> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(LoadError::Parse(format!(
            "binary STL header truncated: {} bytes",
            bytes.len()
        )));
    }

    let face_count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]) as usize;

    let body = &bytes[HEADER_SIZE + 4..];
    if body.len() < face_count * TRIANGLE_SIZE {
        return Err(LoadError::Parse(format!(
            "binary STL truncated: expected {face_count} triangles, got {} bytes",
            body.len()
        )));
    }

    let mut triangles = Vec::with_capacity(face_count);
    for i in 0..face_count {
        let record = &body[i * TRIANGLE_SIZE..(i + 1) * TRIANGLE_SIZE];
        // Skip the 12-byte file normal; it is recomputed later.
        triangles.push([
            read_vertex(&record[12..24]),
            read_vertex(&record[24..36]),
            read_vertex(&record[36..48]),
        ]);
    }

    finish(triangles)
}

/// Read a vertex from 12 bytes (3 little-endian f32s).
fn read_vertex(buf: &[u8]) -> Point3<f32> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Point3::new(x, y, z)
}

fn parse_ascii(bytes: &[u8]) -> Result<Geometry, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::Parse(format!("ASCII STL is not valid UTF-8: {e}")))?;

    let mut triangles: Vec<[Point3<f32>; 3]> = Vec::new();
    let mut in_facet = false;
    let mut in_loop = false;
    let mut corners: Vec<Point3<f32>> = Vec::with_capacity(3);

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&keyword) = parts.first() else {
            continue;
        };

        match keyword.to_lowercase().as_str() {
            "facet" => {
                in_facet = true;
                // File normal follows; ignored.
            }
            "outer" => {
                if parts.len() >= 2 && parts[1].eq_ignore_ascii_case("loop") {
                    in_loop = true;
                    corners.clear();
                }
            }
            "vertex" => {
                if in_loop && parts.len() >= 4 {
                    let x: f32 = parse_coord(parts[1])?;
                    let y: f32 = parse_coord(parts[2])?;
                    let z: f32 = parse_coord(parts[3])?;
                    corners.push(Point3::new(x, y, z));
                }
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if in_facet && corners.len() == 3 {
                    triangles.push([corners[0], corners[1], corners[2]]);
                }
                in_facet = false;
            }
            "endsolid" => break,
            _ => {} // Ignore unknown lines.
        }
    }

    finish(triangles)
}

fn parse_coord(s: &str) -> Result<f32, LoadError> {
    s.parse()
        .map_err(|e| LoadError::Parse(format!("bad coordinate '{s}': {e}")))
}

fn finish(triangles: Vec<[Point3<f32>; 3]>) -> Result<Geometry, LoadError> {
    if triangles.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Geometry::from_triangles(&triangles))
}
