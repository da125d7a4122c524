//! Wavefront OBJ loading and export.
//!
//! Only geometry is carried: positions and faces on load, positions, normals
//! and faces on export. Polygons are fan-triangulated and duplicate
//! positions are welded so the surface graph sees a connected mesh.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use glam::Vec3;
use obj::{ObjData, SimplePolygon};

use crate::mesh::MeshStore;
use crate::types::MeshError;

/// Load a mesh from an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshStore, MeshError> {
    let path = path.as_ref();
    let mesh = load_obj_from_reader(BufReader::new(File::open(path)?))?;
    tracing::info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Parse a mesh from OBJ text.
pub fn load_obj_from_reader(reader: impl Read) -> Result<MeshStore, MeshError> {
    let data = ObjData::load_buf(reader)?;

    let positions: Vec<Vec3> = data.position.iter().map(|p| Vec3::from_array(*p)).collect();
    let mut faces: Vec<[u32; 3]> = Vec::new();
    let mut skipped = 0usize;

    for object in &data.objects {
        for group in &object.groups {
            for SimplePolygon(corners) in &group.polys {
                if corners.len() < 3 {
                    skipped += 1;
                    continue;
                }
                let first = corners[0].0 as u32;
                for pair in corners[1..].windows(2) {
                    faces.push([first, pair[0].0 as u32, pair[1].0 as u32]);
                }
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("skipped {} OBJ elements with fewer than 3 corners", skipped);
    }

    MeshStore::welded(positions, faces)
}

/// Write a mesh to an OBJ file.
pub fn export_obj(mesh: &MeshStore, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    tracing::info!("exported {} vertices to {}", mesh.vertex_count(), path.display());
    Ok(())
}

/// Serialize a mesh as OBJ text.
///
/// Faces reference positions and normals by the same index (`f p//n`); no
/// texture coordinates are written.
pub fn write_obj(mesh: &MeshStore, writer: &mut impl Write) -> Result<(), MeshError> {
    writeln!(writer, "o mesh")?;
    for p in mesh.positions() {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for n in mesh.normals() {
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for tri in mesh.faces() {
        let [a, b, c] = tri.map(|i| i + 1);
        writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }
    Ok(())
}
