use crate::error::{FormatError, Result};
use gfx_maths::{Vec2, Vec3};
use std::io::Write;

/// One (position, texcoord, normal) index triplet referenced by a single
/// corner of a single triangle. Indices are 0-based table indices; an absent
/// texcoord or normal is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// Flat, file-order vertex attribute tables of one source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryTable {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
}

/// A contiguous run of triangles sharing one material. `corners` is already
/// expanded into triangles, so its length is always a multiple of 3.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmeshData {
    pub name: String,
    pub material: String,
    pub corners: Vec<FaceCorner>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDocument {
    pub geometry: GeometryTable,
    pub submeshes: Vec<SubmeshData>,
}

impl MeshDocument {
    /// Total corner count over all non-empty submeshes. This is the declared
    /// shared-geometry vertex count: every face-corner occurrence gets its
    /// own vertex record, no deduplication.
    pub fn vertex_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.corners.len()).sum()
    }

    /// Writes the mesh-definition document. Vertex records are emitted in
    /// submesh order, so each submesh indexes a contiguous run of the shared
    /// vertex stream starting at the running total of all prior submeshes.
    pub fn write_xml<W: Write>(&self, writer: &mut W) -> Result<()> {
        for submesh in &self.submeshes {
            if submesh.corners.len() % 3 != 0 {
                return Err(FormatError::UnalignedSubmesh(submesh.name.clone()));
            }
        }

        let has_normals = !self.geometry.normals.is_empty();
        let has_texcoords = !self.geometry.texcoords.is_empty();

        writeln!(writer, "<?xml version=\"1.0\" ?>")?;
        writeln!(writer, "<mesh>")?;
        writeln!(
            writer,
            "<sharedgeometry vertexcount=\"{}\">",
            self.vertex_count()
        )?;

        writeln!(
            writer,
            "<vertexbuffer positions=\"true\" normals=\"{}\">",
            has_normals
        )?;
        for submesh in self.non_empty() {
            for corner in &submesh.corners {
                writeln!(writer, "<vertex>")?;
                let p = self.geometry.positions[corner.position];
                writeln!(
                    writer,
                    "<position x=\"{}\" y=\"{}\" z=\"{}\"/>",
                    p.x, p.y, p.z
                )?;
                if let Some(i) = corner.normal {
                    let n = self.geometry.normals[i];
                    writeln!(
                        writer,
                        "<normal x=\"{}\" y=\"{}\" z=\"{}\"/>",
                        n.x, n.y, n.z
                    )?;
                }
                writeln!(writer, "</vertex>")?;
            }
        }
        writeln!(writer, "</vertexbuffer>")?;

        if has_texcoords {
            writeln!(
                writer,
                "<vertexbuffer texture_coord_dimensions_0=\"2\" texture_coords=\"1\">"
            )?;
            for submesh in self.non_empty() {
                for corner in &submesh.corners {
                    writeln!(writer, "<vertex>")?;
                    let t = corner
                        .texcoord
                        .map(|i| self.geometry.texcoords[i])
                        .unwrap_or_default();
                    writeln!(writer, "<texcoord u=\"{}\" v=\"{}\"/>", t.x, t.y)?;
                    writeln!(writer, "</vertex>")?;
                }
            }
            writeln!(writer, "</vertexbuffer>")?;
        }

        writeln!(writer, "</sharedgeometry>")?;
        writeln!(writer, "<submeshes>")?;

        let mut initial_vertex_num = 0;
        for submesh in self.non_empty() {
            writeln!(
                writer,
                "<submesh material=\"{}\" usedsharedvertices=\"true\" use32bitindexes=\"true\" operationtype=\"triangle_list\">",
                submesh.material
            )?;
            writeln!(writer, "<faces count=\"{}\">", submesh.corners.len() / 3)?;
            for j in (0..submesh.corners.len()).step_by(3) {
                writeln!(
                    writer,
                    "<face v1=\"{}\" v2=\"{}\" v3=\"{}\"/>",
                    initial_vertex_num + j,
                    initial_vertex_num + j + 1,
                    initial_vertex_num + j + 2
                )?;
            }
            writeln!(writer, "</faces>")?;
            writeln!(writer, "</submesh>")?;
            initial_vertex_num += submesh.corners.len();
        }

        writeln!(writer, "</submeshes>")?;
        writeln!(writer, "</mesh>")?;

        Ok(())
    }

    fn non_empty(&self) -> impl Iterator<Item = &SubmeshData> {
        self.submeshes.iter().filter(|s| !s.corners.is_empty())
    }
}
