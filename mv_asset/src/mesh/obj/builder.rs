use log::debug;
use mv_format::mesh::{FaceCorner, GeometryTable, MeshDocument, SubmeshData};

use gfx_maths::Vec2;

use super::parser::{CornerRef, Directive, ParserError};

/// Single-pass grouper state. The active material and current submesh are
/// local to one conversion call, so nothing leaks across invocations.
#[derive(Debug, Default)]
pub(crate) struct ObjMeshBuilder {
    geometry: GeometryTable,
    submeshes: Vec<SubmeshData>,
    current: Option<usize>,
    current_material: String,
    material_prefix: String,
    material_libs: Vec<String>,
}

impl ObjMeshBuilder {
    pub(crate) fn new(material_prefix: String) -> Self {
        Self {
            material_prefix,
            ..Self::default()
        }
    }

    pub(crate) fn apply(&mut self, directive: Directive) -> Result<(), ParserError> {
        match directive {
            Directive::Position(position) => self.geometry.positions.push(position),
            Directive::Normal(normal) => self.geometry.normals.push(normal),
            // the receiving renderer places the texture origin at the
            // opposite vertical edge, so V is stored flipped
            Directive::TexCoord(uv) => self.geometry.texcoords.push(Vec2::new(uv.x, 1.0 - uv.y)),
            Directive::Face(corners) => self.push_face(&corners)?,
            Directive::Group(name) => self.start_submesh(Some(name)),
            Directive::UseMaterial(name) => self.use_material(&name),
            Directive::MaterialLib(path) => self.material_libs.push(path),
            Directive::Ignored => {}
        }

        Ok(())
    }

    pub(crate) fn finish(self) -> (MeshDocument, Vec<String>) {
        (
            MeshDocument {
                geometry: self.geometry,
                submeshes: self.submeshes,
            },
            self.material_libs,
        )
    }

    fn use_material(&mut self, name: &str) {
        let qualified = format!("{}/{}", self.material_prefix, name);
        if qualified == self.current_material {
            return;
        }
        self.current_material = qualified.clone();

        match self.current {
            // a submesh with no faces yet can simply take the new material,
            // a submesh can only ever carry one
            Some(index) if self.submeshes[index].corners.is_empty() => {
                self.submeshes[index].material = qualified;
            }
            _ => self.start_submesh(None),
        }
    }

    fn start_submesh(&mut self, name: Option<String>) {
        let name = name.unwrap_or_else(|| format!("default{}", self.submeshes.len()));
        debug!(
            "Starting submesh \"{}\" with material \"{}\"",
            name, self.current_material
        );

        self.submeshes.push(SubmeshData {
            name,
            material: self.current_material.clone(),
            corners: Vec::new(),
        });
        self.current = Some(self.submeshes.len() - 1);
    }

    fn push_face(&mut self, corners: &[CornerRef]) -> Result<(), ParserError> {
        let resolved: Vec<FaceCorner> = corners
            .iter()
            .map(|corner| self.resolve(corner))
            .collect::<Result<_, _>>()?;
        let triangles = triangulate(&resolved)?;

        let index = match self.current {
            Some(index) => index,
            None => {
                self.start_submesh(None);
                self.submeshes.len() - 1
            }
        };
        self.submeshes[index].corners.extend(triangles);

        Ok(())
    }

    // converts a 1-based document reference into a validated table index;
    // a face may only reference records that precede it
    fn resolve(&self, corner: &CornerRef) -> Result<FaceCorner, ParserError> {
        Ok(FaceCorner {
            position: table_index("position", corner.position, self.geometry.positions.len())?,
            texcoord: corner
                .texcoord
                .map(|i| table_index("texcoord", i, self.geometry.texcoords.len()))
                .transpose()?,
            normal: corner
                .normal
                .map(|i| table_index("normal", i, self.geometry.normals.len()))
                .transpose()?,
        })
    }
}

fn table_index(kind: &'static str, index: usize, len: usize) -> Result<usize, ParserError> {
    if index == 0 || index > len {
        return Err(ParserError::IndexOutOfRange { kind, index, len });
    }
    Ok(index - 1)
}

// fan-splits a quad into two triangles, assuming it is planar and convex
// (the source format assumes the same)
fn triangulate(corners: &[FaceCorner]) -> Result<Vec<FaceCorner>, ParserError> {
    match corners {
        [a, b, c] => Ok(vec![*a, *b, *c]),
        [a, b, c, d] => Ok(vec![*a, *b, *c, *a, *c, *d]),
        _ => Err(ParserError::FaceArity(corners.len())),
    }
}
