mod builder;
mod meta;
mod parser;

use anyhow::{Context, Result};
use log::{info, warn};
use mv_format::mesh::MeshDocument;
use std::path::{Path, PathBuf};

use crate::{compiler, mesh::mtl, utils};

use self::meta::ObjMeta;

fn parse(path: &Path) -> Result<(MeshDocument, Vec<String>)> {
    Ok(parser::parse(path)?.finish())
}

// the document is rendered fully in memory so a failure can never leave a
// half-written file behind
fn render(document: &MeshDocument) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    document
        .write_xml(&mut buffer)
        .context("Could not render mesh document")?;
    Ok(buffer)
}

fn save(path: &Path, output_dir: &Path, data: &[u8]) -> Result<PathBuf> {
    let file_name = utils::file_name(path)?;
    let target = utils::combine_path(output_dir, &format!("{}.mesh", file_name), "xml")?;
    utils::write_file(&target, data)?;
    Ok(target)
}

/// Parse meta from file called `file.toml` or alternativley from folder scoped meta file named `obj.toml` or else use default meta
fn parse_meta(path: &Path) -> Result<ObjMeta> {
    let dir = path
        .parent()
        .with_context(|| format!("Path terminates in root or prefix: {}", path.display()))?;
    let meta_file = utils::file_name(path)?;
    let path = utils::combine_path(dir, meta_file, "toml")?;

    let meta: ObjMeta;
    if path.exists() && path.is_file() {
        // load meta
        meta = ObjMeta::parse(&path)?;
    } else {
        // check if folder scoped meta exists
        let path = utils::combine_path(dir, "obj", "toml")?;
        if path.exists() && path.is_file() {
            // load meta
            meta = ObjMeta::parse(&path)?;
        } else {
            // create default meta
            meta = ObjMeta::default();
        }
    }

    Ok(meta)
}

pub(crate) fn process(path: &Path, output_dir: &Path, cli_compiler: Option<&str>) -> Result<()> {
    info!("Processing Wavefront `.obj`-file: `{}`", path.display());
    let meta = parse_meta(path)?;

    let (document, material_libs) = parse(path)?;
    let target = save(path, output_dir, &render(&document)?)?;

    // a missing or malformed material library must not invalidate the mesh
    // document that referenced it
    if meta.translate_materials {
        let source_dir = path.parent().unwrap_or_else(|| Path::new(""));
        for lib in &material_libs {
            let mtl_path = source_dir.join(lib);
            if let Err(err) = mtl::translate(&mtl_path, output_dir) {
                warn!(
                    "Could not translate material library `{}`: {:#}",
                    mtl_path.display(),
                    err
                );
            }
        }
    }

    // same for the downstream compiler, its failure leaves the document
    // valid
    if let Some(tool) = meta.compiler.as_deref().or(cli_compiler) {
        if let Err(err) = compiler::compile(tool, &target) {
            warn!("Mesh compiler failed for `{}`: {}", target.display(), err);
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const BARREL_OBJ: &str = "\
# a quad and a triangle over two materials
mtllib barrel.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl metal
f 1/1/1 2/2/1 3/3/1 4/4/1
usemtl glass
f 1/1/1 3/3/1 4/4/1
";

    const BARREL_MTL: &str = "\
newmtl metal
Kd 0.8 0.6 0.4
newmtl glass
d 0.5
";

    #[test]
    fn test_process_emits_mesh_and_material_documents() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("barrel.obj");
        fs::write(&source, BARREL_OBJ).unwrap();
        fs::write(dir.path().join("barrel.mtl"), BARREL_MTL).unwrap();

        process(&source, dir.path(), None).unwrap();

        let mesh = fs::read_to_string(dir.path().join("barrel.mesh.xml")).unwrap();
        // 6 corners from the quad, 3 from the triangle
        assert!(mesh.contains("<sharedgeometry vertexcount=\"9\">"));
        assert_eq!(mesh.matches("<vertex>").count(), 18); // plus the texcoord pass
        assert!(mesh.contains("material=\"barrel/metal\""));
        assert!(mesh.contains("material=\"barrel/glass\""));
        assert!(mesh.contains("<faces count=\"2\">"));
        assert!(mesh.contains("<faces count=\"1\">"));
        // the second submesh indexes past the first one's corners
        assert!(mesh.contains("<face v1=\"6\" v2=\"7\" v3=\"8\"/>"));

        let script = fs::read_to_string(dir.path().join("barrel.material")).unwrap();
        assert!(script.contains("material barrel/metal"));
        assert!(script.contains("scene_blend alpha_blend"));
    }

    #[test]
    fn test_missing_material_library_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("barrel.obj");
        fs::write(&source, BARREL_OBJ).unwrap();

        process(&source, dir.path(), None).unwrap();

        assert!(dir.path().join("barrel.mesh.xml").exists());
        assert!(!dir.path().join("barrel.material").exists());
    }

    #[test]
    fn test_malformed_face_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad.obj");
        fs::write(&source, "v 0 0 0\nv 1 0 0\nf 1 2 5\n").unwrap();

        assert!(process(&source, dir.path(), None).is_err());
        assert!(!dir.path().join("bad.mesh.xml").exists());
    }

    #[test]
    fn test_meta_can_disable_material_translation() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("barrel.obj");
        fs::write(&source, BARREL_OBJ).unwrap();
        fs::write(dir.path().join("barrel.mtl"), BARREL_MTL).unwrap();
        fs::write(dir.path().join("barrel.toml"), "translate_materials = false\n").unwrap();

        process(&source, dir.path(), None).unwrap();

        assert!(dir.path().join("barrel.mesh.xml").exists());
        assert!(!dir.path().join("barrel.material").exists());
    }
}
