use std::fs;
use std::io::{self, BufRead};
use std::num;
use std::path::Path;

use anyhow::{Context, Result};
use gfx_maths::Vec3;
use log::{info, warn};
use mv_format::material::MaterialDefinition;

use crate::utils;

#[derive(thiserror::Error, Debug)]
pub enum MtlError {
    #[error("Failed to parse float: {0}")]
    ParseFloat(#[from] num::ParseFloatError),
    #[error("Failed to read material library: {0}")]
    Io(#[from] io::Error),
    #[error("Color `{directive}` expects 3 numbers, found {found}")]
    FieldCount {
        directive: &'static str,
        found: usize,
    },
}

/// Translates one Wavefront material library into a material-script
/// document named `<stem>.material` in `output_dir`. Failures here never
/// abort the mesh conversion that referenced the library; the caller logs
/// and moves on.
pub(crate) fn translate(path: &Path, output_dir: &Path) -> Result<()> {
    info!("Translating material library: `{}`", path.display());

    let prefix = utils::file_name(path)?.to_owned();
    let materials = parse(path, &prefix)?;

    let mut buffer = Vec::new();
    for material in &materials {
        material
            .write_script(&mut buffer)
            .context("Could not render material script")?;
    }

    let target = utils::combine_path(output_dir, &prefix, "material")?;
    utils::write_file(&target, &buffer)?;
    Ok(())
}

fn parse(path: &Path, prefix: &str) -> Result<Vec<MaterialDefinition>, MtlError> {
    let file = fs::File::open(path)?;

    let mut materials = Vec::new();
    let mut current: Option<MaterialDefinition> = None;

    for line in io::BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (token, value) = match line.split_once(char::is_whitespace) {
            Some((token, value)) => (token, value.trim()),
            None => (line, ""),
        };

        if token == "newmtl" {
            if let Some(material) = current.take() {
                materials.push(material);
            }
            current = Some(MaterialDefinition {
                name: format!("{}/{}", prefix, value),
                ..MaterialDefinition::default()
            });
        } else if let Some(material) = current.as_mut() {
            apply_field(material, token, value)?;
        } else if token != "#" {
            warn!("Field `{}` outside of a newmtl block. Ignoring.", token);
        }
    }

    if let Some(material) = current.take() {
        materials.push(material);
    }

    Ok(materials)
}

fn apply_field(
    material: &mut MaterialDefinition,
    token: &str,
    value: &str,
) -> Result<(), MtlError> {
    match token {
        "Ka" => material.ambient = Some(parse_color("Ka", value)?),
        "Kd" => material.diffuse = Some(parse_color("Kd", value)?),
        "Ks" => material.specular = Some(parse_color("Ks", value)?),
        "d" => material.dissolve = value.parse()?,
        "map_Ka" => material.texture = Some(value.to_owned()),
        // Ns, illum, map_Kd and friends have no counterpart in the target
        // script
        _ => {}
    }

    Ok(())
}

fn parse_color(directive: &'static str, value: &str) -> Result<Vec3, MtlError> {
    let numbers: Vec<f32> = value
        .split_whitespace()
        .take(3)
        .map(|x| x.parse())
        .collect::<Result<_, _>>()?;

    if numbers.len() < 3 {
        return Err(MtlError::FieldCount {
            directive,
            found: numbers.len(),
        });
    }

    Ok(Vec3::new(numbers[0], numbers[1], numbers[2]))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn parse_str(content: &str) -> Vec<MaterialDefinition> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barrel.mtl");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        parse(&path, "barrel").unwrap()
    }

    #[test]
    fn test_parse_blocks() {
        let materials = parse_str(
            "# exported material library\n\
             newmtl metal\n\
             Ka 0.2 0.2 0.2\n\
             Kd 0.8 0.6 0.4\n\
             Ks 1.0 1.0 1.0\n\
             Ns 96.0\n\
             map_Ka metal.png\n\
             \n\
             newmtl glass\n\
             d 0.5\n",
        );

        assert_eq!(
            materials,
            vec![
                MaterialDefinition {
                    name: "barrel/metal".into(),
                    ambient: Some(Vec3::new(0.2, 0.2, 0.2)),
                    diffuse: Some(Vec3::new(0.8, 0.6, 0.4)),
                    specular: Some(Vec3::new(1.0, 1.0, 1.0)),
                    texture: Some("metal.png".into()),
                    dissolve: 1.0,
                },
                MaterialDefinition {
                    name: "barrel/glass".into(),
                    dissolve: 0.5,
                    ..MaterialDefinition::default()
                },
            ]
        );
    }

    #[test]
    fn test_fields_before_first_block_are_skipped() {
        let materials = parse_str("Kd 1 0 0\nnewmtl solo\nKd 0 1 0\n");
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].diffuse, Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_malformed_color_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.mtl");
        fs::write(&path, "newmtl m\nKd 1 0\n").unwrap();
        assert!(matches!(
            parse(&path, "bad"),
            Err(MtlError::FieldCount {
                directive: "Kd",
                found: 2
            })
        ));
    }

    #[test]
    fn test_translate_writes_material_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barrel.mtl");
        fs::write(&path, "newmtl metal\nKd 0.8 0.6 0.4\n").unwrap();

        translate(&path, dir.path()).unwrap();

        let script = fs::read_to_string(dir.path().join("barrel.material")).unwrap();
        assert!(script.starts_with("material barrel/metal\n"));
        assert!(script.contains("\t\t\tdiffuse 0.8 0.6 0.4 1\n"));
    }

    #[test]
    fn test_translate_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(translate(&dir.path().join("gone.mtl"), dir.path()).is_err());
    }
}
