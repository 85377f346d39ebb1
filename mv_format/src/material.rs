use crate::error::Result;
use gfx_maths::Vec3;
use std::io::Write;

/// One material-script record, translated from a `newmtl` block. Color
/// fields that were absent in the source stay `None` and are left out of
/// the script entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    /// Fully qualified name, `<library stem>/<block name>`.
    pub name: String,
    pub ambient: Option<Vec3>,
    pub diffuse: Option<Vec3>,
    pub specular: Option<Vec3>,
    pub texture: Option<String>,
    /// Wavefront dissolve, 1.0 = fully opaque.
    pub dissolve: f32,
}

impl Default for MaterialDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: None,
            diffuse: None,
            specular: None,
            texture: None,
            dissolve: 1.0,
        }
    }
}

impl MaterialDefinition {
    /// Writes one `material { technique { pass { .. } } }` block. Opacity is
    /// expressed as a blend-mode side effect: a dissolve below 1.0 turns
    /// into `scene_blend alpha_blend` plus a manual-alpha texture unit.
    pub fn write_script<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "material {}", self.name)?;
        writeln!(writer, "{{")?;
        writeln!(writer, "\ttechnique")?;
        writeln!(writer, "\t{{")?;
        writeln!(writer, "\t\tpass")?;
        writeln!(writer, "\t\t{{")?;
        if let Some(c) = self.ambient {
            writeln!(writer, "\t\t\tambient {} {} {} 1", c.x, c.y, c.z)?;
        }
        if let Some(c) = self.diffuse {
            writeln!(writer, "\t\t\tdiffuse {} {} {} 1", c.x, c.y, c.z)?;
        }
        if let Some(c) = self.specular {
            writeln!(writer, "\t\t\tspecular {} {} {} 2", c.x, c.y, c.z)?;
        }
        if let Some(texture) = &self.texture {
            writeln!(writer, "\t\t\ttexture_unit")?;
            writeln!(writer, "\t\t\t{{")?;
            writeln!(writer, "\t\t\t\ttexture \"{}\"", texture)?;
            writeln!(writer, "\t\t\t}}")?;
        }
        if self.dissolve < 1.0 {
            writeln!(writer, "\t\t\tscene_blend alpha_blend")?;
            writeln!(writer, "\t\t\tdepth_write off")?;
            writeln!(writer, "\t\t\ttexture_unit")?;
            writeln!(writer, "\t\t\t{{")?;
            writeln!(
                writer,
                "\t\t\t\talpha_op_ex source1 src_manual src_current {}",
                self.dissolve
            )?;
            writeln!(writer, "\t\t\t}}")?;
        }
        writeln!(writer, "\t\t}}")?;
        writeln!(writer, "\t}}")?;
        writeln!(writer, "}}")?;
        writeln!(writer)?;

        Ok(())
    }
}
