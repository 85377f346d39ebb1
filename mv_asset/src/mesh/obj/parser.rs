use std::fs;
use std::io::{self, BufRead};
use std::{num, path::Path};

use gfx_maths::{Vec2, Vec3};
use log::{debug, warn};

use super::builder::ObjMeshBuilder;

#[derive(thiserror::Error, Debug)]
pub enum ParserError {
    #[error("Failed to parse float: {0}")]
    ParseFloat(#[from] num::ParseFloatError),
    #[error("Failed to parse integer: {0}")]
    ParseInt(#[from] num::ParseIntError),
    #[error("Failed to read model: {0}")]
    Io(#[from] io::Error),
    #[error("Face corner is missing a position index")]
    MissingPosition,
    #[error("Face has {0} corners, only 3 or 4 are supported")]
    FaceArity(usize),
    #[error("Directive `{directive}` expects {expected} numbers, found {found}")]
    FieldCount {
        directive: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{kind} index {index} is out of range (table holds {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

/// One face-corner reference as read from the document: 1-based, with the
/// position mandatory and texcoord/normal optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CornerRef {
    pub(crate) position: usize,
    pub(crate) texcoord: Option<usize>,
    pub(crate) normal: Option<usize>,
}

/// One source line, tokenized. Everything the converter does not understand
/// (comments, smoothing groups, object names, ...) lands in `Ignored`; that
/// is a compatibility decision, not an error.
#[derive(Debug, PartialEq)]
pub(crate) enum Directive {
    Position(Vec3),
    Normal(Vec3),
    TexCoord(Vec2),
    Face(Vec<CornerRef>),
    Group(String),
    UseMaterial(String),
    MaterialLib(String),
    Ignored,
}

// parses wavefront obj (https://en.wikipedia.org/wiki/Wavefront_.obj_file)
// into the grouper state machine, one directive per line
pub(crate) fn parse(filepath: &Path) -> Result<ObjMeshBuilder, ParserError> {
    let prefix = filepath
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut builder = ObjMeshBuilder::new(prefix.to_owned());

    let lines = read_lines(filepath)?;
    log::info!("Loading mesh: {}", filepath.display());

    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!("Parsing: \"{}\"", line);

        let (token, value) = split_directive(line);
        builder.apply(parse_directive(token, value)?)?;
    }

    Ok(builder)
}

fn split_directive(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((token, value)) => (token, value.trim()),
        None => (line, ""),
    }
}

fn parse_directive(token: &str, value: &str) -> Result<Directive, ParserError> {
    let directive = match token {
        // vertex
        "v" => {
            let n = parse_numbers("v", value, 3)?;
            Directive::Position(Vec3::new(n[0], n[1], n[2]))
        }
        // vertex normals
        "vn" => {
            let n = parse_numbers("vn", value, 3)?;
            Directive::Normal(Vec3::new(n[0], n[1], n[2]))
        }
        // texture coordinates
        "vt" => {
            let n = parse_numbers("vt", value, 2)?;
            Directive::TexCoord(Vec2::new(n[0], n[1]))
        }
        "f" => Directive::Face(parse_face(value)?),
        // group (submesh)
        "g" => Directive::Group(value.to_owned()),
        // material switch
        "usemtl" => Directive::UseMaterial(value.to_owned()),
        // material library reference
        "mtllib" => parse_material_lib(value),
        // comments, smoothing groups, object names and the rest are skipped
        _ => Directive::Ignored,
    };

    Ok(directive)
}

fn parse_material_lib(value: &str) -> Directive {
    let mut files = value.split_whitespace();
    match files.next() {
        Some(first) => {
            if files.next().is_some() {
                warn!("Only the first file of a mtllib line is used. This may result in missing materials.");
            }
            Directive::MaterialLib(first.to_owned())
        }
        None => {
            warn!("No files found in mtllib line. Ignoring.");
            Directive::Ignored
        }
    }
}

// parses numbers seperated by spaces; extra fields are ignored
fn parse_numbers(
    directive: &'static str,
    value: &str,
    expected: usize,
) -> Result<Vec<f32>, ParserError> {
    let numbers: Vec<f32> = value
        .split_whitespace()
        .take(expected)
        .map(|x| x.parse())
        .collect::<Result<_, _>>()?;

    if numbers.len() < expected {
        return Err(ParserError::FieldCount {
            directive,
            expected,
            found: numbers.len(),
        });
    }

    Ok(numbers)
}

// parses corner references seperated by spaces, which are itself seperated
// by slashes
fn parse_face(value: &str) -> Result<Vec<CornerRef>, ParserError> {
    value
        .split_whitespace()
        .map(parse_corner)
        .collect::<Result<_, _>>()
}

// parses a single position/texcoord/normal reference
fn parse_corner(value: &str) -> Result<CornerRef, ParserError> {
    let mut fields = value.splitn(3, '/');

    let position = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(ParserError::MissingPosition)?
        .parse()?;
    let texcoord = match fields.next() {
        Some("") | None => None,
        Some(s) => Some(s.parse()?),
    };
    let normal = match fields.next() {
        Some("") | None => None,
        Some(s) => Some(s.parse()?),
    };

    Ok(CornerRef {
        position,
        texcoord,
        normal,
    })
}

// The output is wrapped in a Result to allow matching on errors
// Returns an Iterator to the Reader of the lines of the file.
fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<fs::File>>>
where
    P: AsRef<Path>,
{
    let file = fs::File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}
