//! Line-oriented scene format
//!
//! ```text
//! Info
//! albedo.png/normal.png/skybox.png
//!
//! Materials
//! // color       diffuse  glass  reflect  atlas rect            emissive
//! 0.8,0.8,0.8 / 1.0 / 0.0 / 0.0 / 0.0,0.0,0.25,0.25 / false
//!
//! Boxes
//! -1,-1,-1 / 2,1,2 / 0 / jump_pad
//!
//! Spheres
//! 0,2,0 / 0.5 / 0 /
//! ```
//!
//! Section headers are matched by line prefix, so `Materials // default set`
//! still opens the materials section. Blank lines and `//` comments are
//! skipped inside any section. Fields are `/`-separated; vector fields are
//! `,`-separated. A data line belongs to whichever section header most
//! recently appeared above it, so list order in the file is the index order
//! in the scene.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use thiserror::Error;

use crate::scene::{Block, Material, Scene, Sphere, TextureRefs, Trigger};
use crate::TEXTURES_DIR;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("could not open scene file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line} ({section}): expected {expected} fields, got {got}")]
    Fields {
        line: usize,
        section: Section,
        expected: usize,
        got: usize,
    },

    #[error("line {line} ({section}): invalid number {text:?}")]
    Number {
        line: usize,
        section: Section,
        text: String,
    },

    #[error("{kind} {index} references material {material}, but the scene has {count}")]
    MaterialIndex {
        kind: &'static str,
        index: usize,
        material: usize,
        count: usize,
    },

    #[error("scene file has no Info line")]
    MissingInfo,
}

/// The section a data line is interpreted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Info,
    Materials,
    Boxes,
    Spheres,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::Info => "Info",
            Section::Materials => "Materials",
            Section::Boxes => "Boxes",
            Section::Spheres => "Spheres",
        };
        f.write_str(name)
    }
}

type Result<T> = std::result::Result<T, ParseError>;

impl Scene {
    /// Load and parse a scene file.
    ///
    /// Texture file names from the `Info` line are resolved against
    /// [`TEXTURES_DIR`](crate::TEXTURES_DIR).
    pub fn parse(path: impl AsRef<Path>) -> std::result::Result<Scene, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Scene::from_scene_text(&text)?)
    }

    /// Parse a scene from its textual form.
    pub fn from_scene_text(text: &str) -> Result<Scene> {
        Parser::default().parse(text)
    }

    /// Serialize back into the text grammar.
    ///
    /// Re-parsing the output yields identical material/block/sphere lists.
    pub fn to_scene_text(&self) -> String {
        let mut out = String::new();

        out.push_str("Info\n");
        let _ = writeln!(
            out,
            "{}/{}/{}",
            file_name(&self.textures.albedo),
            file_name(&self.textures.normal),
            file_name(&self.textures.skybox)
        );

        out.push_str("\nMaterials\n");
        for m in &self.materials {
            let _ = writeln!(
                out,
                "{},{},{} / {} / {} / {} / {},{},{},{} / {}",
                m.color.x,
                m.color.y,
                m.color.z,
                m.diffuse,
                m.glass,
                m.glass_reflectivity,
                m.uv_rect.x,
                m.uv_rect.y,
                m.uv_rect.z,
                m.uv_rect.w,
                m.emissive
            );
        }

        out.push_str("\nBoxes\n");
        for b in &self.blocks {
            let _ = writeln!(
                out,
                "{},{},{} / {},{},{} / {} / {}",
                b.position.x,
                b.position.y,
                b.position.z,
                b.size.x,
                b.size.y,
                b.size.z,
                b.material,
                b.trigger.tag()
            );
        }

        out.push_str("\nSpheres\n");
        for s in &self.spheres {
            let _ = writeln!(
                out,
                "{},{},{} / {} / {} / {}",
                s.position.x,
                s.position.y,
                s.position.z,
                s.radius,
                s.material,
                s.trigger.tag()
            );
        }

        out
    }
}

fn file_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

#[derive(Default)]
struct Parser {
    materials: Vec<Material>,
    blocks: Vec<Block>,
    spheres: Vec<Sphere>,
    textures: Option<TextureRefs>,
}

impl Parser {
    fn parse(mut self, text: &str) -> Result<Scene> {
        let mut section = Section::Info;

        for (index, line) in text.lines().enumerate() {
            let number = index + 1;

            // Headers win over comment/blank skipping, so a trailing comment
            // on a header line ("Materials // default set") is accepted.
            if line.starts_with("Info") {
                section = Section::Info;
            } else if line.starts_with("Materials") {
                section = Section::Materials;
            } else if line.starts_with("Boxes") {
                section = Section::Boxes;
            } else if line.starts_with("Spheres") {
                section = Section::Spheres;
            } else {
                if line.trim().is_empty() || line.trim_start().starts_with("//") {
                    continue;
                }

                match section {
                    Section::Info => self.info_line(line, number)?,
                    Section::Materials => self.material_line(line, number)?,
                    Section::Boxes => self.block_line(line, number)?,
                    Section::Spheres => self.sphere_line(line, number)?,
                }
            }
        }

        let textures = self.textures.ok_or(ParseError::MissingInfo)?;

        let scene = Scene {
            materials: self.materials,
            blocks: self.blocks,
            spheres: self.spheres,
            textures,
        };
        check_material_indices(&scene)?;

        Ok(scene)
    }

    fn info_line(&mut self, line: &str, number: usize) -> Result<()> {
        let [albedo, normal, skybox] = split_fields::<3>(line, number, Section::Info)?;
        self.textures = Some(TextureRefs::resolve(
            Path::new(TEXTURES_DIR),
            albedo,
            normal,
            skybox,
        ));
        Ok(())
    }

    fn material_line(&mut self, line: &str, number: usize) -> Result<()> {
        let section = Section::Materials;
        let [color, diffuse, glass, glass_reflectivity, uv, emissive] =
            split_fields::<6>(line, number, section)?;

        self.materials.push(Material {
            color: parse_vec3(color, number, section)?,
            diffuse: parse_f32(diffuse, number, section)?,
            glass: parse_f32(glass, number, section)?,
            glass_reflectivity: parse_f32(glass_reflectivity, number, section)?,
            uv_rect: parse_vec4(uv, number, section)?,
            emissive: emissive == "true",
        });
        Ok(())
    }

    fn block_line(&mut self, line: &str, number: usize) -> Result<()> {
        let section = Section::Boxes;
        let [position, size, material, tag] = split_fields::<4>(line, number, section)?;

        self.blocks.push(Block {
            position: parse_vec3(position, number, section)?,
            size: parse_vec3(size, number, section)?,
            material: parse_usize(material, number, section)?,
            trigger: Trigger::from_tag(tag),
        });
        Ok(())
    }

    fn sphere_line(&mut self, line: &str, number: usize) -> Result<()> {
        let section = Section::Spheres;
        let [position, radius, material, tag] = split_fields::<4>(line, number, section)?;

        self.spheres.push(Sphere {
            position: parse_vec3(position, number, section)?,
            radius: parse_f32(radius, number, section)?,
            material: parse_usize(material, number, section)?,
            trigger: Trigger::from_tag(tag),
        });
        Ok(())
    }
}

fn check_material_indices(scene: &Scene) -> Result<()> {
    let count = scene.materials.len();

    for (index, block) in scene.blocks.iter().enumerate() {
        if block.material >= count {
            return Err(ParseError::MaterialIndex {
                kind: "box",
                index,
                material: block.material,
                count,
            });
        }
    }
    for (index, sphere) in scene.spheres.iter().enumerate() {
        if sphere.material >= count {
            return Err(ParseError::MaterialIndex {
                kind: "sphere",
                index,
                material: sphere.material,
                count,
            });
        }
    }

    Ok(())
}

/// Split a data line into exactly `N` `/`-separated fields, trimmed.
///
/// A missing final field parses as empty, so scenes may end a primitive line
/// after the material index instead of writing an empty tag.
fn split_fields<const N: usize>(line: &str, number: usize, section: Section) -> Result<[&str; N]> {
    let mut fields = line.split('/').map(str::trim);
    let mut out = [""; N];

    for (i, slot) in out.iter_mut().enumerate() {
        match fields.next() {
            Some(field) => *slot = field,
            None if i == N - 1 => *slot = "",
            None => {
                return Err(ParseError::Fields {
                    line: number,
                    section,
                    expected: N,
                    got: i,
                })
            }
        }
    }

    let rest = fields.count();
    if rest > 0 {
        return Err(ParseError::Fields {
            line: number,
            section,
            expected: N,
            got: N + rest,
        });
    }

    Ok(out)
}

fn parse_f32(text: &str, line: usize, section: Section) -> Result<f32> {
    text.parse().map_err(|_| ParseError::Number {
        line,
        section,
        text: text.to_string(),
    })
}

fn parse_usize(text: &str, line: usize, section: Section) -> Result<usize> {
    text.parse().map_err(|_| ParseError::Number {
        line,
        section,
        text: text.to_string(),
    })
}

fn parse_vec3(text: &str, line: usize, section: Section) -> Result<Vec3> {
    let [x, y, z] = split_components::<3>(text, line, section)?;
    Ok(Vec3::new(
        parse_f32(x, line, section)?,
        parse_f32(y, line, section)?,
        parse_f32(z, line, section)?,
    ))
}

fn parse_vec4(text: &str, line: usize, section: Section) -> Result<Vec4> {
    let [x, y, z, w] = split_components::<4>(text, line, section)?;
    Ok(Vec4::new(
        parse_f32(x, line, section)?,
        parse_f32(y, line, section)?,
        parse_f32(z, line, section)?,
        parse_f32(w, line, section)?,
    ))
}

fn split_components<const N: usize>(
    text: &str,
    line: usize,
    section: Section,
) -> Result<[&str; N]> {
    let mut components = text.split(',').map(str::trim);
    let mut out = [""; N];

    for (i, slot) in out.iter_mut().enumerate() {
        *slot = components.next().ok_or(ParseError::Fields {
            line,
            section,
            expected: N,
            got: i,
        })?;
    }

    let rest = components.count();
    if rest > 0 {
        return Err(ParseError::Fields {
            line,
            section,
            expected: N,
            got: N + rest,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "\
Info
albedo.png/normal.png/skybox.png

Materials // default set
// gray floor
0.8,0.8,0.8 / 1 / 0 / 0 / 0,0,0.25,0.25 / false
1,0.2,0.2 / 0.5 / 0 / 0 / 0.25,0,0.25,0.25 / true

Boxes
-1,-1,-1 / 2,1,2 / 0 /
4,0,0 / 1,1,1 / 1 / jump_pad
8,0,0 / 1,1,1 / 1 / laser

Spheres
0,3,0 / 0.5 / 1 / checkpoint
";

    #[test]
    fn parses_sections_in_order() {
        let scene = Scene::from_scene_text(SCENE).unwrap();

        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.blocks.len(), 3);
        assert_eq!(scene.spheres.len(), 1);

        assert_eq!(scene.materials[0].color, Vec3::new(0.8, 0.8, 0.8));
        assert!(!scene.materials[0].emissive);
        assert!(scene.materials[1].emissive);

        assert_eq!(scene.blocks[0].position, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(scene.blocks[0].size, Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(scene.blocks[1].material, 1);

        assert_eq!(scene.spheres[0].radius, 0.5);
    }

    #[test]
    fn resolves_triggers_at_parse_time() {
        let scene = Scene::from_scene_text(SCENE).unwrap();

        assert_eq!(scene.blocks[0].trigger, Trigger::Solid);
        assert_eq!(scene.blocks[1].trigger, Trigger::JumpPad);
        assert_eq!(scene.blocks[2].trigger, Trigger::Hazard);
        assert_eq!(
            scene.spheres[0].trigger,
            Trigger::Custom("checkpoint".to_string())
        );
    }

    #[test]
    fn resolves_texture_paths() {
        let scene = Scene::from_scene_text(SCENE).unwrap();

        assert_eq!(
            scene.textures.albedo,
            Path::new(TEXTURES_DIR).join("albedo.png")
        );
        assert_eq!(
            scene.textures.skybox,
            Path::new(TEXTURES_DIR).join("skybox.png")
        );
    }

    #[test]
    fn header_matches_by_prefix() {
        let scene = Scene::from_scene_text(
            "Info\na/b/c\nMaterials // annotated header\n1,1,1 / 1 / 0 / 0 / 0,0,1,1 / false\n",
        )
        .unwrap();

        assert_eq!(scene.materials.len(), 1);
    }

    #[test]
    fn emissive_is_strictly_the_literal_true() {
        let scene = Scene::from_scene_text(
            "Info\na/b/c\nMaterials\n1,1,1 / 1 / 0 / 0 / 0,0,1,1 / True\n",
        )
        .unwrap();

        assert!(!scene.materials[0].emissive);
    }

    #[test]
    fn missing_tag_field_is_solid() {
        let scene =
            Scene::from_scene_text("Info\na/b/c\nMaterials\n1,1,1/1/0/0/0,0,1,1/false\nBoxes\n0,0,0/1,1,1/0\n")
                .unwrap();

        assert_eq!(scene.blocks[0].trigger, Trigger::Solid);
    }

    #[test]
    fn malformed_number_names_line_and_section() {
        let err = Scene::from_scene_text(
            "Info\na/b/c\nMaterials\n1,1,1 / 1 / 0 / 0 / 0,0,1,1 / false\nBoxes\n0,zero,0 / 1,1,1 / 0 /\n",
        )
        .unwrap_err();

        assert_eq!(
            err,
            ParseError::Number {
                line: 6,
                section: Section::Boxes,
                text: "zero".to_string(),
            }
        );
    }

    #[test]
    fn missing_fields_fail() {
        let err =
            Scene::from_scene_text("Info\na/b/c\nMaterials\n1,1,1 / 1 / 0\n").unwrap_err();

        assert!(matches!(
            err,
            ParseError::Fields {
                line: 4,
                section: Section::Materials,
                ..
            }
        ));
    }

    #[test]
    fn material_index_out_of_range_fails() {
        let err = Scene::from_scene_text(
            "Info\na/b/c\nMaterials\n1,1,1 / 1 / 0 / 0 / 0,0,1,1 / false\nBoxes\n0,0,0 / 1,1,1 / 3 /\n",
        )
        .unwrap_err();

        assert_eq!(
            err,
            ParseError::MaterialIndex {
                kind: "box",
                index: 0,
                material: 3,
                count: 1,
            }
        );
    }

    #[test]
    fn missing_info_fails() {
        let err = Scene::from_scene_text("Materials\n1,1,1 / 1 / 0 / 0 / 0,0,1,1 / false\n")
            .unwrap_err();

        assert_eq!(err, ParseError::MissingInfo);
    }

    #[test]
    fn open_failure_is_io_error() {
        let err = Scene::parse("res/scenes/definitely-not-here.scene").unwrap_err();

        assert!(matches!(err, SceneError::Io { .. }));
    }

    #[test]
    fn round_trip_preserves_lists() {
        let scene = Scene::from_scene_text(SCENE).unwrap();
        let reparsed = Scene::from_scene_text(&scene.to_scene_text()).unwrap();

        assert_eq!(reparsed.materials, scene.materials);
        assert_eq!(reparsed.blocks, scene.blocks);
        assert_eq!(reparsed.spheres, scene.spheres);
        assert_eq!(reparsed, scene);
    }
}
