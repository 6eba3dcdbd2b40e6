use anyhow::{Context, Result};
use pepas_core::{AssembleOptions, DEFAULT_SECTION_NAME, SectionDescriptor};
use pepas_ir::SectionFlags;
use pepas_symbol::SymbolTable;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssemblerConfig {
    /// Origin used when a program has neither `.ORG` nor `.BURN`.
    #[serde(default)]
    pub initial_base_address: u16,
    #[serde(default)]
    pub default_section: DefaultSection,
    #[serde(default)]
    pub output: OutputSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultSection {
    #[serde(default = "default_section_name")]
    pub name: String,
    #[serde(default = "default_section_flags")]
    pub flags: String,
}

fn default_section_name() -> String {
    DEFAULT_SECTION_NAME.to_string()
}

fn default_section_flags() -> String {
    "rwx".to_string()
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            name: default_section_name(),
            flags: default_section_flags(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSpec {
    #[serde(default = "default_output_kind")]
    pub kind: OutputKind,
    #[serde(default = "default_listing")]
    pub listing: bool,
}

fn default_output_kind() -> OutputKind {
    OutputKind::ObjectText
}

fn default_listing() -> bool {
    true
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            kind: default_output_kind(),
            listing: default_listing(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OutputKind {
    /// Memory image from the lowest to the highest occupied address.
    RawBinary,
    /// Pep object text: space separated hex bytes terminated by `zz`.
    ObjectText,
}

impl OutputKind {
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::RawBinary => "bin",
            OutputKind::ObjectText => "pepo",
        }
    }
}

impl AssemblerConfig {
    pub fn default_section_descriptor(&self) -> Result<SectionDescriptor> {
        let flags = SectionFlags::parse(&self.default_section.flags).with_context(|| {
            format!(
                "invalid flags \"{}\" for default section '{}'",
                self.default_section.flags, self.default_section.name
            )
        })?;
        Ok(SectionDescriptor::new(
            self.default_section.name.clone(),
            flags,
        ))
    }

    pub fn assemble_options<'a>(&self, linked: &'a [&'a SymbolTable]) -> Result<AssembleOptions<'a>> {
        Ok(AssembleOptions {
            initial_base_address: self.initial_base_address,
            default_section: self.default_section_descriptor()?,
            linked,
        })
    }
}

pub fn load_config(path: &Path) -> Result<AssemblerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assembler config '{}'", path.display()))?;
    ron::from_str(&text)
        .with_context(|| format!("failed to parse assembler config '{}'", path.display()))
}

pub fn default_config() -> AssemblerConfig {
    AssemblerConfig {
        initial_base_address: 0,
        default_section: DefaultSection::default(),
        output: OutputSpec::default(),
    }
}
