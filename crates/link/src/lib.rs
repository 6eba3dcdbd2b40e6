mod config;
mod render;
mod report;
mod segments;

pub use config::{
    AssemblerConfig, DefaultSection, OutputKind, OutputSpec, default_config, load_config,
};
pub use render::{render_object_text, render_output};
pub use report::{LayoutReport, LineReport, RelocationReport, SectionReport, layout_report};
pub use segments::{Segment, layout_segments};

#[cfg(test)]
mod tests;
