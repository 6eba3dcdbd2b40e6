use anyhow::{Result, bail};
use pepas_core::AssemblyOutput;
use tracing::debug;

use super::{OutputKind, Segment};

const OBJECT_TEXT_BYTES_PER_LINE: usize = 16;

pub fn render_output(
    output: &AssemblyOutput,
    segments: &[Segment],
    kind: OutputKind,
) -> Result<Vec<u8>> {
    match kind {
        OutputKind::RawBinary => render_raw_binary(output, segments),
        OutputKind::ObjectText => Ok(render_object_text(output, segments).into_bytes()),
    }
}

/// Place every stored byte at its assigned address. Gaps between segments
/// are zero-filled; BSS segments contribute nothing.
fn render_raw_binary(output: &AssemblyOutput, segments: &[Segment]) -> Result<Vec<u8>> {
    let mut placed: Vec<(u32, &[u8])> = Vec::new();
    for segment in segments.iter().filter(|segment| !segment.is_bss) {
        for &index in &segment.sections {
            let section = &output.sections[index];
            let bytes = output.section_bytes(index);
            for &line in &section.lines {
                let (Some(address), Some(span)) =
                    (output.addresses.get(line), output.object.spans.get(line))
                else {
                    continue;
                };
                let Some(code) = bytes.get(span.range.clone()) else {
                    bail!(
                        "object code for {line} lies outside section '{}'",
                        section.descriptor.name
                    );
                };
                if !code.is_empty() {
                    placed.push((u32::from(address.address), code));
                }
            }
        }
    }

    let Some(start) = placed.iter().map(|(address, _)| *address).min() else {
        return Ok(Vec::new());
    };
    let end = placed
        .iter()
        .map(|(address, code)| address + code.len() as u32)
        .max()
        .unwrap_or(start);
    if end > 0x1_0000 {
        bail!("raw binary output wraps past address 0xFFFF");
    }

    let mut image = vec![0u8; (end - start) as usize];
    let mut used = vec![false; image.len()];
    for (address, code) in placed {
        let offset = (address - start) as usize;
        for (index, byte) in code.iter().enumerate() {
            if std::mem::replace(&mut used[offset + index], true) {
                bail!(
                    "raw binary output overlaps at address {:#06X}",
                    address as usize + index
                );
            }
            image[offset + index] = *byte;
        }
    }

    debug!(start, end, "rendered raw binary");
    Ok(image)
}

/// Render stored bytes in address order as Pep object text.
pub fn render_object_text(output: &AssemblyOutput, segments: &[Segment]) -> String {
    let mut sections: Vec<usize> = segments
        .iter()
        .filter(|segment| !segment.is_bss)
        .flat_map(|segment| segment.sections.iter().copied())
        .collect();
    sections.sort_by_key(|&index| output.sections[index].descriptor.base_address);

    let mut tokens: Vec<String> = sections
        .iter()
        .flat_map(|&index| output.section_bytes(index).iter())
        .map(|byte| format!("{byte:02X}"))
        .collect();
    tokens.push("zz".to_string());

    let mut text = String::new();
    for row in tokens.chunks(OBJECT_TEXT_BYTES_PER_LINE) {
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    text
}
