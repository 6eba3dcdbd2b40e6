use pepas_core::Section;
use pepas_ir::SectionFlags;
use serde::Serialize;
use tracing::debug;

/// A loadable run of sections sharing permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub flags: SectionFlags,
    pub is_bss: bool,
    /// Indices into the section list, in section order.
    pub sections: Vec<usize>,
    pub base_address: u16,
    /// Bytes stored in the output file.
    pub file_size: u32,
    /// Bytes of address space reserved, BSS included.
    pub memory_size: u32,
}

impl Segment {
    fn open(index: usize, section: &Section) -> Self {
        let descriptor = &section.descriptor;
        Self {
            flags: descriptor.flags,
            is_bss: descriptor.is_bss(),
            sections: vec![index],
            base_address: descriptor.base_address,
            file_size: if descriptor.is_bss() {
                0
            } else {
                descriptor.byte_count
            },
            memory_size: descriptor.byte_count,
        }
    }

    fn join(&mut self, index: usize, section: &Section) {
        let descriptor = &section.descriptor;
        self.sections.push(index);
        self.base_address = self.base_address.min(descriptor.base_address);
        if !descriptor.is_bss() {
            self.file_size += descriptor.byte_count;
        }
        self.memory_size += descriptor.byte_count;
    }
}

/// Group laid-out sections into segments. Sections with an empty address
/// range and no bytes are skipped. `.ORG` can move a section's end back onto
/// its start, so the byte count decides whether a section is empty.
pub fn layout_segments(sections: &[Section]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();

    for (index, section) in sections.iter().enumerate() {
        let descriptor = &section.descriptor;
        if descriptor.extent() == 0 && descriptor.byte_count == 0 {
            continue;
        }

        let joins = match segments.last() {
            Some(open) if descriptor.is_bss() => open.file_size == 0,
            Some(open) => open.file_size != 0 && open.flags.same_permissions(&descriptor.flags),
            None => false,
        };

        match segments.last_mut() {
            Some(open) if joins => open.join(index, section),
            _ => segments.push(Segment::open(index, section)),
        }
    }

    debug!(
        sections = sections.len(),
        segments = segments.len(),
        "grouped sections into segments"
    );
    segments
}
