use std::ops::Index;

use super::Line;

/// Stable handle of a line inside a [`Program`]. Handles are issued in file
/// order, so sorting by handle sorts by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u32);

impl LineId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.0 + 1)
    }
}

/// Arena owning every line of one assembly target.
#[derive(Debug, Clone, Default)]
pub struct Program {
    lines: Vec<Line>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line) -> LineId {
        let id = LineId(self.lines.len() as u32);
        self.lines.push(line);
        id
    }

    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = LineId> + '_ {
        (0..self.lines.len() as u32).map(LineId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineId, &Line)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (LineId(index as u32), line))
    }
}

impl Index<LineId> for Program {
    type Output = Line;

    fn index(&self, id: LineId) -> &Line {
        &self.lines[id.index()]
    }
}

impl FromIterator<Line> for Program {
    fn from_iter<T: IntoIterator<Item = Line>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}
