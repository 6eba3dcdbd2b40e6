use pepas_ir::LineId;

/// Address and size of a line that occupies at least one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub address: u16,
    pub size: u16,
}

/// Per-line table under construction. Inserts are unordered; lookups are
/// only available after [`UnsortedTable::finish`].
#[derive(Debug, Clone)]
pub struct UnsortedTable<V> {
    entries: Vec<(LineId, V)>,
}

impl<V> Default for UnsortedTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> UnsortedTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: LineId, value: V) {
        self.entries.push((line, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort by line and keep the last value written for each line.
    pub fn finish(mut self) -> SortedTable<V> {
        self.entries.sort_by_key(|(line, _)| *line);
        self.entries.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                std::mem::swap(later, earlier);
                true
            } else {
                false
            }
        });
        SortedTable {
            entries: self.entries,
        }
    }
}

/// Per-line table sorted by [`LineId`].
#[derive(Debug, Clone)]
pub struct SortedTable<V> {
    entries: Vec<(LineId, V)>,
}

impl<V> Default for SortedTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> SortedTable<V> {
    pub fn get(&self, line: LineId) -> Option<&V> {
        self.entries
            .binary_search_by_key(&line, |(key, _)| *key)
            .ok()
            .map(|index| &self.entries[index].1)
    }

    pub fn contains(&self, line: LineId) -> bool {
        self.get(line).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineId, &V)> {
        self.entries.iter().map(|(line, value)| (*line, value))
    }
}

pub type AddressTable = SortedTable<Address>;
