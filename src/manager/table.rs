use crate::models::process::ProcessRecord;

/// Ordered store of every supervised process, indexed by `record.index`.
///
/// Records are only appended while launching. Once the monitor loop runs
/// the length is fixed and records are mutated in place.
#[derive(Debug, Default)]
pub struct ProcessTable {
    records: Vec<ProcessRecord>,
}

impl ProcessTable {
    pub(crate) fn push(&mut self, record: ProcessRecord) -> &ProcessRecord {
        debug_assert_eq!(record.index, self.records.len());
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProcessRecord> {
        self.records.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ProcessRecord> {
        self.records.get_mut(index)
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProcessRecord> {
        self.records.iter_mut()
    }

    /// Counts records in `Running` by scanning the table.
    pub fn count_running(&self) -> usize {
        self.records.iter().filter(|r| r.is_running()).count()
    }
}
