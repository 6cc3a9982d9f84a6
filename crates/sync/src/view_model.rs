//! In-memory mirror of one remote collection.

use admindash_core::{Entity, RecordId, Stored};

/// Ordered list of records as last synced.
///
/// Order is whatever the gateway returned (appends go to the end); no sort is
/// imposed. Ids are unique: `append` of an id already present replaces in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel<E> {
    rows: Vec<Stored<E>>,
}

impl<E> Default for ViewModel<E> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<E: Entity> ViewModel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a fresh read or push snapshot.
    pub fn replace_all(&mut self, rows: Vec<Stored<E>>) {
        self.rows = rows;
    }

    /// Add a record at the end. Returns `false` when the id was already
    /// present (e.g. a push snapshot delivered it first); that row is
    /// refreshed in place instead.
    pub fn append(&mut self, row: Stored<E>) -> bool {
        match self.position(&row.id) {
            Some(idx) => {
                self.rows[idx] = row;
                false
            }
            None => {
                self.rows.push(row);
                true
            }
        }
    }

    pub fn update_by_id(&mut self, id: &RecordId, data: E) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.rows[idx].data = data;
                true
            }
            None => false,
        }
    }

    pub fn remove_by_id(&mut self, id: &RecordId) -> Option<Stored<E>> {
        self.position(id).map(|idx| self.rows.remove(idx))
    }

    pub fn get(&self, id: &RecordId) -> Option<&Stored<E>> {
        self.rows.iter().find(|row| &row.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stored<E>> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[Stored<E>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.rows.iter().map(|row| &row.id)
    }

    /// Rows with 1-based numbers, for the "No." column of table screens.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Stored<E>)> {
        self.rows.iter().enumerate().map(|(i, row)| (i + 1, row))
    }

    /// Zero-based page of at most `size` rows; empty past the end.
    pub fn page(&self, index: usize, size: usize) -> &[Stored<E>] {
        if size == 0 {
            return &[];
        }
        let start = index.saturating_mul(size).min(self.rows.len());
        let end = start.saturating_add(size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn page_count(&self, size: usize) -> usize {
        if size == 0 {
            return 0;
        }
        self.rows.len().div_ceil(size)
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admindash_records::Todo;
    use proptest::prelude::*;

    fn row(id: &str, title: &str) -> Stored<Todo> {
        Stored::new(
            RecordId::parse(id).unwrap(),
            Todo { title: title.to_string(), completed: false },
        )
    }

    fn id(raw: &str) -> RecordId {
        RecordId::parse(raw).unwrap()
    }

    #[test]
    fn append_upserts_by_id() {
        let mut vm = ViewModel::new();
        assert!(vm.append(row("a", "one")));
        assert!(vm.append(row("b", "two")));
        assert!(!vm.append(row("a", "uno")));

        let titles: Vec<_> = vm.iter().map(|r| r.data.title.as_str()).collect();
        assert_eq!(titles, vec!["uno", "two"]);
    }

    #[test]
    fn update_and_remove_report_missing_ids() {
        let mut vm = ViewModel::new();
        vm.append(row("a", "one"));

        assert!(!vm.update_by_id(&id("zz"), Todo { title: "x".into(), completed: true }));
        assert!(vm.remove_by_id(&id("zz")).is_none());
        assert!(vm.update_by_id(&id("a"), Todo { title: "one".into(), completed: true }));
        assert!(vm.get(&id("a")).unwrap().data.completed);
        assert_eq!(vm.remove_by_id(&id("a")).unwrap().id, id("a"));
        assert!(vm.is_empty());
    }

    #[test]
    fn numbering_and_paging_follow_gateway_order() {
        let mut vm = ViewModel::new();
        for i in 0..13 {
            vm.append(row(&format!("r{i}"), &format!("t{i}")));
        }

        let (n, first) = vm.numbered().next().unwrap();
        assert_eq!((n, first.id.as_str()), (1, "r0"));

        assert_eq!(vm.page_count(6), 3);
        assert_eq!(vm.page(1, 6).len(), 6);
        assert_eq!(vm.page(2, 6)[0].id.as_str(), "r12");
        assert!(vm.page(3, 6).is_empty());
        assert!(vm.page(0, 0).is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append(u8),
        Update(u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Append),
            (0u8..8).prop_map(Op::Update),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn ids_stay_unique_and_survivors_keep_order(ops in prop::collection::vec(op(), 0..40)) {
            let mut vm: ViewModel<Todo> = ViewModel::new();
            let mut model: Vec<u8> = Vec::new();

            for op in ops {
                match op {
                    Op::Append(k) => {
                        vm.append(row(&format!("k{k}"), "t"));
                        if !model.contains(&k) {
                            model.push(k);
                        }
                    }
                    Op::Update(k) => {
                        let hit = vm.update_by_id(&id(&format!("k{k}")), Todo { title: "u".into(), completed: true });
                        prop_assert_eq!(hit, model.contains(&k));
                    }
                    Op::Remove(k) => {
                        let removed = vm.remove_by_id(&id(&format!("k{k}")));
                        prop_assert_eq!(removed.is_some(), model.contains(&k));
                        model.retain(|m| *m != k);
                    }
                }
            }

            let ids: Vec<String> = vm.ids().map(|i| i.to_string()).collect();
            let expected: Vec<String> = model.iter().map(|k| format!("k{k}")).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
