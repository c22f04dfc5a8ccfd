//! First-seen-order id assignment for category and image names.

/// Memoized name-to-id table.
///
/// Ids are handed out in first-seen order from a fixed base, so re-running
/// an export over unchanged input reproduces the same assignment.
#[derive(Debug)]
pub struct IdRegistry {
    entries: Vec<(String, i32)>,
    next_id: i32,
}

impl IdRegistry {
    /// Create an empty registry whose first assigned id is `first_id`.
    pub fn starting_at(first_id: i32) -> Self {
        IdRegistry {
            entries: Vec::new(),
            next_id: first_id,
        }
    }

    /// Return the id already assigned to `name`, or assign the next one.
    pub fn get_or_create_id(&mut self, name: &str) -> i32 {
        if let Some((_, id)) = self.entries.iter().find(|(n, _)| n == name) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((name.to_string(), id));
        id
    }

    /// (name, id) pairs in assignment order.
    pub fn entries(&self) -> &[(String, i32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
