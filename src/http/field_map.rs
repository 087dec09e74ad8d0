use super::error::HttpError;

// Lookups are case-sensitive and return the first match. HTTP field names
// are case-insensitive on the wire; kept as-is rather than silently fixed.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        FieldMap { fields: Vec::new() }
    }

    /// Append a field, regardless of whether a field with the same name
    /// already exists.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Fallible variant reserving capacity first, matching the reference
    /// implementation's explicit allocation-failure handling in `addField`.
    /// The map is left unchanged on error.
    pub fn try_append(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), HttpError> {
        self.fields
            .try_reserve(1)
            .map_err(|_| HttpError::AllocFailure)?;
        self.fields.push((name.into(), value.into()));
        Ok(())
    }

    /// Value of the first field whose name matches exactly.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value of the first field whose name matches exactly.
    /// Returns `false` if no such field exists, leaving the map unchanged.
    pub fn replace(&mut self, name: &str, new_value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                *v = new_value.into();
                true
            }
            None => false,
        }
    }

    /// Insert-or-replace convenience: replaces the first match in place, or
    /// appends a new field if absent.
    pub fn set(&mut self, name: &str, value: impl Into<String> + Clone) {
        if !self.replace(name, value.clone()) {
            self.append(name.to_string(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_get_first_match() {
        let mut fields = FieldMap::new();
        fields.append("Host", "example.com");
        fields.append("Host", "other.com");
        assert_eq!(fields.get("Host"), Some("example.com"));
    }

    #[test]
    fn get_is_case_sensitive() {
        let mut fields = FieldMap::new();
        fields.append("Host", "example.com");
        assert_eq!(fields.get("host"), None);
    }

    #[test]
    fn replace_updates_first_match_only() {
        let mut fields = FieldMap::new();
        fields.append("X", "a");
        fields.append("X", "b");
        assert!(fields.replace("X", "c"));
        assert_eq!(fields.get("X"), Some("c"));
        assert_eq!(fields.iter().nth(1), Some(("X", "b")));
    }

    #[test]
    fn replace_missing_returns_false() {
        let mut fields = FieldMap::new();
        assert!(!fields.replace("Missing", "value"));
        assert!(fields.is_empty());
    }

    #[test]
    fn set_appends_when_absent() {
        let mut fields = FieldMap::new();
        fields.set("Connection", "close");
        assert_eq!(fields.get("Connection"), Some("close"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut fields = FieldMap::new();
        fields.append("A", "1");
        fields.append("B", "2");
        let collected: Vec<_> = fields.iter().collect();
        assert_eq!(collected, vec![("A", "1"), ("B", "2")]);
    }
}
