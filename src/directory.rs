//! In-memory country name -> ISO code lookup, filled by `Client::list_countries`.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CountryDirectory {
    codes: HashMap<String, String>,
}

impl CountryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    pub fn code_for_name_ignore_case(&self, name: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, code)| code.as_str())
    }

    /// Display name for an ISO code (case-insensitive).
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.codes
            .iter()
            .filter(|(_, c)| c.eq_ignore_ascii_case(code))
            .map(|(name, _)| name.as_str())
            .min()
    }

    /// Insert every pair; names seen before get the new code, other entries stay.
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.codes.extend(entries);
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
