/// Header list in wire order.
///
/// Names are matched ASCII case-insensitively. Replacing a value keeps the
/// header where it was first inserted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        HttpHeaders {
            entries: Vec::new(),
        }
    }

    /// Insert to header, replacing any value under the same name
    pub fn insert(&mut self, k: &str, v: &str) {
        match self.position(k) {
            Some(idx) => {
                self.entries[idx].1 = v.to_string();
                // a replaced header must not appear twice
                let mut i = idx + 1;
                while i < self.entries.len() {
                    if self.entries[i].0.eq_ignore_ascii_case(k) {
                        self.entries.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.entries.push((k.to_string(), v.to_string())),
        }
    }

    /// Append without replacing, for repeated request headers
    pub fn append(&mut self, k: &str, v: &str) {
        self.entries.push((k.to_string(), v.to_string()));
    }

    /// Get the first value of the header
    pub fn get(&self, k: &str) -> Option<&String> {
        self.position(k).map(|idx| &self.entries[idx].1)
    }

    /// Remove every value under the name
    pub fn remove(&mut self, k: &str) -> Option<String> {
        let first = self.position(k).map(|idx| self.entries[idx].1.clone());
        self.entries.retain(|(name, _)| !name.eq_ignore_ascii_case(k));
        first
    }

    /// Move the header to the end of the list
    pub fn push_last(&mut self, k: &str, v: &str) {
        self.remove(k);
        self.entries.push((k.to_string(), v.to_string()));
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Check if the key in the header exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, k: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(k))
    }
}

/// Directly used in for loop
impl IntoIterator for HttpHeaders {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
