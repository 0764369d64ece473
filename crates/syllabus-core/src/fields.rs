//! Field map construction from submitted form data

/// Field synthesized from the submitted objectives
pub const OBJECTIVES_KEY: &str = "Objectives";

/// Repeated form key that carries one objective per value
pub const OBJECTIVE_FORM_KEY: &str = "objective";

/// Value used for `{Objectives}` when nothing was submitted
pub const NO_OBJECTIVES: &str = "No objectives provided";

/// Insertion-ordered placeholder name to value mapping
///
/// Substitution walks entries in insertion order, which matters when one
/// value itself contains another placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// A decoded form post, split into plain fields and the objectives list
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    fields: FieldMap,
    objectives: Vec<String>,
}

impl FormSubmission {
    /// Build from ordered `(key, value)` pairs as they appeared in the body.
    ///
    /// A key submitted more than once contributes its first value to the
    /// field map; every `objective` value is kept, verbatim and in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut seen: Vec<String> = Vec::new();
        let mut fields = FieldMap::new();
        let mut objectives = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());

            if key == OBJECTIVE_FORM_KEY {
                objectives.push(value.to_string());
            }

            if seen.iter().any(|k| k == key) {
                continue;
            }
            seen.push(key.to_string());
            fields.insert(key.trim(), normalize_value(value));
        }

        Self { fields, objectives }
    }

    /// Fields as submitted, before `Objectives` is synthesized
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn objectives(&self) -> &[String] {
        &self.objectives
    }

    /// Final field map with the rendered objectives list under
    /// [`OBJECTIVES_KEY`]
    pub fn into_field_map(self) -> FieldMap {
        let mut fields = self.fields;
        fields.insert(OBJECTIVES_KEY, objectives_text(&self.objectives));
        fields
    }
}

/// Trim a submitted value and turn each line break into a single space
pub fn normalize_value(value: &str) -> String {
    value
        .trim()
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
}

/// Render objectives as a 1-indexed, newline-separated list
pub fn objectives_text(objectives: &[String]) -> String {
    if objectives.is_empty() {
        return NO_OBJECTIVES.to_string();
    }

    objectives
        .iter()
        .enumerate()
        .map(|(i, objective)| format!("{}. {}", i + 1, objective))
        .collect::<Vec<_>>()
        .join("\n")
}
