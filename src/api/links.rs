use std::collections::BTreeMap;

use url::form_urlencoded;

/// Builds absolute or root-relative links under the configured base URL
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into().trim_end_matches('/').to_string() }
    }

    /// `/contacts`
    pub fn collection(&self, type_name: &str) -> String {
        format!("{}/{}", self.base, type_name)
    }

    /// `/contacts/1`
    pub fn resource(&self, type_name: &str, id: i64) -> String {
        format!("{}/{}/{}", self.base, type_name, id)
    }

    /// `/contacts/1/relationships/phone_numbers`
    pub fn relationship(&self, type_name: &str, id: i64, name: &str) -> String {
        format!("{}/{}/{}/relationships/{}", self.base, type_name, id, name)
    }

    /// `/contacts/1/phone_numbers`
    pub fn related(&self, type_name: &str, id: i64, name: &str) -> String {
        format!("{}/{}/{}/{}", self.base, type_name, id, name)
    }

    /// Append encoded query pairs to `path`
    pub fn with_query(path: &str, pairs: &BTreeMap<String, String>) -> String {
        if pairs.is_empty() {
            return path.to_string();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in pairs {
            serializer.append_pair(k, v);
        }
        format!("{}?{}", path, serializer.finish())
    }
}
