//! Single-rule bucket lifecycle policies.

use quick_xml::escape::escape;

use crate::providers::store::SEPARATOR;

/// Expire every object under `prefix` after `days` days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    pub id: String,
    pub prefix: String,
    pub days: i32,
}

impl LifecycleRule {
    /// The folder path always ends with the separator so sibling folders
    /// sharing a name prefix (`logs` vs `logs-old`) are not matched.
    pub fn new(id: impl Into<String>, folder_path: impl Into<String>, days: i32) -> Self {
        let mut prefix = folder_path.into();
        if !prefix.ends_with(SEPARATOR) {
            prefix.push(SEPARATOR);
        }
        Self {
            id: id.into(),
            prefix,
            days,
        }
    }

    /// Policy document in the form S3-compatible stores accept for `PUT ?lifecycle`.
    pub fn to_xml(&self) -> String {
        format!(
            "<LifecycleConfiguration><Rule><ID>{}</ID><Prefix>{}</Prefix><Status>Enabled</Status><Expiration><Days>{}</Days></Expiration></Rule></LifecycleConfiguration>",
            escape(&self.id),
            escape(&self.prefix),
            self.days
        )
    }
}
