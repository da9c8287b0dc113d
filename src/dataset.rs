//! Email datasets stored as JSON lines
//!
//! Every line is one JSON object with an `id` plus whatever fields the prompt
//! templates use (`sender`, `subject`, `content`, or synthetic seeds such as
//! `topic`/`persona`/`tone`).

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::prompts::FieldSource;

/// One email instance. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a decoded JSON object.
    ///
    /// Integer ids are normalized to their decimal string.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            anyhow::bail!("record is not a JSON object");
        };
        let id = match fields.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(other) => anyhow::bail!("record id must be a string or integer, got {}", other),
            None => anyhow::bail!("record has no 'id' field"),
        };
        Ok(Self { id, fields })
    }

    /// Build a record from string fields, mostly useful for tests and seeds
    pub fn from_pairs(id: &str, pairs: &[(&str, &str)]) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        for (key, value) in pairs {
            fields.insert(key.to_string(), Value::String(value.to_string()));
        }
        Self {
            id: id.to_string(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn sender(&self) -> Option<&str> {
        self.get_str("sender")
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("subject")
    }

    pub fn content(&self) -> Option<&str> {
        self.get_str("content")
    }

    /// The whole record as a JSON object, as handed to the judge
    pub fn to_json_text(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl FieldSource for Record {
    fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Records of one task category, in file order, addressable by id
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    name: String,
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a `.jsonl` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse(&name, &content)
            .with_context(|| format!("Failed to parse dataset: {}", path.display()))
    }

    /// Load a dataset, treating a missing file as empty
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("Dataset {} not found, using an empty set", path.display());
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Ok(Self::new(name));
        }
        Self::load(path)
    }

    /// Parse JSON-lines text. Blank lines are skipped.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let mut dataset = Self::new(name);
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)
                .with_context(|| format!("line {}: invalid JSON", line_no + 1))?;
            let record =
                Record::from_value(value).with_context(|| format!("line {}", line_no + 1))?;
            dataset.insert(record);
        }
        tracing::debug!("Loaded {} record(s) for dataset '{}'", dataset.len(), name);
        Ok(dataset)
    }

    /// Add a record. A repeated id replaces the earlier record in place.
    pub fn insert(&mut self, record: Record) {
        if let Some(&pos) = self.index.get(record.id()) {
            tracing::warn!(
                "Dataset '{}': duplicate id {}, keeping the later record",
                self.name,
                record.id()
            );
            self.records[pos] = record;
        } else {
            self.index.insert(record.id().to_string(), self.records.len());
            self.records.push(record);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write records as JSON lines, replacing `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let mut file = fs::File::create(path)
            .with_context(|| format!("Failed to create dataset: {}", path.display()))?;
        for record in &self.records {
            writeln!(file, "{}", record.to_json_text())
                .with_context(|| format!("Failed to write dataset: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"id": 1, "sender": "zoe.lin@foresttrailpublishing.com", "subject": "Illustration Review", "content": "Hello team, please review the packet."}

{"id": "2", "sender": "sam@example.com", "subject": "Ship date", "content": "Ship date is Friday."}
"#;

    #[test]
    fn test_parse_preserves_order_and_normalizes_ids() {
        let dataset = Dataset::parse("shorten", SAMPLE).unwrap();
        assert_eq!(dataset.len(), 2);
        let ids: Vec<_> = dataset.records().iter().map(Record::id).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let first = dataset.get("1").unwrap();
        assert_eq!(first.subject(), Some("Illustration Review"));
        assert_eq!(first.field("id").as_deref(), Some("1"));
        assert!(dataset.get("3").is_none());
    }

    #[test]
    fn test_duplicate_id_replaces_in_place() {
        let text = "{\"id\":\"a\",\"content\":\"one\"}\n{\"id\":\"b\",\"content\":\"two\"}\n{\"id\":\"a\",\"content\":\"three\"}";
        let dataset = Dataset::parse("d", text).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].content(), Some("three"));
        assert_eq!(dataset.records()[1].id(), "b");
    }

    #[test]
    fn test_invalid_lines_name_the_line() {
        let err = Dataset::parse("d", "{\"id\":1}\nnot json").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = Dataset::parse("d", "{\"content\":\"no id\"}").unwrap_err();
        assert!(format!("{:#}", err).contains("no 'id'"));

        assert!(Dataset::parse("d", "[1, 2]").is_err());
        assert!(Dataset::parse("d", "{\"id\": 1.5}").is_err());
    }

    #[test]
    fn test_non_string_fields_render_as_json() {
        let record =
            Record::from_value(serde_json::json!({"id": 7, "length": 200, "tags": ["a"]}))
                .unwrap();
        assert_eq!(record.field("length").as_deref(), Some("200"));
        assert_eq!(record.field("tags").as_deref(), Some("[\"a\"]"));
        assert_eq!(record.field("missing"), None);
    }

    #[test]
    fn test_json_text_contains_fields() {
        let record = Record::from_pairs("1", &[("content", "Hi team")]);
        let value: Value = serde_json::from_str(&record.to_json_text()).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["content"], "Hi team");
    }

    #[test]
    fn test_field_order_follows_the_file() {
        let line = r#"{"id": 1, "sender": "a@b.c", "subject": "S", "content": "Body"}"#;
        let dataset = Dataset::parse("shorten", line).unwrap();
        let expected = r#"{"id":1,"sender":"a@b.c","subject":"S","content":"Body"}"#;
        assert_eq!(dataset.records()[0].to_json_text(), expected);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shorten.jsonl");
        dataset.write(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{}\n", expected));
    }

    #[test]
    fn test_load_write_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("shorten.jsonl");

        let mut dataset = Dataset::new("shorten");
        dataset.insert(Record::from_pairs("1", &[("content", "first")]));
        dataset.insert(Record::from_pairs("2", &[("content", "second")]));
        dataset.write(&path).unwrap();

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded.name(), "shorten");
        assert_eq!(loaded.records(), dataset.records());

        let empty = Dataset::load_or_empty(&dir.path().join("tone.jsonl")).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.name(), "tone");
        assert!(Dataset::load(&dir.path().join("tone.jsonl")).is_err());
    }
}
