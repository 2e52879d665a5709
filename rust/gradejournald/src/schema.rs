use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Class,
    FullName,
    Math,
    Russian,
    Physics,
    Literature,
}

/// Export/header order.
pub const FIELDS: [Field; 6] = [
    Field::Class,
    Field::FullName,
    Field::Math,
    Field::Russian,
    Field::Physics,
    Field::Literature,
];

pub const SUBJECTS: [Field; 4] = [Field::Math, Field::Russian, Field::Physics, Field::Literature];

/// Case-sensitive, matched after trim.
const ALIASES: &[(&str, Field)] = &[
    ("Класс", Field::Class),
    ("Class", Field::Class),
    ("ФИО", Field::FullName),
    ("FullName", Field::FullName),
    ("Name", Field::FullName),
    ("Математика", Field::Math),
    ("Math", Field::Math),
    ("Русский_язык", Field::Russian),
    ("Русский язык", Field::Russian),
    ("Russian", Field::Russian),
    ("Физика", Field::Physics),
    ("Physics", Field::Physics),
    ("Литература", Field::Literature),
    ("Literature", Field::Literature),
];

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Class => "Class",
            Field::FullName => "FullName",
            Field::Math => "Math",
            Field::Russian => "Russian",
            Field::Physics => "Physics",
            Field::Literature => "Literature",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Class => "Класс",
            Field::FullName => "ФИО",
            Field::Math => "Математика",
            Field::Russian => "Русский язык",
            Field::Physics => "Физика",
            Field::Literature => "Литература",
        }
    }

    pub fn is_subject(self) -> bool {
        SUBJECTS.contains(&self)
    }

    pub fn from_label(raw: &str) -> Option<Field> {
        let t = raw.trim();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == t)
            .map(|(_, f)| *f)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Canonical name for a known alias, otherwise the trimmed label itself.
pub fn normalize(raw: &str) -> String {
    match Field::from_label(raw) {
        Some(f) => f.name().to_string(),
        None => raw.trim().to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Class", default)]
    pub class: String,
    #[serde(rename = "FullName", default)]
    pub full_name: String,
    #[serde(rename = "Math", default)]
    pub math: String,
    #[serde(rename = "Russian", default)]
    pub russian: String,
    #[serde(rename = "Physics", default)]
    pub physics: String,
    #[serde(rename = "Literature", default)]
    pub literature: String,
    /// Columns with no canonical mapping, keyed by their trimmed source label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl StudentRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Class => &self.class,
            Field::FullName => &self.full_name,
            Field::Math => &self.math,
            Field::Russian => &self.russian,
            Field::Physics => &self.physics,
            Field::Literature => &self.literature,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Class => self.class = value,
            Field::FullName => self.full_name = value,
            Field::Math => self.math = value,
            Field::Russian => self.russian = value,
            Field::Physics => self.physics = value,
            Field::Literature => self.literature = value,
        }
    }

    /// The single parsing path for grades; `None` means ungraded.
    pub fn grade(&self, subject: Field) -> Option<i64> {
        parse_grade(self.get(subject))
    }
}

/// Leading-integer parse: optional sign, then digits; anything after the
/// digits is ignored ("4.5" -> 4). No digits -> None. Values past the
/// `i64` range saturate.
pub fn parse_grade(raw: &str) -> Option<i64> {
    let t = raw.trim();
    let (negative, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }
    let n = rest.bytes().take(digits_len).fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -n } else { n })
}

/// A header row plus data rows, as produced by a decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn normalize_table(raw: &RawTable) -> Vec<StudentRecord> {
    let columns: Vec<(Option<Field>, String)> = raw
        .headers
        .iter()
        .map(|h| {
            let name = normalize(h);
            let field = FIELDS.iter().copied().find(|f| f.name() == name);
            (field, name)
        })
        .collect();

    raw.rows
        .iter()
        .map(|row| {
            let mut rec = StudentRecord::default();
            for (idx, (field, label)) in columns.iter().enumerate() {
                let value = row.get(idx).map(|v| v.trim()).unwrap_or("");
                match field {
                    Some(f) => rec.set(*f, value),
                    None => {
                        rec.extra.insert(label.clone(), value.to_string());
                    }
                }
            }
            rec
        })
        .collect()
}
