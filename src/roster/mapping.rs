use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AllotError, Result};

/// Logical meaning a spreadsheet column can be given in the column-mapping UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRole {
    Ignore,
    RollNo,
    Name,
    Gender,
    Soe,
    FatherName,
    MotherName,
    Program,
}

impl FieldRole {
    pub const REQUIRED: [FieldRole; 4] = [
        FieldRole::RollNo,
        FieldRole::Name,
        FieldRole::Gender,
        FieldRole::Soe,
    ];

    /// Roles that are carried into the output when mapped, beyond the required four.
    pub const OPTIONAL: [FieldRole; 3] = [
        FieldRole::FatherName,
        FieldRole::MotherName,
        FieldRole::Program,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Ignore => "ignore",
            FieldRole::RollNo => "rollNo",
            FieldRole::Name => "name",
            FieldRole::Gender => "gender",
            FieldRole::Soe => "soe",
            FieldRole::FatherName => "fatherName",
            FieldRole::MotherName => "motherName",
            FieldRole::Program => "program",
        }
    }

    /// Column header used in the generated spreadsheet
    pub fn label(&self) -> &'static str {
        match self {
            FieldRole::Ignore => "Ignored",
            FieldRole::RollNo => "Roll No",
            FieldRole::Name => "Name",
            FieldRole::Gender => "Gender",
            FieldRole::Soe => "SOE",
            FieldRole::FatherName => "Father's Name",
            FieldRole::MotherName => "Mother's Name",
            FieldRole::Program => "Program",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldRole {
    type Err = AllotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ignore" => Ok(FieldRole::Ignore),
            "rollNo" => Ok(FieldRole::RollNo),
            "name" => Ok(FieldRole::Name),
            "gender" => Ok(FieldRole::Gender),
            "soe" => Ok(FieldRole::Soe),
            "fatherName" => Ok(FieldRole::FatherName),
            "motherName" => Ok(FieldRole::MotherName),
            "program" => Ok(FieldRole::Program),
            other => Err(AllotError::InvalidMapping(format!("unknown field role {other:?}"))),
        }
    }
}

/// Role -> column name, validated once before the allotment runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    columns: BTreeMap<FieldRole, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. `Ignore` and blank column names are dropped.
    pub fn with(mut self, role: FieldRole, column: impl Into<String>) -> Self {
        self.insert(role, column);
        self
    }

    pub fn insert(&mut self, role: FieldRole, column: impl Into<String>) {
        let column = column.into();
        let column = column.trim();
        if role == FieldRole::Ignore || column.is_empty() {
            return;
        }
        self.columns.insert(role, column.to_string());
    }

    /// Parses either `{"rollNo": "Roll Number"}` (role -> column) or the
    /// column-mapping UI's `{"Roll Number": "rollNo"}` (column -> role).
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| AllotError::InvalidMapping(e.to_string()))?;
        Self::from_pairs(raw)
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let pairs: Vec<(String, String)> = pairs.into_iter().collect();
        let mut mapping = Self::new();

        if pairs.iter().all(|(key, _)| key.parse::<FieldRole>().is_ok()) {
            for (role, column) in pairs {
                mapping.insert(role.parse()?, column);
            }
            return Ok(mapping);
        }

        for (column, role) in pairs {
            let role: FieldRole = role.parse().map_err(|_| {
                AllotError::InvalidMapping(format!(
                    "column {column:?} is mapped to unknown role {role:?}"
                ))
            })?;
            if role != FieldRole::Ignore && mapping.columns.contains_key(&role) {
                return Err(AllotError::InvalidMapping(format!(
                    "role {role} is mapped to more than one column"
                )));
            }
            mapping.insert(role, column);
        }
        Ok(mapping)
    }

    pub fn column(&self, role: FieldRole) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (FieldRole, &str)> {
        self.columns.iter().map(|(role, column)| (*role, column.as_str()))
    }

    /// Optional roles that have a column, in output order.
    pub fn mapped_optional(&self) -> Vec<FieldRole> {
        FieldRole::OPTIONAL
            .into_iter()
            .filter(|role| self.columns.contains_key(role))
            .collect()
    }

    pub fn missing_required(&self) -> Vec<FieldRole> {
        FieldRole::REQUIRED
            .into_iter()
            .filter(|role| !self.columns.contains_key(role))
            .collect()
    }

    /// Mapped columns that do not appear in `headers`.
    pub fn missing_columns<S: AsRef<str>>(&self, headers: &[S]) -> Vec<(FieldRole, String)> {
        self.columns
            .iter()
            .filter(|(_, column)| !headers.iter().any(|h| h.as_ref() == column.as_str()))
            .map(|(role, column)| (*role, column.clone()))
            .collect()
    }
}
