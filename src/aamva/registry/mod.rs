//! Jurisdiction and format version tables.
//!
//! A [`SchemaRegistry`] is built once and never mutated afterwards. It can be
//! shared freely between threads.
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Write as _},
    io,
};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

mod macros;
pub(crate) use macros::*;

mod versions;

/// Format version used for jurisdictions without an explicit override.
pub const DEFAULT_VERSION: &str = "10";

/// Code of the address jurisdiction field.
pub const JURISDICTION_CODE: &str = "DAJ";

/// Code of the address postal code field.
pub const POSTAL_CODE: &str = "DAK";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown jurisdiction `{0}`")]
    UnknownJurisdiction(String),

    #[error("unsupported format version `{0}`")]
    UnsupportedVersion(String),
}

/// Jurisdiction known to the registry but excluded from encoding.
#[derive(Debug, thiserror::Error)]
#[error("jurisdiction `{code}` ({name}) is not supported for encoding")]
pub struct UnsupportedJurisdiction {
    pub code: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("invalid issuer identification number `{iin}` for `{code}`")]
    InvalidIin { code: String, iin: u32 },

    #[error("issuer identification number {iin:06} is shared by `{first}` and `{second}`")]
    DuplicateIin {
        iin: u32,
        first: String,
        second: String,
    },

    #[error("duplicate jurisdiction `{0}`")]
    DuplicateJurisdiction(String),

    #[error("unknown default version `{0}`")]
    UnknownDefaultVersion(String),

    #[error("jurisdiction `{code}` defaults to unknown version `{version}`")]
    UnknownVersion { code: String, version: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Support {
    Supported,
    Unsupported,
}

/// Issuing authority of a jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRecord {
    /// Two-letter jurisdiction code.
    pub code: String,

    /// Issuer identification number.
    pub iin: u32,

    pub name: String,

    /// Format version override. `None` means the registry default.
    pub version: Option<String>,

    #[serde(rename = "status")]
    pub support: Support,
}

impl IssuerRecord {
    pub fn is_supported(&self) -> bool {
        self.support == Support::Supported
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Date,
    Zip,
    Char,
}

/// Layout of the 8 digits of a date field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "MMDDYYYY")]
    MonthDayYear,

    #[serde(rename = "YYYYMMDD")]
    YearMonthDay,
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonthDayYear => f.write_str("MMDDYYYY"),
            Self::YearMonthDay => f.write_str("YYYYMMDD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EnumOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Value set of a declared field.
#[derive(Debug, Clone, Copy)]
pub enum Choices {
    /// Use the registry-level set for the field code, if any.
    Inherit,

    /// Only these values, regardless of the registry-level set.
    Only(&'static [EnumOption]),
}

pub(crate) struct FieldDeclaration {
    code: &'static str,
    label: &'static str,
    ty: FieldType,
    required: bool,
    max_len: Option<usize>,
    choices: Choices,
}

pub(crate) struct VersionDeclaration {
    key: &'static str,
    name: &'static str,
    date_format: DateFormat,
    fields: &'static [FieldDeclaration],
}

/// Schema of one data element within a format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub code: &'static str,
    pub label: &'static str,

    #[serde(rename = "type")]
    pub ty: FieldType,

    pub required: bool,
    pub max_len: Option<usize>,

    /// Allowed values, after field-level overrides are applied.
    pub options: Option<&'static [EnumOption]>,

    pub date_format: DateFormat,
}

impl FieldSchema {
    pub fn option(&self, value: &str) -> Option<&'static EnumOption> {
        self.options?.iter().find(|o| o.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatVersion {
    pub key: &'static str,
    pub name: &'static str,
    pub fields: Vec<FieldSchema>,
}

impl FormatVersion {
    /// Version number written in the file header.
    pub fn number(&self) -> u8 {
        self.key.parse().unwrap_or_default()
    }

    pub fn field(&self, code: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.code == code)
    }

    pub fn mandatory_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Human readable summary, one line per field.
    pub fn describe(&self) -> String {
        let mut result = format!("AAMVA {} - {}\n", self.key, self.name);

        for f in &self.fields {
            let marker = if f.required { " (required)" } else { "" };
            let _ = writeln!(result, "{}: {}{}", f.code, f.label, marker);
        }

        result
    }
}

pub struct SchemaRegistry {
    issuers: BTreeMap<String, IssuerRecord>,
    by_iin: HashMap<u32, String>,
    versions: BTreeMap<&'static str, FormatVersion>,
    enumerations: HashMap<&'static str, &'static [EnumOption]>,
    default_version: &'static str,
}

lazy_static! {
    static ref STANDARD: SchemaRegistry = {
        let issuers = SchemaRegistry::load_issuers(include_str!("jurisdictions.csv").as_bytes())
            .expect("invalid jurisdiction table");
        SchemaRegistry::new(issuers, DEFAULT_VERSION).expect("invalid jurisdiction table")
    };
}

impl SchemaRegistry {
    /// Registry built from the bundled jurisdiction and version tables.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Reads issuer records from CSV with a
    /// `code,iin,name,version,status` header.
    pub fn load_issuers(reader: impl io::Read) -> Result<Vec<IssuerRecord>, RegistryError> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut result = Vec::new();

        for record in reader.deserialize() {
            result.push(record?);
        }

        Ok(result)
    }

    pub fn new(
        issuers: Vec<IssuerRecord>,
        default_version: &'static str,
    ) -> Result<Self, RegistryError> {
        let enumerations: HashMap<_, _> = versions::ENUMERATIONS.iter().copied().collect();

        let versions: BTreeMap<_, _> = versions::VERSIONS
            .iter()
            .map(|v| (v.key, resolve_version(v, &enumerations)))
            .collect();

        if !versions.contains_key(default_version) {
            return Err(RegistryError::UnknownDefaultVersion(
                default_version.to_owned(),
            ));
        }

        let mut by_code = BTreeMap::new();
        let mut by_iin = HashMap::new();

        for issuer in issuers {
            if issuer.iin > 999_999 {
                return Err(RegistryError::InvalidIin {
                    code: issuer.code,
                    iin: issuer.iin,
                });
            }

            if let Some(v) = &issuer.version {
                if !versions.contains_key(v.as_str()) {
                    return Err(RegistryError::UnknownVersion {
                        code: issuer.code,
                        version: v.clone(),
                    });
                }
            }

            if let Some(first) = by_iin.insert(issuer.iin, issuer.code.clone()) {
                return Err(RegistryError::DuplicateIin {
                    iin: issuer.iin,
                    first,
                    second: issuer.code,
                });
            }

            let code = issuer.code.clone();
            if by_code.insert(code.clone(), issuer).is_some() {
                return Err(RegistryError::DuplicateJurisdiction(code));
            }
        }

        Ok(Self {
            issuers: by_code,
            by_iin,
            versions,
            enumerations,
            default_version,
        })
    }

    pub fn default_version(&self) -> &'static str {
        self.default_version
    }

    /// Issuer of the given jurisdiction, supported or not.
    pub fn issuer_for(&self, jurisdiction: &str) -> Result<&IssuerRecord, SchemaError> {
        self.issuers
            .get(jurisdiction)
            .ok_or_else(|| SchemaError::UnknownJurisdiction(jurisdiction.to_owned()))
    }

    pub fn issuer_by_iin(&self, iin: u32) -> Option<&IssuerRecord> {
        self.by_iin.get(&iin).and_then(|code| self.issuers.get(code))
    }

    /// Format version key used by the jurisdiction.
    pub fn version_for(&self, jurisdiction: &str) -> Result<&str, SchemaError> {
        let issuer = self.issuer_for(jurisdiction)?;
        Ok(issuer.version.as_deref().unwrap_or(self.default_version))
    }

    pub fn version(&self, key: &str) -> Option<&FormatVersion> {
        self.versions.get(key)
    }

    /// Ordered fields of a version, empty if the version is unknown.
    pub fn fields_for(&self, key: &str) -> &[FieldSchema] {
        self.version(key).map(|v| v.fields.as_slice()).unwrap_or(&[])
    }

    pub fn mandatory_fields_for(&self, key: &str) -> Vec<&FieldSchema> {
        self.fields_for(key).iter().filter(|f| f.required).collect()
    }

    /// Registry-level value set of a field code.
    pub fn enumeration(&self, code: &str) -> Option<&'static [EnumOption]> {
        self.enumerations.get(code).copied()
    }

    /// Issuer records sorted by jurisdiction code.
    pub fn jurisdictions(&self) -> impl Iterator<Item = &IssuerRecord> {
        self.issuers.values()
    }

    /// Format versions sorted by key.
    pub fn versions(&self) -> impl Iterator<Item = &FormatVersion> {
        self.versions.values()
    }

    /// Label of a field code, looked up in the given version first and then
    /// in every other version.
    pub fn label_of(&self, version: &str, code: &str) -> Option<&'static str> {
        self.version(version)
            .and_then(|v| v.field(code))
            .or_else(|| self.versions().find_map(|v| v.field(code)))
            .map(|f| f.label)
    }
}

fn resolve_version(
    declaration: &VersionDeclaration,
    enumerations: &HashMap<&'static str, &'static [EnumOption]>,
) -> FormatVersion {
    FormatVersion {
        key: declaration.key,
        name: declaration.name,
        fields: declaration
            .fields
            .iter()
            .map(|f| FieldSchema {
                code: f.code,
                label: f.label,
                ty: f.ty,
                required: f.required,
                max_len: f.max_len,
                options: match f.choices {
                    Choices::Inherit => enumerations.get(f.code).copied(),
                    Choices::Only(options) => Some(options),
                },
                date_format: match f.ty {
                    FieldType::Date => declaration.date_format,
                    _ => DateFormat::default(),
                },
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn iins_are_pairwise_distinct() {
        let registry = SchemaRegistry::standard();
        let mut seen = HashSet::new();

        for issuer in registry.jurisdictions() {
            assert!(seen.insert(issuer.iin), "duplicate IIN {}", issuer.iin)
        }

        assert_eq!(seen.len(), 55)
    }

    #[test]
    fn states_and_dc_are_supported() {
        let registry = SchemaRegistry::standard();
        let supported: Vec<_> = registry
            .jurisdictions()
            .filter(|i| i.is_supported())
            .map(|i| i.code.as_str())
            .collect();

        assert_eq!(supported.len(), 51);
        assert!(supported.contains(&"DC"));
        assert_eq!(registry.issuer_for("NY").unwrap().iin, 636001);
        assert_ne!(
            registry.issuer_for("DC").unwrap().iin,
            registry.issuer_for("UT").unwrap().iin
        );
    }

    #[test]
    fn territories_are_unsupported() {
        let registry = SchemaRegistry::standard();

        for code in ["AS", "GU", "PR", "VI"] {
            assert!(!registry.issuer_for(code).unwrap().is_supported())
        }

        assert!(matches!(
            registry.issuer_for("ZZ"),
            Err(SchemaError::UnknownJurisdiction(_))
        ))
    }

    #[test]
    fn version_falls_back_to_default() {
        let registry = SchemaRegistry::standard();
        assert_eq!(registry.version_for("NY").unwrap(), DEFAULT_VERSION);
        assert_eq!(registry.version_for("IL").unwrap(), "09");
        assert!(registry.version_for("XX").is_err())
    }

    #[test]
    fn unknown_version_has_no_fields() {
        let registry = SchemaRegistry::standard();
        assert!(registry.fields_for("99").is_empty());
        assert!(registry.mandatory_fields_for("99").is_empty());
        assert!(!registry.fields_for("08").is_empty())
    }

    #[test]
    fn field_codes_are_well_formed() {
        for version in SchemaRegistry::standard().versions() {
            let mut codes = HashSet::new();

            for field in &version.fields {
                let bytes = field.code.as_bytes();
                assert_eq!(bytes.len(), 3);
                assert!(bytes[..2].iter().all(u8::is_ascii_uppercase));
                assert!(bytes[2].is_ascii_uppercase() || bytes[2].is_ascii_digit());
                assert!(codes.insert(field.code), "{} repeated", field.code)
            }
        }
    }

    #[test]
    fn field_options_override_registry_options() {
        let registry = SchemaRegistry::standard();
        let legacy = registry.version("01").unwrap().field("DBC").unwrap();
        let current = registry.version("08").unwrap().field("DBC").unwrap();

        assert!(legacy.option("M").is_some());
        assert!(legacy.option("1").is_none());
        assert!(current.option("1").is_some());
        assert!(current.option("M").is_none());
        assert_eq!(current.options, registry.enumeration("DBC"))
    }

    #[test]
    fn legacy_dates_are_year_first() {
        let registry = SchemaRegistry::standard();
        let dob = |v| registry.version(v).unwrap().field("DBB").unwrap().date_format;

        assert_eq!(dob("01"), DateFormat::YearMonthDay);
        assert_eq!(dob("09"), DateFormat::MonthDayYear)
    }

    #[test]
    fn describe_lists_every_field() {
        let registry = SchemaRegistry::standard();
        let version = registry.version("09").unwrap();
        let text = version.describe();

        assert!(text.contains("2009"));
        assert!(text.contains("DAA: Customer Full Name"));
        assert!(text.contains("DCS: Customer Family Name (required)"));
        assert_eq!(text.lines().count(), 1 + version.fields.len())
    }

    #[test]
    fn duplicate_iins_are_rejected() {
        let csv = "code,iin,name,version,status\n\
            AA,636001,A,,supported\n\
            BB,636001,B,,supported\n";
        let issuers = SchemaRegistry::load_issuers(csv.as_bytes()).unwrap();

        assert!(matches!(
            SchemaRegistry::new(issuers, DEFAULT_VERSION),
            Err(RegistryError::DuplicateIin { iin: 636001, .. })
        ))
    }
}
