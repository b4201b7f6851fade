//! AAMVA DL/ID card data.
//!
//! [`Encoder`] turns a jurisdiction, a format version and a set of field
//! values into the bytes of an AAMVA file, optionally rendered as a PDF417
//! symbol. [`decode`] parses such bytes back into field values.
use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::pdf417::{self, SymbolError, SymbolMatrix, SymbolOptions};

pub mod file;
pub mod registry;
pub mod validate;

use file::{CodecError, File, FileBuilder, RecordWriter, SubfileType};
use registry::{
    FieldSchema, FormatVersion, SchemaError, SchemaRegistry, UnsupportedJurisdiction,
    JURISDICTION_CODE, POSTAL_CODE,
};
use validate::InvalidReason;

/// Width of the postal code once padded.
pub const POSTAL_CODE_WIDTH: usize = 11;

/// Field values by field code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValueMap(BTreeMap<String, String>);

impl FieldValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(code.into(), value.into())
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn remove(&mut self, code: &str) -> Option<String> {
        self.0.remove(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValueMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldValueMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// What to do with field codes that are not part of the format version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Leave them out of the file.
    #[default]
    Ignore,

    /// Fail with [`ValidationError::UnknownFields`].
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub unknown_fields: UnknownFieldPolicy,

    /// Jurisdiction-specific version written in the header.
    pub jurisdiction_version: u8,

    pub subfile_type: SubfileType,

    pub symbol: SymbolOptions,
}

/// Encoding input as imported from JSON, field codes at the top level:
///
/// ```json
/// { "state": "NY", "version": "09", "DCS": "VERA", "DAC": "SEAN" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeRequest {
    #[serde(alias = "state")]
    pub jurisdiction: String,

    /// Format version. Defaults to the version used by the jurisdiction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub fields: FieldValueMap,
}

/// Field code and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRef {
    pub code: &'static str,
    pub label: &'static str,
}

impl From<&FieldSchema> for FieldRef {
    fn from(value: &FieldSchema) -> Self {
        Self {
            code: value.code,
            label: value.label,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    pub code: &'static str,
    pub label: &'static str,

    /// Sanitized value.
    pub value: String,

    pub reason: InvalidReason,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) `{}`: {}",
            self.code, self.label, self.value, self.reason
        )
    }
}

struct List<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for List<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            item.fmt(f)?;
        }

        Ok(())
    }
}

/// Every offending field is listed, not only the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing mandatory fields: {}", List(.0))]
    MissingMandatoryFields(Vec<FieldRef>),

    #[error("invalid field values: {}", List(.0))]
    InvalidFieldValues(Vec<InvalidField>),

    #[error("unknown fields: {}", List(.0))]
    UnknownFields(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    UnsupportedJurisdiction(#[from] UnsupportedJurisdiction),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

/// AAMVA file encoder.
pub struct Encoder<'r> {
    registry: &'r SchemaRegistry,
    config: EncoderConfig,
}

impl Encoder<'static> {
    /// Encoder over the bundled registry with the default configuration.
    pub fn standard() -> Self {
        Self::new(SchemaRegistry::standard(), EncoderConfig::default())
    }
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r SchemaRegistry, config: EncoderConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encodes the field values of a jurisdiction's card into an AAMVA file.
    ///
    /// Values are sanitized first. The jurisdiction code field is always set
    /// to `jurisdiction`.
    pub fn encode(
        &self,
        jurisdiction: &str,
        version: &str,
        fields: &FieldValueMap,
    ) -> Result<Vec<u8>, EncodeError> {
        let issuer = self.registry.issuer_for(jurisdiction)?;
        if !issuer.is_supported() {
            return Err(UnsupportedJurisdiction {
                code: issuer.code.clone(),
                name: issuer.name.clone(),
            }
            .into());
        }

        let format = self
            .registry
            .version(version)
            .ok_or_else(|| SchemaError::UnsupportedVersion(version.to_owned()))?;

        let values = self.prepare(jurisdiction, format, fields)?;

        let mut records = RecordWriter::new();
        for (schema, value) in &values {
            if value.is_empty() {
                continue;
            }

            if schema.code == POSTAL_CODE {
                records.push(schema.code, pad_postal_code(value).as_bytes())?;
            } else {
                records.push(schema.code, value.as_bytes())?;
            }
        }

        let mut builder = FileBuilder::new(
            issuer.iin,
            format.number(),
            self.config.jurisdiction_version,
        );
        builder.push(records.finish(*self.config.subfile_type.tag()));
        let bytes = builder.into_bytes()?;

        tracing::debug!(
            jurisdiction,
            version = format.key,
            fields = values.iter().filter(|(_, v)| !v.is_empty()).count(),
            bytes = bytes.len(),
            "encoded AAMVA file"
        );

        Ok(bytes)
    }

    /// Encodes a request, using the jurisdiction's format version when the
    /// request does not name one.
    pub fn encode_request(&self, request: &EncodeRequest) -> Result<Vec<u8>, EncodeError> {
        let version = match &request.version {
            Some(version) => version.as_str(),
            None => self.registry.version_for(&request.jurisdiction)?,
        };

        self.encode(&request.jurisdiction, version, &request.fields)
    }

    /// Encodes the file and renders it as a symbol.
    pub fn encode_symbol(
        &self,
        jurisdiction: &str,
        version: &str,
        fields: &FieldValueMap,
    ) -> Result<SymbolMatrix, EncodeError> {
        let bytes = self.encode(jurisdiction, version, fields)?;
        Ok(pdf417::encode(&bytes, &self.config.symbol)?)
    }

    /// Sanitized value of every field of the version, in declaration order.
    /// Absent fields have an empty value.
    fn prepare<'v>(
        &self,
        jurisdiction: &str,
        format: &'v FormatVersion,
        fields: &FieldValueMap,
    ) -> Result<Vec<(&'v FieldSchema, String)>, ValidationError> {
        let unknown: Vec<String> = fields
            .codes()
            .filter(|code| format.field(code).is_none())
            .map(ToOwned::to_owned)
            .collect();

        if !unknown.is_empty() {
            match self.config.unknown_fields {
                UnknownFieldPolicy::Reject => return Err(ValidationError::UnknownFields(unknown)),
                UnknownFieldPolicy::Ignore => {
                    tracing::warn!(version = format.key, ?unknown, "ignoring unknown fields")
                }
            }
        }

        let values: Vec<_> = format
            .fields
            .iter()
            .map(|schema| {
                let raw = fields.get(schema.code).unwrap_or_default();
                let value = if schema.code == JURISDICTION_CODE {
                    if !raw.is_empty() && raw != jurisdiction {
                        tracing::warn!(
                            given = raw,
                            jurisdiction,
                            "overriding jurisdiction code field"
                        );
                    }
                    jurisdiction.to_owned()
                } else {
                    validate::sanitize(schema.ty, raw)
                };

                (schema, value)
            })
            .collect();

        let missing: Vec<FieldRef> = values
            .iter()
            .filter(|(schema, value)| schema.required && value.is_empty())
            .map(|(schema, _)| FieldRef::from(*schema))
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingMandatoryFields(missing));
        }

        let invalid: Vec<InvalidField> = values
            .iter()
            .filter_map(|(schema, value)| {
                let raw = fields.get(schema.code).unwrap_or_default();
                let raw_len = raw.chars().count();

                // Limits apply to what the caller supplied, not to the sanitized form.
                let too_long = match schema.max_len {
                    Some(max) if schema.code != JURISDICTION_CODE && raw_len > max => {
                        Err(InvalidReason::TooLong { max, len: raw_len })
                    }
                    _ => Ok(()),
                };

                too_long
                    .and_then(|()| validate::check(schema, value))
                    .err()
                    .map(|reason| InvalidField {
                        code: schema.code,
                        label: schema.label,
                        value: value.clone(),
                        reason,
                    })
            })
            .collect();

        if !invalid.is_empty() {
            return Err(ValidationError::InvalidFieldValues(invalid));
        }

        Ok(values)
    }
}

/// Removes the ZIP+4 hyphen and pads with spaces to the fixed field width.
pub fn pad_postal_code(value: &str) -> String {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    format!("{digits:<POSTAL_CODE_WIDTH$}")
}

/// Reverse of [`pad_postal_code`]: trailing spaces are removed and a 9 digit
/// ZIP+4 gets its hyphen back.
pub fn unpad_postal_code(value: &str) -> String {
    let value = value.trim_end_matches(' ');
    if value.len() == 9 && value.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}", &value[..5], &value[5..])
    } else {
        value.to_owned()
    }
}

/// Content of a decoded AAMVA file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFile {
    pub issuer_id: u32,

    /// Two digit format version, as found in the header.
    pub version: String,

    pub jurisdiction_version: u8,

    /// Jurisdiction of the issuer, if the registry knows its IIN.
    pub jurisdiction: Option<String>,

    pub subfile_type: SubfileType,

    pub fields: FieldValueMap,
}

impl DecodedFile {
    /// Six digit issuer identification number.
    pub fn iin(&self) -> String {
        format!("{:06}", self.issuer_id)
    }

    pub fn format_version<'a>(&self, registry: &'a SchemaRegistry) -> Option<&'a FormatVersion> {
        registry.version(&self.version)
    }

    /// `(code, label, value)` of every field. Codes the registry does not
    /// know are labelled `Unknown`.
    pub fn labelled(&self, registry: &SchemaRegistry) -> Vec<(&str, &'static str, &str)> {
        self.fields
            .iter()
            .map(|(code, value)| {
                let label = registry.label_of(&self.version, code).unwrap_or("Unknown");
                (code, label, value)
            })
            .collect()
    }
}

/// Decodes the first driver's license or identification card subfile of an
/// AAMVA file.
///
/// The subfile is located using the directory only. Postal code padding is
/// removed, see [`unpad_postal_code`].
pub fn decode(registry: &SchemaRegistry, bytes: &[u8]) -> Result<DecodedFile, CodecError> {
    let file = File::new(bytes)?;
    let header = file.header();

    let (index, subfile_type) = file
        .designators()
        .iter()
        .enumerate()
        .find_map(|(i, d)| SubfileType::from_tag(&d.subfile_type).map(|t| (i, t)))
        .ok_or(CodecError::NoSupportedSubfile)?;

    let subfile = file.subfile(index)?;

    let mut fields = FieldValueMap::new();
    for entry in subfile.entries()? {
        let code = entry.code();
        let value =
            std::str::from_utf8(entry.value).map_err(|_| CodecError::InvalidFieldValue {
                code: code.to_owned(),
            })?;

        if code == POSTAL_CODE {
            fields.insert(code, unpad_postal_code(value));
        } else {
            fields.insert(code, value);
        }
    }

    let jurisdiction = registry
        .issuer_by_iin(header.issuer_id)
        .map(|issuer| issuer.code.clone());

    tracing::debug!(
        iin = header.issuer_id,
        version = header.version,
        ?jurisdiction,
        %subfile_type,
        fields = fields.len(),
        "decoded AAMVA file"
    );

    Ok(DecodedFile {
        issuer_id: header.issuer_id,
        version: format!("{:02}", header.version),
        jurisdiction_version: header.jurisdiction_version,
        jurisdiction,
        subfile_type,
        fields,
    })
}
