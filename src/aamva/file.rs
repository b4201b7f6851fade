//! AAMVA DL/ID file layout: header, subfile designators and field-coded
//! subfiles.
//!
//! Subfiles are addressed only through the offset and length declared in
//! their designator.
use std::fmt;

use serde::{Deserialize, Serialize};

pub const COMPLIANCE_INDICATOR: u8 = b'@';

pub const DATA_ELEMENT_SEPARATOR: u8 = b'\n';

pub const RECORD_SEPARATOR: u8 = 0x1e;

pub const SEGMENT_TERMINATOR: u8 = b'\r';

pub const FILE_TYPE: [u8; 5] = *b"ANSI ";

const PREFIX: [u8; 9] = *b"@\n\x1e\rANSI ";

pub const HEADER_SIZE: usize = 9 + 6 + 2 + 2 + 2;

pub const SUBFILE_DESIGNATOR_SIZE: usize = 2 + 4 + 4;

/// Largest offset or length a designator can hold.
pub const MAX_DESIGNATOR_VALUE: usize = 9999;

/// Bytes shown as a string when they are printable ASCII.
#[derive(Clone, PartialEq, Eq)]
pub struct MaybeAscii(pub Vec<u8>);

impl MaybeAscii {
    fn new(bytes: &[u8]) -> Self {
        Self(bytes.to_owned())
    }
}

impl fmt::Display for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if self.0.is_ascii() => write!(f, "{s:?}"),
            _ => write!(f, "{:?}", self.0),
        }
    }
}

impl fmt::Debug for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed header at offset {offset}: expected {expected}, found {found}")]
    MalformedHeader {
        offset: usize,
        expected: &'static str,
        found: MaybeAscii,
    },

    #[error("truncated file: {needed} bytes needed, {available} available")]
    Truncated { needed: usize, available: usize },

    /// `index` is the subfile designator holding the field, `None` for the
    /// entry count in the header.
    #[error("invalid {field}{}: {found}", in_designator(.index))]
    InvalidDirectory {
        index: Option<usize>,
        field: &'static str,
        found: MaybeAscii,
    },

    #[error("subfile {index} ({offset}+{length}) is outside of the {available} bytes file")]
    SubfileOutOfBounds {
        index: usize,
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("subfile {index} at offset {offset}: expected type {expected}, found {found}")]
    SubfileTypeMismatch {
        index: usize,
        offset: usize,
        expected: MaybeAscii,
        found: MaybeAscii,
    },

    #[error("subfile {index} declares {declared} bytes but its terminator is at byte {actual:?}")]
    SubfileLengthMismatch {
        index: usize,
        declared: usize,
        actual: Option<usize>,
    },

    #[error("no supported subfile in directory")]
    NoSupportedSubfile,

    #[error("invalid field code {found} at offset {offset}")]
    InvalidFieldCode { offset: usize, found: MaybeAscii },

    #[error("field `{code}` is not valid UTF-8")]
    InvalidFieldValue { code: String },

    #[error("directory value {value} does not fit in 4 digits")]
    DirectoryOverflow { value: usize },

    #[error("subfile {index} declares {declared} bytes but {actual} were written")]
    DirectoryLengthMismatch {
        index: usize,
        declared: usize,
        actual: usize,
    },
}

fn in_designator(index: &Option<usize>) -> String {
    index
        .map(|index| format!(" in subfile designator {index}"))
        .unwrap_or_default()
}

/// Subfile types understood by the decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubfileType {
    /// Driver's license.
    #[default]
    #[serde(rename = "DL")]
    DriversLicense,

    /// Identification card.
    #[serde(rename = "ID")]
    IdentificationCard,
}

impl SubfileType {
    pub const LIST: [Self; 2] = [Self::DriversLicense, Self::IdentificationCard];

    pub fn from_tag(tag: &[u8; 2]) -> Option<Self> {
        match tag {
            b"DL" => Some(Self::DriversLicense),
            b"ID" => Some(Self::IdentificationCard),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static [u8; 2] {
        match self {
            Self::DriversLicense => b"DL",
            Self::IdentificationCard => b"ID",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriversLicense => "DL",
            Self::IdentificationCard => "ID",
        }
    }
}

impl fmt::Display for SubfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub issuer_id: u32,
    pub version: u8,
    pub jurisdiction_version: u8,
    pub entry_count: u8,
}

impl Header {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }

        expect_at(bytes, 0, &[COMPLIANCE_INDICATOR], "compliance indicator `@`")?;
        expect_at(bytes, 1, &PREFIX[1..4], "separator bytes LF RS CR")?;
        expect_at(bytes, 4, &FILE_TYPE, "file type `ANSI `")?;

        let header_digits = |offset: usize, len: usize, expected| {
            decode_digits(&bytes[offset..offset + len]).ok_or_else(|| {
                CodecError::MalformedHeader {
                    offset,
                    expected,
                    found: MaybeAscii::new(&bytes[offset..offset + len]),
                }
            })
        };

        let issuer_id = header_digits(9, 6, "6 digit issuer identification number")? as u32;
        let version = header_digits(15, 2, "2 digit version number")? as u8;
        let jurisdiction_version = header_digits(17, 2, "2 digit jurisdiction version")? as u8;

        let entry_count = match decode_digits(&bytes[19..21]) {
            Some(n) if n > 0 => n as u8,
            _ => {
                return Err(CodecError::InvalidDirectory {
                    index: None,
                    field: "entry count",
                    found: MaybeAscii::new(&bytes[19..21]),
                })
            }
        };

        Ok(Self {
            issuer_id,
            version,
            jurisdiction_version,
            entry_count,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend(PREFIX);
        out.extend(encode_digits::<6>(self.issuer_id as usize));
        out.extend(encode_digits::<2>(self.version as usize));
        out.extend(encode_digits::<2>(self.jurisdiction_version as usize));
        out.extend(encode_digits::<2>(self.entry_count as usize));
    }
}

fn expect_at(
    bytes: &[u8],
    offset: usize,
    expected_bytes: &[u8],
    expected: &'static str,
) -> Result<(), CodecError> {
    let found = &bytes[offset..offset + expected_bytes.len()];
    if found == expected_bytes {
        Ok(())
    } else {
        Err(CodecError::MalformedHeader {
            offset,
            expected,
            found: MaybeAscii::new(found),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubfileDesignator {
    pub subfile_type: [u8; 2],
    pub offset: usize,
    pub length: usize,
}

impl SubfileDesignator {
    /// Decodes the `SUBFILE_DESIGNATOR_SIZE` bytes of the `index`-th
    /// designator.
    pub fn decode(index: usize, bytes: &[u8]) -> Result<Self, CodecError> {
        let digits = |range: std::ops::Range<usize>, field| {
            decode_digits(&bytes[range.clone()]).ok_or_else(|| CodecError::InvalidDirectory {
                index: Some(index),
                field,
                found: MaybeAscii::new(&bytes[range]),
            })
        };

        Ok(Self {
            subfile_type: [bytes[0], bytes[1]],
            offset: digits(2..6, "offset")?,
            length: digits(6..10, "length")?,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        for value in [self.offset, self.length] {
            if value > MAX_DESIGNATOR_VALUE {
                return Err(CodecError::DirectoryOverflow { value });
            }
        }

        out.extend(self.subfile_type);
        out.extend(encode_digits::<4>(self.offset));
        out.extend(encode_digits::<4>(self.length));
        Ok(())
    }
}

/// Subfile content following its 2 byte type, terminator included.
pub struct Subfile {
    pub subfile_type: [u8; 2],
    pub data: Vec<u8>,
}

impl Subfile {
    pub fn new(subfile_type: [u8; 2], data: Vec<u8>) -> Self {
        Self { subfile_type, data }
    }

    /// Length declared in the designator.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        2 + self.data.len()
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend(self.subfile_type);
        out.extend(&self.data);
    }
}

/// Writes the `code value LF` entries of a field-coded subfile.
pub struct RecordWriter {
    data: Vec<u8>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Appends one data element. The offset reported for an invalid code is
    /// relative to the start of the subfile.
    pub fn push(&mut self, code: &str, value: &[u8]) -> Result<(), CodecError> {
        let field: [u8; 3] = match code.as_bytes().try_into() {
            Ok(field) if is_field_code(&field) => field,
            _ => {
                return Err(CodecError::InvalidFieldCode {
                    offset: 2 + self.data.len(),
                    found: MaybeAscii::new(code.as_bytes()),
                })
            }
        };

        self.data.extend(field);
        self.data.extend(value);
        self.data.push(DATA_ELEMENT_SEPARATOR);
        Ok(())
    }

    pub fn finish(mut self, subfile_type: [u8; 2]) -> Subfile {
        self.data.push(SEGMENT_TERMINATOR);
        Subfile::new(subfile_type, self.data)
    }
}

impl Default for RecordWriter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FileBuilder {
    header: Header,
    subfiles: Vec<Subfile>,
}

impl FileBuilder {
    pub fn new(issuer_id: u32, version: u8, jurisdiction_version: u8) -> Self {
        Self {
            header: Header {
                issuer_id,
                version,
                jurisdiction_version,
                entry_count: 0,
            },
            subfiles: Vec::new(),
        }
    }

    pub fn push(&mut self, subfile: Subfile) {
        self.subfiles.push(subfile);
    }

    /// Assembles the file, then checks every declared length against the
    /// bytes actually written.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, CodecError> {
        self.header.entry_count = self.subfiles.len() as u8;

        let mut designators = Vec::with_capacity(self.subfiles.len());
        let mut offset = HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * self.subfiles.len();
        for subfile in &self.subfiles {
            let length = subfile.len();
            designators.push(SubfileDesignator {
                subfile_type: subfile.subfile_type,
                offset,
                length,
            });
            offset += length;
        }

        let mut out = Vec::with_capacity(offset);
        self.header.encode(&mut out);

        for designator in &designators {
            designator.encode(&mut out)?;
        }

        let mut starts = Vec::with_capacity(self.subfiles.len());
        for subfile in &self.subfiles {
            starts.push(out.len());
            subfile.write(&mut out);
        }

        for (index, designator) in designators.iter().enumerate() {
            let end = starts.get(index + 1).copied().unwrap_or(out.len());
            let actual = end - starts[index];
            if starts[index] != designator.offset || actual != designator.length {
                return Err(CodecError::DirectoryLengthMismatch {
                    index,
                    declared: designator.length,
                    actual,
                });
            }
        }

        Ok(out)
    }
}

/// Parsed header and directory over borrowed file bytes.
pub struct File<'a> {
    bytes: &'a [u8],
    header: Header,
    designators: Vec<SubfileDesignator>,
}

impl<'a> File<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, CodecError> {
        let header = Header::decode(bytes)?;

        let entry_count = header.entry_count as usize;
        let directory_end = HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * entry_count;
        if bytes.len() < directory_end {
            return Err(CodecError::Truncated {
                needed: directory_end,
                available: bytes.len(),
            });
        }

        let designators = bytes[HEADER_SIZE..directory_end]
            .chunks_exact(SUBFILE_DESIGNATOR_SIZE)
            .enumerate()
            .map(|(i, chunk)| SubfileDesignator::decode(i, chunk))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bytes,
            header,
            designators,
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn designators(&self) -> &[SubfileDesignator] {
        &self.designators
    }

    pub fn index_of(&self, subfile_type: &[u8; 2]) -> Option<usize> {
        self.designators
            .iter()
            .position(|d| d.subfile_type == *subfile_type)
    }

    /// Subfile at the given directory index.
    ///
    /// The declared offset must point at the declared type, and the declared
    /// length must end exactly on the only segment terminator of the subfile.
    ///
    /// Panics if `index` is not a directory index.
    pub fn subfile(&self, index: usize) -> Result<SubfileView<'a>, CodecError> {
        let d = self.designators[index];
        let end = d.offset.checked_add(d.length).unwrap_or(usize::MAX);

        if d.offset < HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * self.designators.len()
            || d.length < 3
            || end > self.bytes.len()
        {
            return Err(CodecError::SubfileOutOfBounds {
                index,
                offset: d.offset,
                length: d.length,
                available: self.bytes.len(),
            });
        }

        let slice = &self.bytes[d.offset..end];
        if slice[..2] != d.subfile_type {
            return Err(CodecError::SubfileTypeMismatch {
                index,
                offset: d.offset,
                expected: MaybeAscii::new(&d.subfile_type),
                found: MaybeAscii::new(&slice[..2]),
            });
        }

        let terminator = slice.iter().position(|b| *b == SEGMENT_TERMINATOR);
        if terminator != Some(d.length - 1) {
            return Err(CodecError::SubfileLengthMismatch {
                index,
                declared: d.length,
                actual: terminator,
            });
        }

        Ok(SubfileView {
            subfile_type: d.subfile_type,
            offset: d.offset,
            body: &slice[2..d.length - 1],
        })
    }
}

/// Field-coded subfile borrowed from a [`File`].
pub struct SubfileView<'a> {
    pub subfile_type: [u8; 2],
    offset: usize,
    body: &'a [u8],
}

impl<'a> SubfileView<'a> {
    /// Bytes between the type and the terminator.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Data elements of the subfile, in file order.
    ///
    /// Entries shorter than a field code are skipped.
    pub fn entries(&self) -> Result<Vec<RecordEntry<'a>>, CodecError> {
        let mut result = Vec::new();
        let mut offset = self.offset + 2;

        for entry in self.body.split(|b| *b == DATA_ELEMENT_SEPARATOR) {
            let entry_offset = offset;
            offset += entry.len() + 1;

            if entry.len() < 3 {
                continue;
            }

            let field: [u8; 3] = [entry[0], entry[1], entry[2]];
            if !is_field_code(&field) {
                return Err(CodecError::InvalidFieldCode {
                    offset: entry_offset,
                    found: MaybeAscii::new(&field),
                });
            }

            result.push(RecordEntry {
                field,
                value: &entry[3..],
            });
        }

        Ok(result)
    }
}

/// One data element: a 3 letter field code and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEntry<'a> {
    pub field: [u8; 3],
    pub value: &'a [u8],
}

impl RecordEntry<'_> {
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.field).unwrap_or_default()
    }
}

/// `[A-Z]{2}[A-Z0-9]`
pub fn is_field_code(code: &[u8; 3]) -> bool {
    code[0].is_ascii_uppercase()
        && code[1].is_ascii_uppercase()
        && (code[2].is_ascii_uppercase() || code[2].is_ascii_digit())
}

fn decode_digits(digits: &[u8]) -> Option<usize> {
    digits.iter().try_fold(0usize, |acc, d| {
        if d.is_ascii_digit() {
            Some(acc * 10 + (d - b'0') as usize)
        } else {
            None
        }
    })
}

fn encode_digits<const N: usize>(mut value: usize) -> [u8; N] {
    let mut result = [b'0'; N];
    for d in result.iter_mut().rev() {
        *d = b'0' + (value % 10) as u8;
        value /= 10;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut records = RecordWriter::new();
        records.push("DAQ", b"F987654321").unwrap();
        records.push("DCS", b"SMITH").unwrap();
        records.push("DAC", b"JOHN").unwrap();

        let mut builder = FileBuilder::new(636001, 10, 0);
        builder.push(records.finish(*b"DL"));
        builder.into_bytes().unwrap()
    }

    #[test]
    fn digits() {
        assert_eq!(encode_digits::<6>(636001), *b"636001");
        assert_eq!(encode_digits::<4>(41), *b"0041");
        assert_eq!(encode_digits::<2>(8), *b"08");
        assert_eq!(decode_digits(b"0041"), Some(41));
        assert_eq!(decode_digits(b"00 1"), None);
    }

    #[test]
    fn header_layout() {
        let bytes = sample();
        assert_eq!(&bytes[..21], b"@\n\x1e\rANSI 636001100001");
        assert_eq!(&bytes[21..31], b"DL00310034");
        assert_eq!(bytes.len(), 31 + 34);
        assert_eq!(&bytes[31..33], b"DL");
        assert_eq!(*bytes.last().unwrap(), SEGMENT_TERMINATOR);
    }

    #[test]
    fn read_back() {
        let bytes = sample();
        let file = File::new(&bytes).unwrap();

        assert_eq!(
            file.header(),
            Header {
                issuer_id: 636001,
                version: 10,
                jurisdiction_version: 0,
                entry_count: 1
            }
        );

        let subfile = file.subfile(file.index_of(b"DL").unwrap()).unwrap();
        let entries = subfile.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].code(), "DAQ");
        assert_eq!(entries[0].value, b"F987654321");
        assert_eq!(entries[2].value, b"JOHN");
    }

    #[test]
    fn terminator_replacing_last_separator() {
        // Last entry closed by the terminator instead of a separator.
        let body = b"DLDCSSMITH\nDACJOHN\r";
        let mut bytes = b"@\n\x1e\rANSI 636001100001DL0031".to_vec();
        bytes.extend(encode_digits::<4>(body.len()));
        bytes.extend(body);

        let file = File::new(&bytes).unwrap();
        let entries = file.subfile(0).unwrap().entries().unwrap();
        assert_eq!(entries[1].code(), "DAC");
        assert_eq!(entries[1].value, b"JOHN");
    }

    #[test]
    fn malformed_header() {
        let mut bytes = sample();
        bytes[4..9].copy_from_slice(b"AAMVA");
        assert!(matches!(
            File::new(&bytes),
            Err(CodecError::MalformedHeader { offset: 4, .. })
        ));

        let mut bytes = sample();
        bytes[0] = b'#';
        assert!(matches!(
            File::new(&bytes),
            Err(CodecError::MalformedHeader { offset: 0, .. })
        ));

        let mut bytes = sample();
        bytes[2] = b'\n';
        assert!(matches!(
            File::new(&bytes),
            Err(CodecError::MalformedHeader { offset: 1, .. })
        ));
    }

    #[test]
    fn invalid_directory() {
        let mut bytes = sample();
        bytes[19..21].copy_from_slice(b"00");
        let err = File::new(&bytes).err().unwrap();
        assert!(matches!(
            err,
            CodecError::InvalidDirectory {
                index: None,
                field: "entry count",
                ..
            }
        ));
        assert_eq!(err.to_string(), r#"invalid entry count: "00""#);

        let mut bytes = sample();
        bytes[23] = b'x';
        assert!(matches!(
            File::new(&bytes),
            Err(CodecError::InvalidDirectory {
                index: Some(0),
                field: "offset",
                ..
            })
        ));
    }

    #[test]
    fn length_mismatch() {
        for length in [b"0033", b"0035", b"0040"] {
            let mut bytes = sample();
            bytes[27..31].copy_from_slice(length);
            let file = File::new(&bytes).unwrap();
            assert!(file.subfile(0).is_err())
        }

        let mut bytes = sample();
        bytes[27..31].copy_from_slice(b"0030");
        let file = File::new(&bytes).unwrap();
        assert!(matches!(
            file.subfile(0),
            Err(CodecError::SubfileLengthMismatch {
                declared: 30,
                actual: None,
                ..
            })
        ));
    }

    #[test]
    fn offset_must_point_at_type() {
        let mut bytes = sample();
        bytes[23..27].copy_from_slice(b"0032");
        bytes[27..31].copy_from_slice(b"0033");
        let file = File::new(&bytes).unwrap();
        assert!(matches!(
            file.subfile(0),
            Err(CodecError::SubfileTypeMismatch { offset: 32, .. })
        ));
    }

    #[test]
    fn directory_overflow() {
        let mut records = RecordWriter::new();
        records.push("ZZA", &vec![b'A'; 10_000]).unwrap();

        let mut builder = FileBuilder::new(636001, 10, 0);
        builder.push(records.finish(*b"ZZ"));
        assert!(matches!(
            builder.into_bytes(),
            Err(CodecError::DirectoryOverflow { .. })
        ))
    }

    #[test]
    fn bad_field_code() {
        let body = b"DLdcsSMITH\n\r";
        let mut bytes = b"@\n\x1e\rANSI 636001100001DL0031".to_vec();
        bytes.extend(encode_digits::<4>(body.len()));
        bytes.extend(body);

        let file = File::new(&bytes).unwrap();
        assert!(matches!(
            file.subfile(0).unwrap().entries(),
            Err(CodecError::InvalidFieldCode { offset: 33, .. })
        ))
    }

    #[test]
    fn writer_rejects_bad_codes() {
        let mut records = RecordWriter::new();
        records.push("DAQ", b"1").unwrap();

        for code in ["daq", "DA", "DAQX", "D1Q"] {
            assert!(matches!(
                records.push(code, b"X"),
                Err(CodecError::InvalidFieldCode { offset: 7, .. })
            ))
        }
    }
}
