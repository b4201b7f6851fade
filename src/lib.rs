//! This library encodes and decodes [AAMVA DL/ID card data][aamva] and
//! renders it as a PDF417-style two-dimensional symbol.
//!
//! [aamva]: <https://www.aamva.org/identity/card-design-standard>
//!
//! The `demos` folder contains an example encoding a sample card and printing
//! the resulting symbol.
pub mod aamva;
pub mod pdf417;

pub use aamva::{
    decode,
    file::{CodecError, SubfileType},
    registry::{SchemaError, SchemaRegistry, UnsupportedJurisdiction},
    DecodedFile, EncodeError, EncodeRequest, Encoder, EncoderConfig, FieldValueMap,
    ValidationError,
};
pub use pdf417::{EcLevel, SymbolError, SymbolMatrix, SymbolOptions};
