pub mod error;
pub mod ffi;
pub mod formula;
pub mod locale;
pub mod options;
pub mod slot;

uniffi::setup_scaffolding!();

pub use error::CalcError;
pub use formula::{
    calculate, field_references, validate, Calculation, Engine, FieldReference, FieldSource,
    FieldValue, FunctionInfo, FunctionRegistry, FunctionSpec,
};
pub use locale::{format_value, normalize, parse_number};
pub use options::{EngineOptions, FormatOptions, MAX_DECIMAL_PLACES, NATURAL_PRECISION};
pub use slot::{Publish, ResultSlot};
