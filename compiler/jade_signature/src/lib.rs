//! Generic type signatures for the Jade debugger.
//!
//! The class-file format records generic types as compact signature strings
//! (`Ljava/util/List<Ljava/lang/String;>;`). This crate decodes them into
//! [`GenType`] trees, and maps the type arguments of a live object onto the
//! class that declares a field, so that the debugger can show
//! `List<String>` instead of `List`.
//!
//! ```
//! use jade_signature::{parse_signature, GenType};
//!
//! let decoded = parse_signature("Ljava/util/List<Ljava/lang/String;>;", None, None);
//! assert!(!decoded.degraded);
//! assert_eq!(decoded.value.to_string(), "java.util.List<java.lang.String>");
//! ```
//!
//! Class references are kept as deferred [`Reflective`] values and only
//! looked up through [`ClassLookup`] when a mapping needs the class's own
//! signature. Nothing here fails outright: anomalies are logged and the
//! result is marked [`Decoded::degraded`].

mod decode;
mod lookup;
mod resolve;
mod types;

pub use decode::{
    parse_class_signature, parse_signature, try_parse_signature, ClassSignature, Decoded,
    SignatureError, MAX_NESTING,
};
pub use lookup::{ClassDef, ClassHandle, ClassLookup, ClassTable, Reflective};
pub use resolve::{add_default_param_bases, field_type, super_types, type_params, FieldInfo, ObjectInfo};
pub use types::{ClassType, GenType, PrimitiveKind, TypeParamDecl, TypeParamMap, Wildcard};
