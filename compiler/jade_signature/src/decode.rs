//! Generic signature decoding.
//!
//! Grammar, as written by the class-file format:
//!
//! ```text
//! type      = '*' | '+' type | '-' type | '[' type | 'T' ident ';'
//!           | 'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 'V'
//!           | 'L' ident args? ('.' ident args?)* ';'
//! args      = '<' type+ '>'
//! class-sig = ('<' (ident ':' type? (':' type)*)+ '>')? ('L' ...)+
//! ```
//!
//! Decoding is a single pass over the bytes. Class names are recorded as
//! deferred [`Reflective`] references scoped to the class the signature was
//! read from. Types nested deeper than [`MAX_NESTING`] are rejected.

use jade_stack::ensure_sufficient_stack;
use thiserror::Error;

use crate::lookup::{ClassHandle, Reflective};
use crate::types::{ClassType, GenType, PrimitiveKind, TypeParamDecl, TypeParamMap, Wildcard};

/// Why a signature could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature ends early at byte {at}")]
    UnexpectedEnd { at: usize },
    #[error("unexpected `{found}` at byte {at}, expected {expected}")]
    Unexpected {
        found: char,
        at: usize,
        expected: &'static str,
    },
    #[error("empty name at byte {at}")]
    EmptyName { at: usize },
    #[error("unexpected input after the signature at byte {at}")]
    Trailing { at: usize },
    #[error("types nested more than {max} deep at byte {at}", max = MAX_NESTING)]
    TooDeep { at: usize },
}

/// Deepest accepted nesting of arrays, wildcards and type arguments.
pub const MAX_NESTING: usize = 1024;

/// A best-effort result.
///
/// `degraded` is set when a fallback was substituted for something that
/// could not be decoded or resolved; `value` is always usable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Decoded<T> {
    pub value: T,
    pub degraded: bool,
}

impl<T> Decoded<T> {
    pub fn exact(value: T) -> Self {
        Decoded {
            value,
            degraded: false,
        }
    }

    pub fn degraded(value: T) -> Self {
        Decoded {
            value,
            degraded: true,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            degraded: self.degraded,
        }
    }

    /// Mark degraded if `degraded` is set, keeping an earlier mark.
    pub fn degrade_if(mut self, degraded: bool) -> Self {
        self.degraded |= degraded;
        self
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// A decoded class signature: type parameters, then supertypes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClassSignature {
    pub params: Vec<TypeParamDecl>,
    /// Superclass first, then interfaces.
    pub supertypes: Vec<ClassType>,
}

/// Decode a type signature, substituting references to parameters in
/// `tparams`.
///
/// A malformed signature is logged and decodes to an unbounded wildcard.
pub fn parse_signature(
    signature: &str,
    tparams: Option<&TypeParamMap>,
    context: Option<ClassHandle>,
) -> Decoded<GenType> {
    match try_parse_signature(signature, tparams, context) {
        Ok(ty) => Decoded::exact(ty),
        Err(error) => {
            tracing::warn!(signature, %error, "malformed type signature");
            Decoded::degraded(GenType::Wildcard(Wildcard::Unbounded))
        }
    }
}

/// Decode a type signature, reporting the first error.
pub fn try_parse_signature(
    signature: &str,
    tparams: Option<&TypeParamMap>,
    context: Option<ClassHandle>,
) -> Result<GenType, SignatureError> {
    let mut reader = SignatureReader::new(signature, tparams, context);
    let ty = reader.read_type()?;
    reader.finish()?;
    Ok(ty)
}

/// Decode the signature attribute of a class.
pub fn parse_class_signature(
    signature: &str,
    context: Option<ClassHandle>,
) -> Result<ClassSignature, SignatureError> {
    let mut reader = SignatureReader::new(signature, None, context);
    let mut parsed = ClassSignature::default();
    if reader.eat(b'<') {
        parsed.params = reader.read_type_params()?;
    }
    while !reader.at_end() {
        reader.expect(b'L', "a class type")?;
        parsed.supertypes.push(reader.read_class_type()?);
    }
    Ok(parsed)
}

struct SignatureReader<'a> {
    signature: &'a str,
    pos: usize,
    tparams: Option<&'a TypeParamMap>,
    context: Option<ClassHandle>,
    depth: usize,
}

impl<'a> SignatureReader<'a> {
    fn new(signature: &'a str, tparams: Option<&'a TypeParamMap>, context: Option<ClassHandle>) -> Self {
        SignatureReader {
            signature,
            pos: 0,
            tparams,
            context,
            depth: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.signature.as_bytes().get(self.pos).copied()
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.signature.len()
    }

    fn bump(&mut self) -> Result<u8, SignatureError> {
        let c = self
            .peek()
            .ok_or(SignatureError::UnexpectedEnd { at: self.pos })?;
        self.pos += 1;
        Ok(c)
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: u8, expected: &'static str) -> Result<(), SignatureError> {
        let at = self.pos;
        if self.bump()? == c {
            Ok(())
        } else {
            Err(self.unexpected(at, expected))
        }
    }

    fn unexpected(&self, at: usize, expected: &'static str) -> SignatureError {
        let found = self
            .signature
            .get(at..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        SignatureError::Unexpected {
            found,
            at,
            expected,
        }
    }

    fn finish(&self) -> Result<(), SignatureError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(SignatureError::Trailing { at: self.pos })
        }
    }

    fn read_type(&mut self) -> Result<GenType, SignatureError> {
        if self.depth == MAX_NESTING {
            return Err(SignatureError::TooDeep { at: self.pos });
        }
        self.depth += 1;
        let ty = ensure_sufficient_stack(|| self.read_one_type());
        self.depth -= 1;
        ty
    }

    fn read_one_type(&mut self) -> Result<GenType, SignatureError> {
        let at = self.pos;
        let ty = match self.bump()? {
            b'*' => GenType::Wildcard(Wildcard::Unbounded),
            b'+' => GenType::Wildcard(Wildcard::extends(self.read_type()?)),
            b'-' => GenType::Wildcard(Wildcard::super_of(self.read_type()?)),
            b'[' => GenType::Array(Box::new(self.read_type()?)),
            b'T' => {
                let name = self.read_ident()?;
                self.expect(b';', "`;`")?;
                match self.tparams.and_then(|map| map.get(&name)) {
                    Some(ty) => ty.clone(),
                    None => GenType::TypeParam(name),
                }
            }
            b'L' => GenType::Class(self.read_class_type()?),
            c => match PrimitiveKind::from_descriptor(c) {
                Some(kind) => GenType::Primitive(kind),
                None => return Err(self.unexpected(at, "a type")),
            },
        };
        Ok(ty)
    }

    /// A class type after its `L`, through the closing `;`.
    fn read_class_type(&mut self) -> Result<ClassType, SignatureError> {
        let name = self.read_ident()?;
        let mut class = ClassType::raw(Reflective::deferred(name, self.context));
        loop {
            let at = self.pos;
            match self.bump()? {
                b'<' if class.args.is_none() => class.args = Some(self.read_args()?),
                b'.' => {
                    let inner = self.read_ident()?;
                    let name = format!("{}${inner}", class.name());
                    class = ClassType {
                        reflective: Reflective::deferred(name, self.context),
                        args: None,
                        outer: Some(Box::new(class)),
                    };
                }
                b';' => return Ok(class),
                _ => return Err(self.unexpected(at, "`<`, `.` or `;`")),
            }
        }
    }

    /// Type arguments after `<`, through the closing `>`.
    fn read_args(&mut self) -> Result<Vec<GenType>, SignatureError> {
        let mut args = Vec::new();
        while !self.eat(b'>') {
            args.push(self.read_type()?);
        }
        Ok(args)
    }

    /// Formal type parameters after `<`, through the closing `>`.
    fn read_type_params(&mut self) -> Result<Vec<TypeParamDecl>, SignatureError> {
        let mut params = Vec::new();
        while !self.eat(b'>') {
            let name = self.read_ident()?;
            self.expect(b':', "`:`")?;
            // An empty class bound is followed directly by an interface bound.
            let mut bound = match self.peek() {
                Some(b':') => None,
                _ => Some(self.read_type()?),
            };
            while self.eat(b':') {
                let interface = self.read_type()?;
                if bound.is_none() {
                    bound = Some(interface);
                }
            }
            let bound = bound.unwrap_or_else(|| {
                GenType::Class(ClassType::raw(Reflective::deferred(
                    "java.lang.Object",
                    self.context,
                )))
            });
            params.push(TypeParamDecl { name, bound });
        }
        Ok(params)
    }

    /// An identifier, with `/` package separators turned into `.`.
    fn read_ident(&mut self) -> Result<String, SignatureError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b';' | b'<' | b'>' | b':' | b'.') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(if self.at_end() {
                SignatureError::UnexpectedEnd { at: start }
            } else {
                SignatureError::EmptyName { at: start }
            });
        }
        Ok(self.signature[start..self.pos].replace('/', "."))
    }
}

#[cfg(test)]
mod tests;
