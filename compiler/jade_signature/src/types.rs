//! The generic type model.
//!
//! `GenType` mirrors what a JVM generic signature can express: primitives,
//! arrays, (possibly parameterised) class types, type-parameter references
//! and wildcards. `Display` renders Java source syntax.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::lookup::Reflective;

/// Map from type-parameter name to the type it stands for.
pub type TypeParamMap = FxHashMap<String, GenType>;

/// JVM primitive types, one descriptor character each.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Long,
    Float,
    Double,
    Short,
    Byte,
    Char,
    Boolean,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Short,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Boolean,
        PrimitiveKind::Void,
    ];

    pub fn from_descriptor(c: u8) -> Option<PrimitiveKind> {
        Self::ALL.into_iter().find(|kind| kind.descriptor() == c)
    }

    /// From the Java keyword, as in a field's erased type name.
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn descriptor(self) -> u8 {
        match self {
            PrimitiveKind::Int => b'I',
            PrimitiveKind::Long => b'J',
            PrimitiveKind::Float => b'F',
            PrimitiveKind::Double => b'D',
            PrimitiveKind::Short => b'S',
            PrimitiveKind::Byte => b'B',
            PrimitiveKind::Char => b'C',
            PrimitiveKind::Boolean => b'Z',
            PrimitiveKind::Void => b'V',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Void => "void",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type as described by a generic signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenType {
    Primitive(PrimitiveKind),
    Array(Box<GenType>),
    Class(ClassType),
    /// A reference to a type parameter that had no mapping.
    TypeParam(String),
    Wildcard(Wildcard),
}

impl GenType {
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            GenType::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Replace type-parameter references found in `map`.
    #[must_use]
    pub fn substitute(&self, map: &TypeParamMap) -> GenType {
        match self {
            GenType::Primitive(_) => self.clone(),
            GenType::Array(element) => GenType::Array(Box::new(element.substitute(map))),
            GenType::Class(class) => GenType::Class(class.substitute(map)),
            GenType::TypeParam(name) => map.get(name).cloned().unwrap_or_else(|| self.clone()),
            GenType::Wildcard(Wildcard::Unbounded) => self.clone(),
            GenType::Wildcard(Wildcard::Extends(bound)) => {
                GenType::Wildcard(Wildcard::extends(bound.substitute(map)))
            }
            GenType::Wildcard(Wildcard::Super(bound)) => {
                GenType::Wildcard(Wildcard::super_of(bound.substitute(map)))
            }
        }
    }
}

impl From<ClassType> for GenType {
    fn from(class: ClassType) -> Self {
        GenType::Class(class)
    }
}

impl fmt::Display for GenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenType::Primitive(kind) => write!(f, "{kind}"),
            GenType::Array(element) => write!(f, "{element}[]"),
            GenType::Class(class) => write!(f, "{class}"),
            GenType::TypeParam(name) => f.write_str(name),
            GenType::Wildcard(wildcard) => write!(f, "{wildcard}"),
        }
    }
}

/// `?`, `? extends T` or `? super T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Wildcard {
    Unbounded,
    Extends(Box<GenType>),
    Super(Box<GenType>),
}

impl Wildcard {
    /// `? extends bound`. A wildcard bound collapses into the wildcard it
    /// is compatible with; `? extends ? super X` is unbounded.
    pub fn extends(bound: GenType) -> Wildcard {
        match bound {
            GenType::Wildcard(Wildcard::Extends(inner)) => Wildcard::Extends(inner),
            GenType::Wildcard(_) => Wildcard::Unbounded,
            other => Wildcard::Extends(Box::new(other)),
        }
    }

    /// `? super bound`, collapsing wildcard bounds like [`Wildcard::extends`].
    pub fn super_of(bound: GenType) -> Wildcard {
        match bound {
            GenType::Wildcard(Wildcard::Super(inner)) => Wildcard::Super(inner),
            GenType::Wildcard(_) => Wildcard::Unbounded,
            other => Wildcard::Super(Box::new(other)),
        }
    }
}

impl fmt::Display for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wildcard::Unbounded => f.write_str("?"),
            Wildcard::Extends(bound) => write!(f, "? extends {bound}"),
            Wildcard::Super(bound) => write!(f, "? super {bound}"),
        }
    }
}

/// A class or interface type with optional type arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassType {
    pub reflective: Reflective,
    /// `None` for a raw or non-generic reference.
    pub args: Option<Vec<GenType>>,
    /// The enclosing type of an inner class reference written as
    /// `Outer<..>.Inner`.
    pub outer: Option<Box<ClassType>>,
}

impl ClassType {
    pub fn raw(reflective: Reflective) -> Self {
        ClassType {
            reflective,
            args: None,
            outer: None,
        }
    }

    pub fn generic(reflective: Reflective, args: Vec<GenType>) -> Self {
        ClassType {
            reflective,
            args: Some(args),
            outer: None,
        }
    }

    /// Binary name, `.`-separated with `$` before nested class names.
    #[inline]
    pub fn name(&self) -> &str {
        self.reflective.name()
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        self.args.is_none()
    }

    #[must_use]
    pub fn substitute(&self, map: &TypeParamMap) -> ClassType {
        ClassType {
            reflective: self.reflective.clone(),
            args: self
                .args
                .as_ref()
                .map(|args| args.iter().map(|arg| arg.substitute(map)).collect()),
            outer: self.outer.as_ref().map(|outer| Box::new(outer.substitute(map))),
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outer {
            Some(outer) => {
                let name = self.name();
                let simple = name.rsplit_once('$').map_or(name, |(_, simple)| simple);
                write!(f, "{outer}.{simple}")?;
            }
            None => f.write_str(self.name())?,
        }
        if let Some(args) = &self.args {
            f.write_str("<")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A declared type parameter and its first bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub name: String,
    pub bound: GenType,
}

impl fmt::Display for TypeParamDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} extends {}", self.name, self.bound)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn class(name: &str, args: Option<Vec<GenType>>) -> GenType {
        GenType::Class(ClassType {
            reflective: Reflective::deferred(name, None),
            args,
            outer: None,
        })
    }

    #[test]
    fn primitive_descriptors_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_descriptor(kind.descriptor()), Some(kind));
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_descriptor(b'L'), None);
        assert_eq!(PrimitiveKind::from_name("String"), None);
    }

    #[test]
    fn display_uses_java_syntax() {
        let map = class(
            "java.util.Map",
            Some(vec![
                class("java.lang.String", None),
                GenType::Wildcard(Wildcard::extends(GenType::TypeParam("T".into()))),
            ]),
        );
        assert_eq!(map.to_string(), "java.util.Map<java.lang.String, ? extends T>");
        let array = GenType::Array(Box::new(GenType::Primitive(PrimitiveKind::Int)));
        assert_eq!(array.to_string(), "int[]");
        assert_eq!(GenType::Wildcard(Wildcard::Unbounded).to_string(), "?");
    }

    #[test]
    fn inner_class_displays_through_its_outer() {
        let outer = ClassType::generic(
            Reflective::deferred("p.Outer", None),
            vec![GenType::TypeParam("T".into())],
        );
        let inner = ClassType {
            reflective: Reflective::deferred("p.Outer$Inner", None),
            args: Some(vec![class("java.lang.String", None)]),
            outer: Some(Box::new(outer)),
        };
        assert_eq!(inner.to_string(), "p.Outer<T>.Inner<java.lang.String>");
    }

    #[test]
    fn substitution_replaces_mapped_parameters_only() {
        let mut map = TypeParamMap::default();
        map.insert("E".into(), class("java.lang.String", None));
        let list = class(
            "java.util.List",
            Some(vec![GenType::TypeParam("E".into()), GenType::TypeParam("F".into())]),
        );
        assert_eq!(
            list.substitute(&map).to_string(),
            "java.util.List<java.lang.String, F>"
        );
    }

    #[test]
    fn wildcard_bounds_collapse() {
        let number = class("java.lang.Number", None);
        let upper = GenType::Wildcard(Wildcard::extends(number.clone()));
        assert_eq!(Wildcard::extends(upper.clone()).to_string(), "? extends java.lang.Number");
        assert_eq!(Wildcard::super_of(upper), Wildcard::Unbounded);
        let lower = GenType::Wildcard(Wildcard::super_of(number));
        assert_eq!(Wildcard::super_of(lower).to_string(), "? super java.lang.Number");
    }
}
