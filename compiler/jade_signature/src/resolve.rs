//! Type-parameter mapping across the supertype graph.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::decode::{parse_class_signature, parse_signature, Decoded};
use crate::lookup::{ClassHandle, ClassLookup, Reflective};
use crate::types::{ClassType, GenType, PrimitiveKind, TypeParamDecl, TypeParamMap, Wildcard};

/// A field as reported by the debuggee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    /// Erased type name in Java syntax, e.g. `int[]` or `java.util.List`.
    pub type_name: String,
    pub declaring: ClassHandle,
    pub signature: Option<String>,
}

/// The object whose field is inspected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub class: ClassHandle,
    /// Type arguments known for the object's class, if any.
    pub params: Option<TypeParamMap>,
}

/// The type parameters `class` declares, with their first bounds.
pub fn type_params(class: ClassHandle, lookup: &dyn ClassLookup) -> Decoded<Vec<TypeParamDecl>> {
    let Some(signature) = lookup.generic_signature(class) else {
        return Decoded::exact(Vec::new());
    };
    match parse_class_signature(signature, Some(class)) {
        Ok(parsed) => Decoded::exact(parsed.params),
        Err(error) => {
            tracing::warn!(signature, %error, "malformed class signature");
            Decoded::degraded(Vec::new())
        }
    }
}

/// Direct supertypes of `class`: superclass first, then interfaces.
///
/// Parameterised from the class signature when there is one; otherwise
/// the erased superclass and interfaces.
pub fn super_types(class: ClassHandle, lookup: &dyn ClassLookup) -> Decoded<Vec<ClassType>> {
    let mut degraded = false;
    if let Some(signature) = lookup.generic_signature(class) {
        match parse_class_signature(signature, Some(class)) {
            Ok(parsed) => return Decoded::exact(parsed.supertypes),
            Err(error) => {
                tracing::warn!(signature, %error, "malformed class signature");
                degraded = true;
            }
        }
    }

    let mut erased: SmallVec<[ClassHandle; 4]> = SmallVec::new();
    erased.extend(lookup.superclass(class));
    erased.extend(lookup.interfaces(class));
    let mut supertypes = Vec::with_capacity(erased.len());
    for handle in erased {
        match Reflective::loaded(handle, lookup) {
            Some(reflective) => supertypes.push(ClassType::raw(reflective)),
            None => degraded = true,
        }
    }
    Decoded::exact(supertypes).degrade_if(degraded)
}

/// Give every parameter of `class` missing from `map` the wildcard
/// `? extends <bound>`.
pub fn add_default_param_bases(
    map: &mut TypeParamMap,
    class: ClassHandle,
    lookup: &dyn ClassLookup,
) -> Decoded<()> {
    let params = type_params(class, lookup);
    let degraded = params.degraded;
    for param in params.value {
        if !map.contains_key(&param.name) {
            map.insert(param.name, GenType::Wildcard(Wildcard::extends(param.bound)));
        }
    }
    Decoded::exact(()).degrade_if(degraded)
}

impl ClassType {
    /// Express the type parameters of the supertype `declaring` in terms
    /// of this type's arguments.
    ///
    /// A raw step on the way erases the mapping: the result is empty. A
    /// `declaring` type that is not a supertype yields an empty, degraded
    /// mapping.
    #[tracing::instrument(level = "debug", skip(self, lookup), fields(class = %self.name()))]
    pub fn map_to_super(&self, declaring: &str, lookup: &dyn ClassLookup) -> Decoded<TypeParamMap> {
        let mut visited = FxHashSet::default();
        if let Some(found) = self.find_super(declaring, lookup, &mut visited, false) {
            return found;
        }
        tracing::warn!(declaring, "not a supertype");
        Decoded::degraded(TypeParamMap::default())
    }

    fn find_super(
        &self,
        declaring: &str,
        lookup: &dyn ClassLookup,
        visited: &mut FxHashSet<String>,
        erased: bool,
    ) -> Option<Decoded<TypeParamMap>> {
        if !visited.insert(self.name().to_string()) {
            return None;
        }
        let class = self.reflective.resolve(lookup)?;
        let (own, raw) = self.own_params(class, lookup);
        let erased = erased || raw;
        if self.name() == declaring {
            if erased {
                return Some(Decoded::exact(TypeParamMap::default()).degrade_if(own.degraded));
            }
            return Some(own);
        }

        let supers = super_types(class, lookup);
        for supertype in &supers.value {
            let supertype = supertype.substitute(&own.value);
            if let Some(found) = supertype.find_super(declaring, lookup, visited, erased) {
                tracing::trace!(via = %supertype, "found a path to the declaring type");
                return Some(found.degrade_if(own.degraded || supers.degraded));
            }
        }
        None
    }

    /// This type's own parameter mapping, and whether it is a raw use of a
    /// generic class.
    fn own_params(&self, class: ClassHandle, lookup: &dyn ClassLookup) -> (Decoded<TypeParamMap>, bool) {
        let params = type_params(class, lookup);
        let Some(args) = &self.args else {
            let raw = !params.value.is_empty();
            return (params.map(|_| TypeParamMap::default()), raw);
        };
        if args.len() != params.value.len() {
            tracing::warn!(
                class = %self.name(),
                expected = params.value.len(),
                found = args.len(),
                "type argument count mismatch"
            );
        }
        let mismatch = args.len() != params.value.len();
        let map = params.map(|params| {
            params
                .into_iter()
                .zip(args.iter().cloned())
                .map(|(param, arg)| (param.name, arg))
                .collect()
        });
        (map.degrade_if(mismatch), false)
    }
}

/// The complete type of `field` as seen through `object`.
///
/// Without a generic signature the erased type is used. Otherwise the
/// object's type arguments are mapped to the declaring class and
/// substituted into the field signature.
pub fn field_type(field: &FieldInfo, object: &ObjectInfo, lookup: &dyn ClassLookup) -> Decoded<GenType> {
    let Some(signature) = &field.signature else {
        return erased_type(&field.type_name, object.class, lookup);
    };

    let mut params = object.params.clone().unwrap_or_default();
    let defaults = add_default_param_bases(&mut params, object.class, lookup);
    let declared = type_params(object.class, lookup);
    let (Some(reflective), Some(declaring)) = (
        Reflective::loaded(object.class, lookup),
        lookup.class_name(field.declaring),
    ) else {
        tracing::warn!(field = %field.name, "object or declaring class is gone");
        return parse_signature(signature, None, Some(object.class)).degrade_if(true);
    };

    let instance = if declared.value.is_empty() {
        ClassType::raw(reflective)
    } else {
        let args = declared
            .value
            .iter()
            .map(|param| {
                params
                    .get(&param.name)
                    .cloned()
                    .unwrap_or(GenType::Wildcard(Wildcard::Unbounded))
            })
            .collect();
        ClassType::generic(reflective, args)
    };
    let map = instance.map_to_super(declaring, lookup);
    parse_signature(signature, Some(&map.value), Some(object.class))
        .degrade_if(defaults.degraded || declared.degraded || map.degraded)
}

/// A type from its erased name, e.g. `int`, `java.lang.String[]`.
fn erased_type(type_name: &str, from: ClassHandle, lookup: &dyn ClassLookup) -> Decoded<GenType> {
    if let Some(element) = type_name.strip_suffix("[]") {
        return erased_type(element, from, lookup).map(|ty| GenType::Array(Box::new(ty)));
    }
    if let Some(kind) = PrimitiveKind::from_name(type_name) {
        return Decoded::exact(GenType::Primitive(kind));
    }
    let reflective = lookup
        .find_class(type_name, Some(from))
        .and_then(|class| Reflective::loaded(class, lookup))
        .unwrap_or_else(|| Reflective::deferred(type_name, Some(from)));
    Decoded::exact(GenType::Class(ClassType::raw(reflective)))
}
