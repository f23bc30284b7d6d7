//! Class lookup in the debuggee, and deferred class references.

use rustc_hash::FxHashMap;

/// Opaque handle to a class loaded in the debuggee.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassHandle(pub u32);

/// Access to the classes of a running virtual machine.
///
/// Implementations may block on the debuggee.
pub trait ClassLookup {
    /// Find a loaded class by binary name, as seen from `from`: classes
    /// visible to its class loader first, then any loaded class.
    fn find_class(&self, name: &str, from: Option<ClassHandle>) -> Option<ClassHandle>;

    fn class_name(&self, class: ClassHandle) -> Option<&str>;

    /// The class's generic signature attribute, if it has one.
    fn generic_signature(&self, class: ClassHandle) -> Option<&str>;

    fn superclass(&self, class: ClassHandle) -> Option<ClassHandle>;

    fn interfaces(&self, class: ClassHandle) -> Vec<ClassHandle>;
}

/// How a [`Reflective`] reaches its class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Origin {
    Loaded(ClassHandle),
    /// Not looked up yet; found in a signature read from this class.
    DiscoveredFrom(Option<ClassHandle>),
}

/// A class reference that is resolved only when needed.
///
/// Signatures name classes the debuggee may not have loaded yet; decoding
/// them must not require loading.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reflective {
    name: String,
    origin: Origin,
}

impl Reflective {
    /// A reference to `name` discovered while reading a signature of
    /// `from`, whose class loader scopes the eventual lookup.
    pub fn deferred(name: impl Into<String>, from: Option<ClassHandle>) -> Self {
        Reflective {
            name: name.into(),
            origin: Origin::DiscoveredFrom(from),
        }
    }

    /// A reference to an already loaded class.
    pub fn loaded(class: ClassHandle, lookup: &dyn ClassLookup) -> Option<Self> {
        let name = lookup.class_name(class)?;
        Some(Reflective {
            name: name.to_string(),
            origin: Origin::Loaded(class),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.origin, Origin::Loaded(_))
    }

    /// The class handle, looking the class up if this reference was
    /// deferred.
    pub fn resolve(&self, lookup: &dyn ClassLookup) -> Option<ClassHandle> {
        match self.origin {
            Origin::Loaded(class) => Some(class),
            Origin::DiscoveredFrom(from) => {
                let found = lookup.find_class(&self.name, from);
                if found.is_none() {
                    tracing::warn!(name = %self.name, "class is not loaded");
                }
                found
            }
        }
    }
}

/// Description of one class for a [`ClassTable`].
#[derive(Clone, Debug, Default)]
pub struct ClassDef {
    name: String,
    signature: Option<String>,
    superclass: Option<ClassHandle>,
    interfaces: Vec<ClassHandle>,
    loader: u32,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            ..ClassDef::default()
        }
    }

    #[must_use]
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    #[must_use]
    pub fn extends(mut self, superclass: ClassHandle) -> Self {
        self.superclass = Some(superclass);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: ClassHandle) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Class loader id. Classes default to loader 0.
    #[must_use]
    pub fn loader(mut self, loader: u32) -> Self {
        self.loader = loader;
        self
    }
}

/// In-memory [`ClassLookup`].
#[derive(Clone, Debug, Default)]
pub struct ClassTable {
    classes: Vec<ClassDef>,
    by_name: FxHashMap<String, Vec<ClassHandle>>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: ClassDef) -> ClassHandle {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "class tables never approach u32::MAX entries"
        )]
        let handle = ClassHandle(self.classes.len() as u32);
        self.by_name
            .entry(class.name.clone())
            .or_default()
            .push(handle);
        self.classes.push(class);
        handle
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn get(&self, class: ClassHandle) -> Option<&ClassDef> {
        self.classes.get(class.0 as usize)
    }
}

impl ClassLookup for ClassTable {
    fn find_class(&self, name: &str, from: Option<ClassHandle>) -> Option<ClassHandle> {
        let candidates = self.by_name.get(name)?;
        let loader = from.and_then(|from| self.get(from)).map(|def| def.loader);
        candidates
            .iter()
            .copied()
            .find(|&c| loader.is_some() && self.get(c).map(|def| def.loader) == loader)
            .or_else(|| candidates.first().copied())
    }

    fn class_name(&self, class: ClassHandle) -> Option<&str> {
        self.get(class).map(|def| def.name.as_str())
    }

    fn generic_signature(&self, class: ClassHandle) -> Option<&str> {
        self.get(class)?.signature.as_deref()
    }

    fn superclass(&self, class: ClassHandle) -> Option<ClassHandle> {
        self.get(class)?.superclass
    }

    fn interfaces(&self, class: ClassHandle) -> Vec<ClassHandle> {
        self.get(class)
            .map(|def| def.interfaces.clone())
            .unwrap_or_default()
    }
}
