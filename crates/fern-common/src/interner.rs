//! String interning for identifier names.

use rustc_hash::FxHashMap;

/// An interned identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// A string interner that maps strings to unique names.
///
/// Each syntax-tree arena owns one interner, so a `Name` is only meaningful
/// together with the interner that produced it.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string and return its name.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }

        let Ok(raw) = u32::try_from(self.strings.len()) else {
            crate::ice!("interner exhausted after {} names", self.strings.len());
        };
        let name = Name(raw);
        self.strings.push(s.into());
        self.map.insert(s.into(), name);
        name
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Get the string for a name.
    pub fn get(&self, name: Name) -> &str {
        match self.strings.get(name.0 as usize) {
            Some(s) => s,
            None => crate::ice!("{name:?} was not produced by this interner"),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
