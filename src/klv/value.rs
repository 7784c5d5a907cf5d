//! The KLV value model.

use std::fmt;

use super::blob::Blob;
use super::float::Real;
use super::local_set::LocalSet;
use super::st1108::{MetricImplementer, MetricPeriodPack};

/// Local set tag. Only meaningful inside its enclosing local set.
pub type Tag = u64;

// ============================================================================
// Enumerations
// ============================================================================

/// A closed, standard-defined set of named codes.
///
/// Code `i` is named `names[i]`.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDomain {
    /// Domain name, e.g. "compression type".
    pub name: &'static str,
    /// Code names, indexed by code.
    pub names: &'static [&'static str],
}

impl EnumDomain {
    /// Whether `code` is defined in this domain.
    pub fn contains(&self, code: u64) -> bool {
        code < self.names.len() as u64
    }

    /// Name of `code`, if defined.
    pub fn name_of(&self, code: u64) -> Option<&'static str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.names.get(i))
            .copied()
    }

    /// Code for a name, case-insensitive.
    pub fn code_of(&self, name: &str) -> Option<u64> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| i as u64)
    }
}

/// A code drawn from an [`EnumDomain`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Enumerated {
    domain: &'static EnumDomain,
    code: u64,
}

impl Enumerated {
    /// Pair a code with its domain. The code is not checked here; the codec
    /// rejects undefined codes on decode.
    pub fn new(domain: &'static EnumDomain, code: u64) -> Self {
        Self { domain, code }
    }

    /// The domain this code belongs to.
    pub fn domain(&self) -> &'static EnumDomain {
        self.domain
    }

    /// The raw code.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// The code's name, if it is defined in the domain.
    pub fn name(&self) -> Option<&'static str> {
        self.domain.name_of(self.code)
    }
}

impl fmt::Debug for Enumerated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", self.domain.name, name),
            None => write!(f, "{}(unknown {})", self.domain.name, self.code),
        }
    }
}

// ============================================================================
// Value
// ============================================================================

/// A decoded KLV value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Undecoded bytes: foreign tags, or values that failed to decode.
    Blob(Blob),
    /// Nested local set.
    LocalSet(LocalSet),
    /// Real number at a documented precision.
    Real(Real),
    /// Unsigned integer.
    Uint(u64),
    /// UTF-8 text.
    String(String),
    /// Standard-defined enumerated code.
    Enum(Enumerated),
    /// MISB ST 1108 metric period pack.
    PeriodPack(MetricPeriodPack),
    /// MISB ST 1108 metric implementer pack.
    Implementer(MetricImplementer),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Blob(_) => "blob",
            Value::LocalSet(_) => "local set",
            Value::Real(_) => "real",
            Value::Uint(_) => "uint",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::PeriodPack(_) => "period pack",
            Value::Implementer(_) => "implementer",
        }
    }

    /// Get the blob, if this is one.
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Get the nested local set, if this is one.
    pub fn as_local_set(&self) -> Option<&LocalSet> {
        match self {
            Value::LocalSet(set) => Some(set),
            _ => None,
        }
    }

    /// Get the nested local set mutably, if this is one.
    pub fn as_local_set_mut(&mut self) -> Option<&mut LocalSet> {
        match self {
            Value::LocalSet(set) => Some(set),
            _ => None,
        }
    }

    /// Get the real, if this is one.
    pub fn as_real(&self) -> Option<Real> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Get the unsigned integer, if this is one.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the text, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the enumerated code, if this is one.
    pub fn as_enum(&self) -> Option<Enumerated> {
        match self {
            Value::Enum(e) => Some(*e),
            _ => None,
        }
    }

    /// Get the period pack, if this is one.
    pub fn as_period_pack(&self) -> Option<&MetricPeriodPack> {
        match self {
            Value::PeriodPack(p) => Some(p),
            _ => None,
        }
    }

    /// Get the implementer pack, if this is one.
    pub fn as_implementer(&self) -> Option<&MetricImplementer> {
        match self {
            Value::Implementer(i) => Some(i),
            _ => None,
        }
    }
}

impl From<Blob> for Value {
    fn from(v: Blob) -> Self {
        Value::Blob(v)
    }
}

impl From<LocalSet> for Value {
    fn from(v: LocalSet) -> Self {
        Value::LocalSet(v)
    }
}

impl From<Real> for Value {
    fn from(v: Real) -> Self {
        Value::Real(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Enumerated> for Value {
    fn from(v: Enumerated) -> Self {
        Value::Enum(v)
    }
}

impl From<MetricPeriodPack> for Value {
    fn from(v: MetricPeriodPack) -> Self {
        Value::PeriodPack(v)
    }
}

impl From<MetricImplementer> for Value {
    fn from(v: MetricImplementer) -> Self {
        Value::Implementer(v)
    }
}
