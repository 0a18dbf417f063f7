use crate::capture::CaptureKind;
use crate::locator::Occurrence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting role of an occurrence. Informational only: roles never decide
/// whether an occurrence is renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Definition,
    Reference,
    Import,
    Export,
    Parameter,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Reference => "reference",
            Self::Import => "import",
            Self::Export => "export",
            Self::Parameter => "parameter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role for a capture kind. Excluded kinds have no role.
pub fn role_of(kind: CaptureKind) -> Option<Role> {
    match kind {
        CaptureKind::Definition => Some(Role::Definition),
        CaptureKind::Reference | CaptureKind::TypeReference => Some(Role::Reference),
        CaptureKind::Import => Some(Role::Import),
        CaptureKind::Export => Some(Role::Export),
        CaptureKind::Parameter => Some(Role::Parameter),
        CaptureKind::StringLiteral | CaptureKind::Comment => None,
    }
}

/// Role of a located occurrence.
pub fn classify(occurrence: &Occurrence) -> Role {
    // Occurrences are never built from excluded kinds
    role_of(occurrence.kind).unwrap_or(Role::Reference)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub definitions: usize,
    pub references: usize,
    pub imports: usize,
    pub exports: usize,
    pub parameters: usize,
}

impl RoleCounts {
    pub fn add(&mut self, role: Role) {
        match role {
            Role::Definition => self.definitions += 1,
            Role::Reference => self.references += 1,
            Role::Import => self.imports += 1,
            Role::Export => self.exports += 1,
            Role::Parameter => self.parameters += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.definitions + self.references + self.imports + self.exports + self.parameters
    }
}

impl<'a> FromIterator<&'a Occurrence> for RoleCounts {
    fn from_iter<I: IntoIterator<Item = &'a Occurrence>>(iter: I) -> Self {
        let mut counts = Self::default();
        for occurrence in iter {
            counts.add(classify(occurrence));
        }
        counts
    }
}
