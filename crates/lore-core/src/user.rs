//! Users and the closed set of console roles.
//!
//! A user carries exactly one [`Role`]. Roles are not hierarchical; any extra
//! reach a role has is spelled out in [`crate::policy`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The role a user acts under. Serialised as the human-readable label shown in
/// the console (e.g. `"CIO/Admin"`); the variant name is accepted when parsing
/// as well.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
  #[serde(rename = "Electrical Engineer", alias = "ElectricalEngineer")]
  #[strum(to_string = "Electrical Engineer", serialize = "ElectricalEngineer")]
  ElectricalEngineer,
  #[serde(rename = "Operations Engineer", alias = "OperationsEngineer")]
  #[strum(to_string = "Operations Engineer", serialize = "OperationsEngineer")]
  OperationsEngineer,
  #[serde(rename = "HR Manager", alias = "HRManager")]
  #[strum(to_string = "HR Manager", serialize = "HRManager")]
  HrManager,
  #[serde(rename = "Legal Counsel", alias = "LegalCounsel")]
  #[strum(to_string = "Legal Counsel", serialize = "LegalCounsel")]
  LegalCounsel,
  #[serde(rename = "External Contractor", alias = "ExternalContractor")]
  #[strum(to_string = "External Contractor", serialize = "ExternalContractor")]
  ExternalContractor,
  #[serde(rename = "CIO/Admin", alias = "CIOAdmin")]
  #[strum(to_string = "CIO/Admin", serialize = "CIOAdmin")]
  CioAdmin,
}

impl Role {
  pub fn is_contractor(self) -> bool { self == Self::ExternalContractor }
}

/// A console user. Immutable once created: switching identity replaces the
/// whole value rather than editing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:     String,
  pub name:   String,
  pub role:   Role,
  /// Short initials rendered in place of a picture.
  pub avatar: String,
}

impl User {
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    role: Role,
    avatar: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      role,
      avatar: avatar.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn labels_parse_back() {
    for role in Role::iter() {
      let label = role.to_string();
      assert_eq!(label.parse::<Role>().unwrap(), role, "{label}");
    }
  }

  #[test]
  fn variant_names_are_accepted() {
    assert_eq!("CIOAdmin".parse::<Role>().unwrap(), Role::CioAdmin);
    assert_eq!("hr manager".parse::<Role>().unwrap(), Role::HrManager);
    assert!("Janitor".parse::<Role>().is_err());
  }

  #[test]
  fn serde_uses_console_labels() {
    let json = serde_json::to_string(&Role::CioAdmin).unwrap();
    assert_eq!(json, "\"CIO/Admin\"");
    let back: Role = serde_json::from_str("\"External Contractor\"").unwrap();
    assert_eq!(back, Role::ExternalContractor);
  }
}
