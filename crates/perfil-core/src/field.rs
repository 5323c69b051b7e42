//! The catalogue of editable profile fields.

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::profile::PersonType;

/// How a field's value is entered and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
  Text,
  Email,
  /// Calendar date, `YYYY-MM-DD`.
  Date,
}

/// One of the editable profile fields, in display order.
///
/// The string form (`Into<&'static str>`, `FromStr`) is the field's JSON key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr,
)]
pub enum Field {
  #[strum(serialize = "nombreCompleto")]
  FullName,
  #[strum(serialize = "documento")]
  Document,
  #[strum(serialize = "correo")]
  Email,
  #[strum(serialize = "correoInstitucional")]
  InstitutionalEmail,
  #[strum(serialize = "codigoEstudiante")]
  StudentCode,
  #[strum(serialize = "celular")]
  Phone,
  #[strum(serialize = "pais")]
  Country,
  #[strum(serialize = "religion")]
  Religion,
  #[strum(serialize = "fechaNacimiento")]
  BirthDate,
}

impl Field {
  /// All fields in display order.
  pub fn all() -> impl Iterator<Item = Field> { Field::iter() }

  /// The JSON key used by the profile service.
  pub fn key(self) -> &'static str { self.into() }

  pub fn label(self) -> &'static str {
    match self {
      Field::FullName => "Full name",
      Field::Document => "Document",
      Field::Email => "Personal email",
      Field::InstitutionalEmail => "Institutional email",
      Field::StudentCode => "Student code",
      Field::Phone => "Phone",
      Field::Country => "Country",
      Field::Religion => "Religion",
      Field::BirthDate => "Birth date",
    }
  }

  pub fn is_required(self) -> bool {
    matches!(self, Field::FullName | Field::Document)
  }

  pub fn input_kind(self) -> InputKind {
    match self {
      Field::Email | Field::InstitutionalEmail => InputKind::Email,
      Field::BirthDate => InputKind::Date,
      _ => InputKind::Text,
    }
  }

  /// Institution-linked fields that guests may not edit.
  pub fn is_guest_locked(self) -> bool {
    matches!(self, Field::InstitutionalEmail | Field::StudentCode)
  }

  /// Whether a person of `person_type` may edit this field.
  pub fn is_editable_by(self, person_type: Option<&PersonType>) -> bool {
    !(self.is_guest_locked() && person_type.is_some_and(PersonType::is_guest))
  }
}
