//! Profile — the local copy of a person's record on the profile service.
//!
//! JSON keys follow the service (`nombreCompleto`, `tipoPersona`, …). Keys this
//! crate does not model are kept in [`Profile::extra`] so that an update sends
//! back everything the service returned, minus the managed fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  field::{Field, InputKind},
};

/// JSON keys owned by the server; never sent in an update.
pub const MANAGED_KEYS: [&str; 2] = ["tipoPersona", "usuario"];

// ─── Person type ─────────────────────────────────────────────────────────────

/// The person-type classifier (`tipoPersona`).
///
/// Only the guest classifier changes behaviour; any other value is carried
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersonType {
  /// `INVITADO`
  Guest,
  Other(String),
}

impl PersonType {
  pub const GUEST: &'static str = "INVITADO";

  pub fn is_guest(&self) -> bool { matches!(self, Self::Guest) }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Guest => Self::GUEST,
      Self::Other(s) => s,
    }
  }
}

impl From<String> for PersonType {
  fn from(s: String) -> Self {
    if s == Self::GUEST { Self::Guest } else { Self::Other(s) }
  }
}

impl From<PersonType> for String {
  fn from(t: PersonType) -> Self {
    match t {
      PersonType::Guest => PersonType::GUEST.to_string(),
      PersonType::Other(s) => s,
    }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A person's profile as returned by `GET /personas/my-profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  #[serde(rename = "idPersona", default, skip_serializing_if = "Option::is_none")]
  pub id:                  Option<i64>,
  #[serde(rename = "nombreCompleto", default)]
  pub full_name:           Option<String>,
  #[serde(rename = "documento", default)]
  pub document:            Option<String>,
  #[serde(rename = "correo", default)]
  pub email:               Option<String>,
  #[serde(rename = "correoInstitucional", default)]
  pub institutional_email: Option<String>,
  #[serde(rename = "codigoEstudiante", default)]
  pub student_code:        Option<String>,
  #[serde(rename = "celular", default)]
  pub phone:               Option<String>,
  #[serde(rename = "pais", default)]
  pub country:             Option<String>,
  #[serde(rename = "religion", default)]
  pub religion:            Option<String>,
  #[serde(rename = "fechaNacimiento", default)]
  pub birth_date:          Option<String>,
  /// Not editable here, but the service overwrites it on update, so it is
  /// always sent back unchanged.
  #[serde(rename = "foto", default)]
  pub photo:               Option<String>,

  // Managed by the server.
  #[serde(rename = "tipoPersona", default, skip_serializing_if = "Option::is_none")]
  pub person_type:         Option<PersonType>,
  #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
  pub account:             Option<Value>,

  #[serde(flatten)]
  pub extra:               Map<String, Value>,
}

impl Profile {
  fn slot(&self, field: Field) -> &Option<String> {
    match field {
      Field::FullName => &self.full_name,
      Field::Document => &self.document,
      Field::Email => &self.email,
      Field::InstitutionalEmail => &self.institutional_email,
      Field::StudentCode => &self.student_code,
      Field::Phone => &self.phone,
      Field::Country => &self.country,
      Field::Religion => &self.religion,
      Field::BirthDate => &self.birth_date,
    }
  }

  fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
    match field {
      Field::FullName => &mut self.full_name,
      Field::Document => &mut self.document,
      Field::Email => &mut self.email,
      Field::InstitutionalEmail => &mut self.institutional_email,
      Field::StudentCode => &mut self.student_code,
      Field::Phone => &mut self.phone,
      Field::Country => &mut self.country,
      Field::Religion => &mut self.religion,
      Field::BirthDate => &mut self.birth_date,
    }
  }

  /// The display value of `field`; absent values read as empty.
  pub fn get(&self, field: Field) -> &str {
    self.slot(field).as_deref().unwrap_or_default()
  }

  /// Overwrite `field` with `value`, leaving every other field untouched.
  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    *self.slot_mut(field) = Some(value.into());
  }

  pub fn is_guest(&self) -> bool {
    self.person_type.as_ref().is_some_and(PersonType::is_guest)
  }

  pub fn is_editable(&self, field: Field) -> bool {
    field.is_editable_by(self.person_type.as_ref())
  }

  /// Check the constraints the input widgets enforce: required fields are
  /// non-blank and a non-empty date parses as `YYYY-MM-DD`.
  pub fn validate(&self) -> Result<()> {
    for field in Field::all() {
      let value = self.get(field);
      if field.is_required() && value.trim().is_empty() {
        return Err(Error::MissingField(field));
      }
      if field.input_kind() == InputKind::Date
        && !value.is_empty()
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err()
      {
        return Err(Error::InvalidDate {
          field,
          value: value.to_string(),
        });
      }
    }
    Ok(())
  }

  /// Build the update payload: this profile minus the managed fields.
  pub fn to_update(&self) -> ProfileUpdate {
    let mut extra = self.extra.clone();
    for key in MANAGED_KEYS {
      extra.remove(key);
    }

    ProfileUpdate {
      id: self.id,
      full_name: self.full_name.clone(),
      document: self.document.clone(),
      email: self.email.clone(),
      institutional_email: self.institutional_email.clone(),
      student_code: self.student_code.clone(),
      phone: self.phone.clone(),
      country: self.country.clone(),
      religion: self.religion.clone(),
      birth_date: self.birth_date.clone(),
      photo: self.photo.clone(),
      extra,
    }
  }
}

// ─── Update payload ──────────────────────────────────────────────────────────

/// Body of `PUT /personas/my-profile`. Has no slot for the managed fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
  #[serde(rename = "idPersona", skip_serializing_if = "Option::is_none")]
  pub id:                  Option<i64>,
  #[serde(rename = "nombreCompleto")]
  pub full_name:           Option<String>,
  #[serde(rename = "documento")]
  pub document:            Option<String>,
  #[serde(rename = "correo")]
  pub email:               Option<String>,
  #[serde(rename = "correoInstitucional")]
  pub institutional_email: Option<String>,
  #[serde(rename = "codigoEstudiante")]
  pub student_code:        Option<String>,
  #[serde(rename = "celular")]
  pub phone:               Option<String>,
  #[serde(rename = "pais")]
  pub country:             Option<String>,
  #[serde(rename = "religion")]
  pub religion:            Option<String>,
  #[serde(rename = "fechaNacimiento")]
  pub birth_date:          Option<String>,
  #[serde(rename = "foto")]
  pub photo:               Option<String>,
  #[serde(flatten)]
  pub extra:               Map<String, Value>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn sample() -> Value {
    json!({
      "idPersona": 7,
      "nombreCompleto": "Ana Quispe",
      "documento": "70112233",
      "correo": "ana@example.com",
      "correoInstitucional": "ana.quispe@upeu.edu.pe",
      "codigoEstudiante": "202110345",
      "celular": "987654321",
      "pais": "Perú",
      "religion": null,
      "fechaNacimiento": "2001-04-09",
      "foto": "ana.png",
      "tipoPersona": "ESTUDIANTE",
      "usuario": { "idUsuario": 3, "user": "ana" },
      "sede": "Lima"
    })
  }

  #[test]
  fn deserialises_service_shape() {
    let p: Profile = serde_json::from_value(sample()).unwrap();
    assert_eq!(p.id, Some(7));
    assert_eq!(p.get(Field::FullName), "Ana Quispe");
    assert_eq!(p.get(Field::Religion), "");
    assert_eq!(p.person_type, Some(PersonType::Other("ESTUDIANTE".into())));
    assert!(p.account.is_some());
    assert_eq!(p.extra.get("sede"), Some(&json!("Lima")));
  }

  #[test]
  fn guest_classifier_is_recognised() {
    let mut v = sample();
    v["tipoPersona"] = json!("INVITADO");
    let p: Profile = serde_json::from_value(v).unwrap();
    assert!(p.is_guest());
    assert!(!p.is_editable(Field::StudentCode));
    assert!(p.is_editable(Field::FullName));
  }

  #[test]
  fn unknown_person_type_round_trips() {
    let p: Profile = serde_json::from_value(sample()).unwrap();
    let back = serde_json::to_value(&p).unwrap();
    assert_eq!(back["tipoPersona"], json!("ESTUDIANTE"));
  }

  #[test]
  fn update_payload_drops_managed_fields() {
    let p: Profile = serde_json::from_value(sample()).unwrap();
    let payload = serde_json::to_value(p.to_update()).unwrap();

    assert!(payload.get("tipoPersona").is_none());
    assert!(payload.get("usuario").is_none());
    assert_eq!(payload["nombreCompleto"], json!("Ana Quispe"));
    assert_eq!(payload["foto"], json!("ana.png"));
    assert_eq!(payload["sede"], json!("Lima"));
  }

  #[test]
  fn managed_keys_in_extra_are_stripped_too() {
    let mut p = Profile::default();
    p.extra.insert("usuario".into(), json!({ "idUsuario": 1 }));
    let payload = serde_json::to_value(p.to_update()).unwrap();
    assert!(payload.get("usuario").is_none());
  }

  #[test]
  fn set_touches_only_the_named_field() {
    let original: Profile = serde_json::from_value(sample()).unwrap();
    let mut edited = original.clone();
    edited.set(Field::Phone, "900000000");

    assert_eq!(edited.get(Field::Phone), "900000000");
    edited.phone = original.phone.clone();
    assert_eq!(edited, original);
  }

  #[test]
  fn validate_requires_name_and_document() {
    let mut p: Profile = serde_json::from_value(sample()).unwrap();
    assert!(p.validate().is_ok());

    p.set(Field::Document, "   ");
    assert!(matches!(
      p.validate(),
      Err(Error::MissingField(Field::Document))
    ));
  }

  #[test]
  fn validate_checks_birth_date_format() {
    let mut p: Profile = serde_json::from_value(sample()).unwrap();
    p.set(Field::BirthDate, "09/04/2001");
    assert!(matches!(p.validate(), Err(Error::InvalidDate { .. })));

    p.set(Field::BirthDate, "");
    assert!(p.validate().is_ok());
  }
}
