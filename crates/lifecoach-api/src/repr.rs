//! External representation of persons and measures.
//!
//! The same document types are rendered as XML (the default) or JSON,
//! chosen from the request's `Accept` header. Request bodies are read
//! according to `Content-Type`. Username and email never appear in any
//! rendered document.

use axum::{
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use lifecoach_core::{
  measure::{Measure, NewMeasure, check_timestamp},
  person::{NewPerson, Person},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ApiError;

const XML_DECLARATION: &str =
  r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// ─── Negotiation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Xml,
  Json,
}

impl Format {
  /// Response format: JSON only when `Accept` asks for it.
  pub fn from_accept(headers: &HeaderMap) -> Self {
    match header_str(headers, header::ACCEPT) {
      Some(accept) if accept.contains("application/json") => Format::Json,
      _ => Format::Xml,
    }
  }

  /// Request body format: JSON if `Content-Type` mentions it.
  pub fn from_content_type(headers: &HeaderMap) -> Self {
    match header_str(headers, header::CONTENT_TYPE) {
      Some(ct) if ct.contains("json") => Format::Json,
      _ => Format::Xml,
    }
  }

  pub fn content_type(self) -> &'static str {
    match self {
      Format::Xml => "application/xml; charset=utf-8",
      Format::Json => "application/json",
    }
  }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

/// Serialise `value` into a response body in `format`.
pub fn render<T: Serialize>(
  format: Format,
  status: StatusCode,
  value: &T,
) -> Result<Response, ApiError> {
  let body = match format {
    Format::Xml => {
      let xml = quick_xml::se::to_string(value)
        .map_err(|e| ApiError::Encode(e.to_string()))?;
      format!("{XML_DECLARATION}{xml}").into_bytes()
    }
    Format::Json => {
      serde_json::to_vec(value).map_err(|e| ApiError::Encode(e.to_string()))?
    }
  };
  Ok((status, [(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// Deserialise a request body in `format`.
pub fn parse<T: DeserializeOwned>(format: Format, body: &[u8]) -> Result<T, ApiError> {
  match format {
    Format::Json => serde_json::from_slice(body)
      .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}"))),
    Format::Xml => {
      let text = std::str::from_utf8(body)
        .map_err(|_| ApiError::BadRequest("body is not valid UTF-8".to_owned()))?;
      quick_xml::de::from_str(text)
        .map_err(|e| ApiError::BadRequest(format!("invalid XML body: {e}")))
    }
  }
}

// ─── Output documents ────────────────────────────────────────────────────────

/// `<person>`: `idPerson`, `firstname`, `lastname`, `birthdate`,
/// `currentHealth`, in that order.
#[derive(Debug, Serialize)]
#[serde(rename = "person")]
pub struct PersonDoc {
  #[serde(rename = "idPerson")]
  pub id:             i64,
  pub firstname:      String,
  pub lastname:       String,
  pub birthdate:      String,
  #[serde(rename = "currentHealth")]
  pub current_health: MeasureList,
}

impl From<&Person> for PersonDoc {
  fn from(p: &Person) -> Self {
    Self {
      id:             p.id,
      firstname:      p.first_name.clone(),
      lastname:       p.last_name.clone(),
      birthdate:      p.birthdate_string(),
      current_health: MeasureList::from(p.current_health.as_slice()),
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename = "people")]
pub struct PeopleDoc {
  #[serde(rename = "person")]
  pub people: Vec<PersonDoc>,
}

impl From<&[Person]> for PeopleDoc {
  fn from(people: &[Person]) -> Self {
    Self { people: people.iter().map(PersonDoc::from).collect() }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename = "measure")]
pub struct MeasureDoc {
  pub mid:          i64,
  pub value:        String,
  #[serde(rename = "valueType", skip_serializing_if = "Option::is_none")]
  pub value_type:   Option<String>,
  pub created:      String,
  #[serde(rename = "measureType")]
  pub measure_type: String,
}

impl From<&Measure> for MeasureDoc {
  fn from(m: &Measure) -> Self {
    Self {
      mid:          m.id,
      value:        m.value.clone(),
      value_type:   m.value_type.clone(),
      created:      m.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
      measure_type: m.measure_type.clone(),
    }
  }
}

/// A wrapper whose children are each labelled `measure`. Used both for
/// `currentHealth` and as the `measureHistory` root.
#[derive(Debug, Serialize)]
#[serde(rename = "measureHistory")]
pub struct MeasureList {
  #[serde(rename = "measure")]
  pub measures: Vec<MeasureDoc>,
}

impl From<&[Measure]> for MeasureList {
  fn from(measures: &[Measure]) -> Self {
    Self { measures: measures.iter().map(MeasureDoc::from).collect() }
  }
}

/// `<error><message>…</message></error>`, the XML form of an error body.
#[derive(Debug, Serialize)]
#[serde(rename = "error")]
pub struct ErrorDoc {
  pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename = "measureTypes")]
pub struct MeasureTypesDoc {
  #[serde(rename = "measureType")]
  pub types: Vec<String>,
}

// ─── Input documents ─────────────────────────────────────────────────────────

/// Body of `POST /person` and `PUT /person/{id}`.
///
/// `username` and `email` are accepted but never echoed back.
#[derive(Debug, Deserialize)]
pub struct PersonBody {
  pub firstname:      String,
  pub lastname:       String,
  pub birthdate:      String,
  #[serde(default)]
  pub username:       Option<String>,
  #[serde(default)]
  pub email:          Option<String>,
  #[serde(rename = "currentHealth", default)]
  pub current_health: Option<MeasureListBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MeasureListBody {
  #[serde(rename = "measure", default)]
  pub measures: Vec<MeasureBody>,
}

/// Body of `POST /person/{id}/{measureType}`, and the elements of
/// `currentHealth` in a person body.
#[derive(Debug, Deserialize)]
pub struct MeasureBody {
  pub value:        String,
  #[serde(rename = "valueType", default)]
  pub value_type:   Option<String>,
  /// Defaults to the time the request is handled.
  #[serde(default)]
  pub created:      Option<DateTime<Utc>>,
  #[serde(rename = "measureType", default)]
  pub measure_type: Option<String>,
}

impl MeasureBody {
  /// Convert to a [`NewMeasure`]; `measure_type` overrides any type given in
  /// the body.
  pub fn into_new_measure(
    self,
    measure_type: Option<&str>,
  ) -> Result<NewMeasure, ApiError> {
    let measure_type = measure_type
      .map(str::to_owned)
      .or(self.measure_type)
      .ok_or_else(|| ApiError::BadRequest("measure has no measureType".to_owned()))?;

    Ok(NewMeasure {
      measure_type,
      value: self.value,
      value_type: self.value_type,
      timestamp: check_timestamp(self.created.unwrap_or_else(Utc::now))?,
    })
  }
}

impl PersonBody {
  pub fn into_new_person(self) -> Result<NewPerson, ApiError> {
    let mut person =
      NewPerson::new(self.firstname, self.lastname, self.birthdate.parse()?);
    person.username = self.username.unwrap_or_default();
    person.email = self.email.unwrap_or_default();
    person.measures = self
      .current_health
      .unwrap_or_default()
      .measures
      .into_iter()
      .map(|m| m.into_new_measure(None))
      .collect::<Result<_, _>>()?;
    Ok(person)
  }

  /// Overwrite the mutable fields of `existing`. Username and email are only
  /// replaced when given.
  pub fn apply_to(self, mut existing: Person) -> Result<Person, ApiError> {
    existing.set_birthdate(&self.birthdate)?;
    existing.first_name = self.firstname;
    existing.last_name = self.lastname;
    if let Some(username) = self.username {
      existing.username = username;
    }
    if let Some(email) = self.email {
      existing.email = email;
    }
    Ok(existing)
  }
}
