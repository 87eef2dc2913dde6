use std::borrow::Cow;

use serde_json::{Map, Value};

/// Literal the model uses for fields the deed does not state.
pub const NOT_SPECIFIED: &str = "Not specified in document";

/// The closed extraction schema, in prompt order.
pub const FIELD_NAMES: [&str; 17] = [
    "owner_name",
    "property_address",
    "property_parcel_id",
    "document_id",
    "legal_description",
    "grantor_name",
    "grantee_name",
    "deed_type",
    "liens_and_encumbrances",
    "signatures",
    "notarization_details",
    "recording_information",
    "consideration",
    "habendum_clause",
    "warranty_clauses",
    "tax_information",
    "title_insurance_details",
];

/// Deed attributes extracted by the model.
///
/// Known schema keys are explicit optional strings; anything else the model
/// returned is kept verbatim in `extra`. `order` remembers the keys as the
/// model wrote them. Missing and empty-valued keys are simply `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeedFields {
    pub owner_name: Option<String>,
    pub property_address: Option<String>,
    pub property_parcel_id: Option<String>,
    pub document_id: Option<String>,
    pub legal_description: Option<String>,
    pub grantor_name: Option<String>,
    pub grantee_name: Option<String>,
    pub deed_type: Option<String>,
    pub liens_and_encumbrances: Option<String>,
    pub signatures: Option<String>,
    pub notarization_details: Option<String>,
    pub recording_information: Option<String>,
    pub consideration: Option<String>,
    pub habendum_clause: Option<String>,
    pub warranty_clauses: Option<String>,
    pub tax_information: Option<String>,
    pub title_insurance_details: Option<String>,
    pub extra: Map<String, Value>,
    pub order: Vec<String>,
}

/// A field name paired with its value rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry<'a> {
    pub name: &'a str,
    pub value: Cow<'a, str>,
}

impl DeedFields {
    /// Build the typed view over a parsed JSON object.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut fields = DeedFields::default();

        for (key, value) in map {
            fields.order.push(key.clone());
            match fields.slot_mut(key) {
                Some(slot) => {
                    *slot = is_truthy(value).then(|| value_text(value).into_owned());
                }
                None => {
                    fields.extra.insert(key.clone(), value.clone());
                }
            }
        }

        fields
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name {
            "owner_name" => &mut self.owner_name,
            "property_address" => &mut self.property_address,
            "property_parcel_id" => &mut self.property_parcel_id,
            "document_id" => &mut self.document_id,
            "legal_description" => &mut self.legal_description,
            "grantor_name" => &mut self.grantor_name,
            "grantee_name" => &mut self.grantee_name,
            "deed_type" => &mut self.deed_type,
            "liens_and_encumbrances" => &mut self.liens_and_encumbrances,
            "signatures" => &mut self.signatures,
            "notarization_details" => &mut self.notarization_details,
            "recording_information" => &mut self.recording_information,
            "consideration" => &mut self.consideration,
            "habendum_clause" => &mut self.habendum_clause,
            "warranty_clauses" => &mut self.warranty_clauses,
            "tax_information" => &mut self.tax_information,
            "title_insurance_details" => &mut self.title_insurance_details,
            _ => return None,
        };
        Some(slot)
    }

    /// Value of a schema field. Unknown names always return `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let slot = match name {
            "owner_name" => &self.owner_name,
            "property_address" => &self.property_address,
            "property_parcel_id" => &self.property_parcel_id,
            "document_id" => &self.document_id,
            "legal_description" => &self.legal_description,
            "grantor_name" => &self.grantor_name,
            "grantee_name" => &self.grantee_name,
            "deed_type" => &self.deed_type,
            "liens_and_encumbrances" => &self.liens_and_encumbrances,
            "signatures" => &self.signatures,
            "notarization_details" => &self.notarization_details,
            "recording_information" => &self.recording_information,
            "consideration" => &self.consideration,
            "habendum_clause" => &self.habendum_clause,
            "warranty_clauses" => &self.warranty_clauses,
            "tax_information" => &self.tax_information,
            "title_insurance_details" => &self.title_insurance_details,
            _ => return None,
        };
        slot.as_deref()
    }

    /// Every field that has a value, in the order the model returned them.
    /// Schema fields set without going through [`DeedFields::from_map`]
    /// follow in schema order.
    pub fn entries(&self) -> Vec<FieldEntry<'_>> {
        let mut entries: Vec<FieldEntry<'_>> = self
            .order
            .iter()
            .filter_map(|name| self.entry(name))
            .collect();

        for &name in FIELD_NAMES.iter() {
            if !self.order.iter().any(|seen| seen == name) {
                entries.extend(self.entry(name));
            }
        }

        entries
    }

    fn entry<'a>(&'a self, name: &'a str) -> Option<FieldEntry<'a>> {
        let value = match self.get(name) {
            Some(value) => Cow::Borrowed(value),
            None => {
                let value = self.extra.get(name).filter(|v| is_truthy(v))?;
                value_text(value)
            }
        };
        Some(FieldEntry { name, value })
    }

    /// Entries whose value is worth showing: non-empty and not the sentinel.
    pub fn present(&self) -> Vec<FieldEntry<'_>> {
        self.entries()
            .into_iter()
            .filter(|entry| is_present(&entry.value))
            .collect()
    }
}

/// Whether a field value carries real content.
pub fn is_present(value: &str) -> bool {
    !value.is_empty() && value != NOT_SPECIFIED
}

/// Whether a JSON value counts as filled in: `null`, `false`, zero and empty
/// strings, arrays or objects do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render a JSON value as the text used for display and matching.
///
/// Strings are returned as-is, booleans as `True`/`False`, numbers as their
/// JSON text, arrays as their items joined with `", "`, objects as compact
/// JSON.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(true) => Cow::Borrowed("True"),
        Value::Bool(false) => Cow::Borrowed("False"),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| value_text(item).into_owned())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Cow::Owned(other.to_string()),
    }
}

/// Human-cased label for a field name: `property_parcel_id` becomes
/// `Property Parcel Id`.
pub fn label(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut after_letter = false;

    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }

    out
}
