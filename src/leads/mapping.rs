//! Conversion of a [`LeadFormData`] into the CRM `Leads` record.

// self
use crate::{
	_prelude::*,
	leads::form::{FormField, LeadFormData, LeadSection},
};

/// Placeholder written to `Last_Name` when the form carries no name; Zoho rejects leads without
/// one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// CRM column keyed record sent in the `data` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LeadRecord(BTreeMap<&'static str, String>);
impl LeadRecord {
	/// Builds the record for `form`, tagging it with `lead_source`.
	pub fn from_form(form: &LeadFormData, lead_source: &str) -> Self {
		let mut columns = BTreeMap::new();

		for field in FormField::ALL {
			if let (Some(column), Some(value)) = (field.column(), field.value(form)) {
				columns.insert(column, value.to_owned());
			}
		}

		columns.entry("Last_Name").or_insert_with(|| UNKNOWN_NAME.to_owned());
		columns.insert("Lead_Source", lead_source.to_owned());

		let description = describe(form);

		if !description.is_empty() {
			columns.insert("Description", description);
		}

		Self(columns)
	}

	/// Returns the value written to `column`.
	pub fn get(&self, column: &str) -> Option<&str> {
		self.0.get(column).map(String::as_str)
	}
}

/// Renders every populated summary field as `Title:\nLabel: value` blocks, one per non-empty
/// section, separated by blank lines.
pub fn describe(form: &LeadFormData) -> String {
	let mut blocks = Vec::new();

	for section in LeadSection::ALL {
		let lines = FormField::ALL
			.iter()
			.filter_map(|field| match field.summary() {
				Some((owner, label)) if owner == section =>
					field.value(form).map(|value| format!("{label}: {value}")),
				_ => None,
			})
			.collect::<Vec<_>>();

		if !lines.is_empty() {
			blocks.push(format!("{}:\n{}", section.title(), lines.join("\n")));
		}
	}

	blocks.join("\n\n")
}
