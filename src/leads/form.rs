//! Membership form input and its fixed field table.

// self
use crate::_prelude::*;

/// Flat form submission received from the membership site.
///
/// Every field is optional; blank values are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeadFormData {
	/// Applicant's full name.
	pub full_name: Option<String>,
	/// Contact email.
	pub email: Option<String>,
	/// Contact phone number.
	pub phone: Option<String>,
	/// City of practice.
	pub city: Option<String>,
	/// Province or territory.
	pub province: Option<String>,
	/// Country.
	pub country: Option<String>,
	/// Hospital, clinic, or university.
	pub institution: Option<String>,
	/// Profession (physician, nurse, researcher, ...).
	pub profession: Option<String>,
	/// Medical specialty.
	pub specialty: Option<String>,
	/// Years in practice.
	pub years_in_practice: Option<String>,
	/// Amyloidosis types treated or studied.
	pub amyloidosis_type: Option<String>,
	/// Number of amyloidosis patients seen.
	pub patients_seen: Option<String>,
	/// Free-text amyloidosis experience.
	pub amyloidosis_experience: Option<String>,
	/// Research interests.
	pub research_interests: Option<String>,
	/// Education interests.
	pub education_interests: Option<String>,
	/// Interest in collaboration.
	pub collaboration_interest: Option<String>,
	/// Consent to receive communications.
	pub communication_consent: Option<String>,
	/// Consent to data processing.
	pub data_consent: Option<String>,
	/// Acknowledgement of the privacy policy.
	pub privacy_consent: Option<String>,
	/// Requested membership type.
	pub membership_type: Option<String>,
	/// How the applicant heard about the network.
	pub referral_source: Option<String>,
}

/// Every input field of [`LeadFormData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
	/// `fullName`; maps to `Last_Name`.
	FullName,
	/// `email`.
	Email,
	/// `phone`.
	Phone,
	/// `city`.
	City,
	/// `province`; maps to `State`.
	Province,
	/// `country`.
	Country,
	/// `institution`; maps to `Company`.
	Institution,
	/// `profession`; maps to `Designation`.
	Profession,
	/// `specialty`.
	Specialty,
	/// `yearsInPractice`.
	YearsInPractice,
	/// `amyloidosisType`.
	AmyloidosisType,
	/// `patientsSeen`.
	PatientsSeen,
	/// `amyloidosisExperience`.
	AmyloidosisExperience,
	/// `researchInterests`.
	ResearchInterests,
	/// `educationInterests`.
	EducationInterests,
	/// `collaborationInterest`.
	CollaborationInterest,
	/// `communicationConsent`.
	CommunicationConsent,
	/// `dataConsent`.
	DataConsent,
	/// `privacyConsent`.
	PrivacyConsent,
	/// `membershipType`.
	MembershipType,
	/// `referralSource`.
	ReferralSource,
}
impl FormField {
	/// All fields in declaration order.
	pub const ALL: [FormField; 21] = [
		FormField::FullName,
		FormField::Email,
		FormField::Phone,
		FormField::City,
		FormField::Province,
		FormField::Country,
		FormField::Institution,
		FormField::Profession,
		FormField::Specialty,
		FormField::YearsInPractice,
		FormField::AmyloidosisType,
		FormField::PatientsSeen,
		FormField::AmyloidosisExperience,
		FormField::ResearchInterests,
		FormField::EducationInterests,
		FormField::CollaborationInterest,
		FormField::CommunicationConsent,
		FormField::DataConsent,
		FormField::PrivacyConsent,
		FormField::MembershipType,
		FormField::ReferralSource,
	];

	/// CRM column that receives the value verbatim, if any.
	pub const fn column(self) -> Option<&'static str> {
		match self {
			FormField::FullName => Some("Last_Name"),
			FormField::Email => Some("Email"),
			FormField::Phone => Some("Phone"),
			FormField::City => Some("City"),
			FormField::Province => Some("State"),
			FormField::Country => Some("Country"),
			FormField::Institution => Some("Company"),
			FormField::Profession => Some("Designation"),
			FormField::Specialty
			| FormField::YearsInPractice
			| FormField::AmyloidosisType
			| FormField::PatientsSeen
			| FormField::AmyloidosisExperience
			| FormField::ResearchInterests
			| FormField::EducationInterests
			| FormField::CollaborationInterest
			| FormField::CommunicationConsent
			| FormField::DataConsent
			| FormField::PrivacyConsent
			| FormField::MembershipType
			| FormField::ReferralSource => None,
		}
	}

	/// Section and label under which the value is listed in `Description`, if any.
	///
	/// Contact details (name, email, phone, location) only live in their columns.
	pub const fn summary(self) -> Option<(LeadSection, &'static str)> {
		use LeadSection::*;

		let entry = match self {
			FormField::FullName
			| FormField::Email
			| FormField::Phone
			| FormField::City
			| FormField::Province
			| FormField::Country => return None,
			FormField::Institution => (Professional, "Institution"),
			FormField::Profession => (Professional, "Profession"),
			FormField::Specialty => (Professional, "Specialty"),
			FormField::YearsInPractice => (Professional, "Years in Practice"),
			FormField::AmyloidosisType => (Amyloidosis, "Amyloidosis Type"),
			FormField::PatientsSeen => (Amyloidosis, "Patients Seen"),
			FormField::AmyloidosisExperience => (Amyloidosis, "Experience"),
			FormField::ResearchInterests => (Interests, "Research Interests"),
			FormField::EducationInterests => (Interests, "Education Interests"),
			FormField::CollaborationInterest => (Interests, "Collaboration Interest"),
			FormField::CommunicationConsent => (Consent, "Communication Consent"),
			FormField::DataConsent => (Consent, "Data Consent"),
			FormField::PrivacyConsent => (Consent, "Privacy Consent"),
			FormField::MembershipType => (Membership, "Membership Type"),
			FormField::ReferralSource => (Membership, "Referral Source"),
		};

		Some(entry)
	}

	/// Returns the trimmed value of this field, or `None` when it is absent or blank.
	pub fn value(self, form: &LeadFormData) -> Option<&str> {
		let raw = match self {
			FormField::FullName => &form.full_name,
			FormField::Email => &form.email,
			FormField::Phone => &form.phone,
			FormField::City => &form.city,
			FormField::Province => &form.province,
			FormField::Country => &form.country,
			FormField::Institution => &form.institution,
			FormField::Profession => &form.profession,
			FormField::Specialty => &form.specialty,
			FormField::YearsInPractice => &form.years_in_practice,
			FormField::AmyloidosisType => &form.amyloidosis_type,
			FormField::PatientsSeen => &form.patients_seen,
			FormField::AmyloidosisExperience => &form.amyloidosis_experience,
			FormField::ResearchInterests => &form.research_interests,
			FormField::EducationInterests => &form.education_interests,
			FormField::CollaborationInterest => &form.collaboration_interest,
			FormField::CommunicationConsent => &form.communication_consent,
			FormField::DataConsent => &form.data_consent,
			FormField::PrivacyConsent => &form.privacy_consent,
			FormField::MembershipType => &form.membership_type,
			FormField::ReferralSource => &form.referral_source,
		};

		raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
	}
}

/// Sections of the synthesized `Description`, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeadSection {
	/// Specialty and years in practice.
	Professional,
	/// Amyloidosis types and caseload.
	Amyloidosis,
	/// Research, education, and collaboration interests.
	Interests,
	/// Consent flags.
	Consent,
	/// Membership type and referral.
	Membership,
}
impl LeadSection {
	/// All sections in output order.
	pub const ALL: [LeadSection; 5] = [
		LeadSection::Professional,
		LeadSection::Amyloidosis,
		LeadSection::Interests,
		LeadSection::Consent,
		LeadSection::Membership,
	];

	/// Section heading written to the description.
	pub const fn title(self) -> &'static str {
		match self {
			LeadSection::Professional => "Professional Information",
			LeadSection::Amyloidosis => "Amyloidosis Information",
			LeadSection::Interests => "Professional Interests",
			LeadSection::Consent => "Consent Information",
			LeadSection::Membership => "Membership",
		}
	}
}
