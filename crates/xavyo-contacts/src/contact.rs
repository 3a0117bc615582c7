//! The canonical contact record.
//!
//! Every storage, whatever its backend, hands contacts to the host in this
//! shape. Field names on the wire follow the platform's PascalCase contract
//! (`UUID`, `ViewEmail`, `ItsMe`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::UserId;
use crate::types::{PrimaryEmail, StorageType};

/// A contact as returned by a storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    /// Storage-unique identifier. Never empty.
    #[serde(rename = "UUID")]
    pub uuid: String,

    /// Owner of this copy of the contact; `None` for anonymous list rows.
    pub id_user: Option<UserId>,

    pub storage: Option<StorageType>,

    /// The address shown in contact lists.
    pub view_email: String,

    /// Whether `view_email` is the requesting user's own address.
    pub its_me: bool,

    pub frequency: u64,
    pub date_modified: i64,
    #[serde(rename = "ETag")]
    pub etag: String,

    pub read_only: bool,
    pub global: bool,
    pub use_friendly_name: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<PrimaryEmail>,

    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,

    pub personal_email: String,
    pub personal_address: String,
    pub personal_city: String,
    pub personal_state: String,
    pub personal_zip: String,
    pub personal_country: String,
    pub personal_web: String,
    pub personal_fax: String,
    pub personal_phone: String,
    pub personal_mobile: String,

    pub business_email: String,
    pub business_company: String,
    pub business_department: String,
    pub business_job_title: String,
    pub business_office: String,
    pub business_address: String,
    pub business_city: String,
    pub business_state: String,
    pub business_zip: String,
    pub business_country: String,
    pub business_web: String,
    pub business_fax: String,
    pub business_phone: String,

    pub other_email: String,
    pub notes: String,
    pub skype: String,
    pub facebook: String,
}

impl Contact {
    /// Create an empty contact with the given identifier in `storage`.
    pub fn new(uuid: impl Into<String>, storage: StorageType) -> Self {
        Self {
            uuid: uuid.into(),
            storage: Some(storage),
            ..Self::default()
        }
    }

    /// The address to display: business first, then personal, else empty.
    #[must_use]
    pub fn preferred_email(&self) -> &str {
        if !self.business_email.is_empty() {
            &self.business_email
        } else if !self.personal_email.is_empty() {
            &self.personal_email
        } else {
            ""
        }
    }
}

/// Generates [`ContactField`] together with the accessor dispatch on
/// [`Contact`], so the two cannot drift apart.
macro_rules! contact_fields {
    ($($(#[$meta:meta])* $variant:ident => $field:ident),+ $(,)?) => {
        /// A contact field a backend attribute can be mapped onto.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ContactField {
            $($(#[$meta])* $variant,)+
        }

        impl ContactField {
            /// Every mappable field, in declaration order.
            pub const ALL: &'static [ContactField] = &[$(ContactField::$variant,)+];

            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ContactField::$variant => stringify!($variant),)+
                }
            }
        }

        impl Contact {
            /// Read a mappable field.
            #[must_use]
            pub fn field(&self, field: ContactField) -> &str {
                match field {
                    $(ContactField::$variant => &self.$field,)+
                }
            }

            /// Mutable access to a mappable field.
            pub fn field_mut(&mut self, field: ContactField) -> &mut String {
                match field {
                    $(ContactField::$variant => &mut self.$field,)+
                }
            }
        }
    };
}

contact_fields! {
    FullName => full_name,
    FirstName => first_name,
    LastName => last_name,
    NickName => nick_name,
    #[serde(alias = "HomeEmail")]
    PersonalEmail => personal_email,
    PersonalAddress => personal_address,
    PersonalCity => personal_city,
    PersonalState => personal_state,
    PersonalZip => personal_zip,
    PersonalCountry => personal_country,
    PersonalWeb => personal_web,
    PersonalFax => personal_fax,
    PersonalPhone => personal_phone,
    PersonalMobile => personal_mobile,
    BusinessEmail => business_email,
    BusinessCompany => business_company,
    BusinessDepartment => business_department,
    BusinessJobTitle => business_job_title,
    BusinessOffice => business_office,
    BusinessAddress => business_address,
    BusinessCity => business_city,
    BusinessState => business_state,
    BusinessZip => business_zip,
    BusinessCountry => business_country,
    BusinessWeb => business_web,
    BusinessFax => business_fax,
    BusinessPhone => business_phone,
    OtherEmail => other_email,
    Notes => notes,
    Skype => skype,
    Facebook => facebook,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactField {
    type Err = UnknownContactField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("HomeEmail") {
            return Ok(ContactField::PersonalEmail);
        }
        ContactField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownContactField(s.to_string()))
    }
}

/// A mapping target that names no known contact field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contact field '{0}'")]
pub struct UnknownContactField(pub String);
