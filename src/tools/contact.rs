use log::info;
use serde::{ Deserialize, Serialize };

use crate::sanity::catalog::{ self, Contact };
use crate::sanity::DocumentStore;

const LEAD_SAVED: &str =
    "Thank you! Your information has been saved. Our team will contact you shortly.";
const LEAD_FAILED: &str = "Sorry, there was an error saving your information. Please try again.";
const INQUIRY_SAVED: &str =
    "Your inquiry has been submitted! Our team will get back to you soon with more details about this property.";
const INQUIRY_FAILED: &str = "Sorry, there was an error submitting your inquiry. Please try again.";

// Contact fields are not validated here; empty strings go straight through.
#[derive(Debug, Deserialize)]
pub struct LeadArgs {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct InquiryArgs {
    pub property_id: String,
    #[serde(flatten)]
    pub contact: LeadArgs,
}

impl From<LeadArgs> for Contact {
    fn from(args: LeadArgs) -> Self {
        Contact {
            name: args.name,
            email: args.email,
            phone: args.phone,
            message: args.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    fn from_outcome(success: bool, ok: &str, failed: &str) -> Self {
        Self {
            success,
            message: (if success { ok } else { failed }).to_string(),
        }
    }
}

pub async fn save_user_lead(store: &dyn DocumentStore, args: LeadArgs) -> ContactResponse {
    info!("Saving lead: {} - {}", args.name, args.email);
    let result = catalog::save_lead(store, &args.into()).await;
    ContactResponse::from_outcome(result.success, LEAD_SAVED, LEAD_FAILED)
}

pub async fn inquire_about_property(store: &dyn DocumentStore, args: InquiryArgs) -> ContactResponse {
    info!("Saving property inquiry: {} - {}", args.property_id, args.contact.name);
    let result = catalog::save_property_inquiry(
        store,
        &args.property_id,
        &args.contact.into()
    ).await;
    ContactResponse::from_outcome(result.success, INQUIRY_SAVED, INQUIRY_FAILED)
}
