//! Enquiry form handler.

use axum::{Json, extract::State};
use giftora_core::{Pincode, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::marketplace::EnquiryRequest;
use crate::state::AppState;

/// Body of `POST /enquiry`.
#[derive(Debug, Deserialize)]
pub struct EnquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pincode: String,
    pub message: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

/// Response of `POST /enquiry`.
#[derive(Debug, Serialize)]
pub struct EnquiryResponse {
    pub message: String,
}

impl EnquiryForm {
    /// Validate locally; nothing invalid reaches the marketplace.
    fn validate(self) -> Result<EnquiryRequest> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let email = self.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        let phone: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        if phone.len() < 10 {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }

        let pincode = Pincode::parse(&self.pincode)?;

        Ok(EnquiryRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone,
            pincode,
            message: self.message.trim().to_string(),
            product_id: self.product_id,
        })
    }
}

/// Submit an enquiry.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<EnquiryForm>,
) -> Result<Json<EnquiryResponse>> {
    let request = form.validate()?;

    let message = state
        .marketplace()
        .submit_enquiry(&request)
        .await?
        .unwrap_or_else(|| "Thanks, we'll be in touch soon.".to_string());

    Ok(Json(EnquiryResponse { message }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(pincode: &str) -> EnquiryForm {
        serde_json::from_value(json!({
            "name": " Asha ",
            "email": "asha@example.in",
            "phone": "+91 98765 43210",
            "pincode": pincode,
            "message": "Bulk order for Diwali"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_form() {
        let request = form("411001").validate().unwrap();
        assert_eq!(request.name, "Asha");
        assert_eq!(request.phone, "919876543210");
        assert_eq!(request.pincode.as_str(), "411001");
    }

    #[test]
    fn test_bad_pincode_is_validation_error() {
        for pincode in ["", "4110", "41100a", "4110011"] {
            assert!(matches!(form(pincode).validate(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_bad_email() {
        let mut f = form("411001");
        f.email = "asha.example.in".to_string();
        assert!(matches!(f.validate(), Err(AppError::Validation(_))));
    }
}
