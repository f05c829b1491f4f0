//! ============================================================================
//! Auth Endpoints - Login, registration, OTP, password reset
//! ============================================================================
//! On a successful login the identity is fabricated from the submitted nid
//! and role; the backend only confirms the credentials and returns no
//! identity payload of its own.
//! ============================================================================

use serde::Serialize;
use tracing::info;

use super::{Ack, PortalClient};
use crate::session::{LoginIdentity, Role};
use crate::types::ApiError;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    nid: &'a str,
    password: &'a str,
    role: &'a str,
}

#[derive(Debug, Serialize)]
struct NidRequest<'a> {
    nid: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyOtpRequest<'a> {
    nid: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    nid: &'a str,
    #[serde(rename = "newPassword")]
    new_password: &'a str,
}

/// Registration payload. The portal only registers citizens; officials are
/// provisioned out of band.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationForm {
    pub nid: String,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub password: String,
    pub role: Role,
    pub location: RegistrationLocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationLocation {
    pub division: String,
    pub district: String,
    pub upazila: String,
}

impl PortalClient {
    /// Sign in against the backend. Returns the partial identity to hand to
    /// the session manager.
    pub async fn login(
        &self,
        nid: &str,
        password: &str,
        role: &Role,
    ) -> Result<LoginIdentity, ApiError> {
        let _: Ack = self
            .post_json(
                "login.php",
                &LoginRequest {
                    nid,
                    password,
                    role: role.as_str(),
                },
            )
            .await?;

        info!("Login accepted for {}", nid);
        Ok(LoginIdentity {
            nid: nid.to_string(),
            role_id: None,
            role: Some(role.clone()),
            name: None,
        })
    }

    /// Create a citizen account.
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), ApiError> {
        let _: Ack = self.post_json("register.php", form).await?;
        info!("Registered account for {}", form.nid);
        Ok(())
    }

    /// Ask the backend to send a password-reset OTP.
    pub async fn request_otp(&self, nid: &str) -> Result<(), ApiError> {
        let _: Ack = self.post_json("request-otp.php", &NidRequest { nid }).await?;
        Ok(())
    }

    /// Check the OTP the user received.
    pub async fn verify_otp(&self, nid: &str, otp: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .post_json("verify-otp.php", &VerifyOtpRequest { nid, otp })
            .await?;
        Ok(())
    }

    /// Set a new password after OTP verification.
    pub async fn reset_password(&self, nid: &str, new_password: &str) -> Result<(), ApiError> {
        let _: Ack = self
            .post_json(
                "reset-password.php",
                &ResetPasswordRequest { nid, new_password },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_shape() {
        let request = LoginRequest {
            nid: "BD1",
            password: "secret",
            role: Role::Citizen.as_str(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nid": "BD1", "password": "secret", "role": "Citizen"})
        );
    }

    #[test]
    fn test_reset_password_uses_camel_case_field() {
        let request = ResetPasswordRequest {
            nid: "BD1",
            new_password: "hunter2",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nid": "BD1", "newPassword": "hunter2"})
        );
    }

    #[test]
    fn test_registration_form_shape() {
        let form = RegistrationForm {
            nid: "BD1".to_string(),
            name: "Rahim".to_string(),
            email: "rahim@example.com".to_string(),
            contact: "01700000000".to_string(),
            password: "secret".to_string(),
            role: Role::Citizen,
            location: RegistrationLocation {
                division: "Dhaka".to_string(),
                district: "Dhaka".to_string(),
                upazila: "Dhanmondi".to_string(),
            },
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["role"], "Citizen");
        assert_eq!(json["location"]["upazila"], "Dhanmondi");
    }
}
