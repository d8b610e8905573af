use serde::Deserialize;
use validator::Validate;

use crate::domain::auth::{Credentials, ProviderToken};
use crate::domain::types::UserEmail;
use crate::forms::FormError;

#[derive(Deserialize, Validate)]
/// Form data for the credentials sign-in.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl TryFrom<LoginForm> for Credentials {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let email = UserEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?;
        Ok(Credentials {
            email,
            password: form.password,
        })
    }
}

#[derive(Deserialize, Validate)]
/// Provider token handed over by the OAuth sign-in widget.
pub struct OAuthForm {
    #[validate(length(min = 1))]
    pub provider: String,
    #[validate(length(min = 1))]
    pub access_token: String,
}

impl TryFrom<OAuthForm> for ProviderToken {
    type Error = FormError;

    fn try_from(form: OAuthForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(ProviderToken {
            provider: form.provider.trim().to_lowercase(),
            access_token: form.access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_normalizes_email() {
        let form = LoginForm {
            email: "Admin@Example.com".to_string(),
            password: "secret".to_string(),
        };
        let credentials = Credentials::try_from(form).unwrap();
        assert_eq!(credentials.email.as_str(), "admin@example.com");
    }

    #[test]
    fn login_form_requires_password() {
        let form = LoginForm {
            email: "admin@example.com".to_string(),
            password: String::new(),
        };
        assert!(matches!(
            Credentials::try_from(form),
            Err(FormError::Validation(_))
        ));
    }
}
