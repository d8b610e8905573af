use serde::Deserialize;
use validator::Validate;

use crate::domain::authority::NewAuthority;
use crate::domain::types::AuthorityName;
use crate::forms::FormError;

#[derive(Deserialize, Validate)]
/// Form data for creating or renaming an authority.
pub struct AuthorityForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: String,
}

impl TryFrom<AuthorityForm> for NewAuthority {
    type Error = FormError;

    fn try_from(form: AuthorityForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let name = AuthorityName::new(form.name).map_err(|_| FormError::InvalidName)?;
        Ok(NewAuthority::new(name, Some(form.description)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_description_is_dropped() {
        let form = AuthorityForm {
            name: " Auditors ".to_string(),
            description: "  ".to_string(),
        };
        let authority = NewAuthority::try_from(form).unwrap();
        assert_eq!(authority.name.as_str(), "Auditors");
        assert_eq!(authority.description, None);
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let form = AuthorityForm {
            name: "   ".to_string(),
            description: String::new(),
        };
        assert!(matches!(
            NewAuthority::try_from(form),
            Err(FormError::InvalidName)
        ));
    }
}
