use anyhow::Result;

use super::AuthMode;

pub(super) fn parse_auth_mode(value: Option<&str>) -> Result<AuthMode> {
    match value
        .unwrap_or("disabled")
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "disabled" => Ok(AuthMode::Disabled),
        "jwt" => Ok(AuthMode::Jwt),
        invalid => anyhow::bail!("GEONEAR_AUTH_MODE must be one of disabled|jwt, got '{invalid}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_auth_mode_defaults_to_disabled() {
        assert_eq!(
            parse_auth_mode(None).expect("missing mode should parse"),
            AuthMode::Disabled
        );
    }

    #[test]
    fn parse_auth_mode_is_case_insensitive() {
        assert_eq!(
            parse_auth_mode(Some(" JWT ")).expect("jwt mode should parse"),
            AuthMode::Jwt
        );
    }

    #[test]
    fn parse_auth_mode_rejects_unknown_modes() {
        let error = parse_auth_mode(Some("api_key")).expect_err("api_key is not supported");
        assert!(error.to_string().contains("disabled|jwt"));
    }
}
