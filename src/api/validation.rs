use super::ApiError;

const MAX_SLUG_LEN: usize = 100;

pub fn validate_slug(slug: &str) -> Result<&str, ApiError> {
    if slug.is_empty() {
        return Err(ApiError::validation("Slug cannot be empty"));
    }

    if slug.len() > MAX_SLUG_LEN {
        return Err(ApiError::validation(format!(
            "Slug must be {} characters or less",
            MAX_SLUG_LEN
        )));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ApiError::validation(
            "Slug can only contain lowercase letters, digits, and hyphens",
        ));
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("stoic-philosophy").is_ok());
        assert!(validate_slug("web3-builders").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Stoic").is_err());
        assert!(validate_slug("../etc").is_err());
        assert!(validate_slug(&"a".repeat(101)).is_err());
    }
}
