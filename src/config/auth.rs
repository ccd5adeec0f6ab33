use std::env;

/// Sign-up policy for the data service.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// When set, only addresses under this domain may sign up (e.g. `ruc.edu.cn`).
    pub allowed_email_domain: Option<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let allowed_email_domain = env::var("ALLOWED_EMAIL_DOMAIN")
            .ok()
            .map(|v| v.trim().trim_start_matches('@').to_ascii_lowercase())
            .filter(|v| !v.is_empty());

        Self {
            allowed_email_domain,
        }
    }

    pub fn email_allowed(&self, email: &str) -> bool {
        match &self.allowed_email_domain {
            None => true,
            Some(domain) => email
                .rsplit_once('@')
                .map(|(_, host)| host.eq_ignore_ascii_case(domain))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_domain_allowed_without_restriction() {
        let config = AuthConfig::default();
        assert!(config.email_allowed("someone@example.com"));
    }

    #[test]
    fn restricted_domain_matches_case_insensitively() {
        let config = AuthConfig {
            allowed_email_domain: Some("ruc.edu.cn".to_string()),
        };
        assert!(config.email_allowed("xiaolu@RUC.edu.cn"));
        assert!(!config.email_allowed("xiaolu@pku.edu.cn"));
        assert!(!config.email_allowed("not-an-email"));
    }

    #[test]
    fn subdomain_is_not_the_same_domain() {
        let config = AuthConfig {
            allowed_email_domain: Some("ruc.edu.cn".to_string()),
        };
        assert!(!config.email_allowed("a@mail.ruc.edu.cn"));
    }
}
