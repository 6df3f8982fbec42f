use std::fmt;

/// Points of the OpenID Connect flow where application callbacks run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecyclePoint {
    MessageReceived,
    AuthorizationCodeReceived,
    AuthorizationCodeRedeemed,
    IdTokenReceived,
    IdTokenValidated,
    UserInformationReceived,
    RedirectToAuthenticationEndpoint,
    RedirectToEndSessionEndpoint,
    AuthenticationCompleted,
    AuthenticationFailed,
}

impl LifecyclePoint {
    pub const ALL: [LifecyclePoint; 10] = [
        Self::MessageReceived,
        Self::AuthorizationCodeReceived,
        Self::AuthorizationCodeRedeemed,
        Self::IdTokenReceived,
        Self::IdTokenValidated,
        Self::UserInformationReceived,
        Self::RedirectToAuthenticationEndpoint,
        Self::RedirectToEndSessionEndpoint,
        Self::AuthenticationCompleted,
        Self::AuthenticationFailed,
    ];

    /// Returns a dot-separated name for logging/tracing.
    pub fn name(self) -> &'static str {
        match self {
            Self::MessageReceived => "oidc.message.received",
            Self::AuthorizationCodeReceived => "oidc.code.received",
            Self::AuthorizationCodeRedeemed => "oidc.code.redeemed",
            Self::IdTokenReceived => "oidc.id_token.received",
            Self::IdTokenValidated => "oidc.id_token.validated",
            Self::UserInformationReceived => "oidc.user_information.received",
            Self::RedirectToAuthenticationEndpoint => "oidc.redirect.authentication",
            Self::RedirectToEndSessionEndpoint => "oidc.redirect.end_session",
            Self::AuthenticationCompleted => "oidc.authentication.completed",
            Self::AuthenticationFailed => "oidc.authentication.failed",
        }
    }
}

impl fmt::Display for LifecyclePoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = LifecyclePoint::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), LifecyclePoint::ALL.len());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LifecyclePoint::IdTokenReceived.to_string(),
            "oidc.id_token.received"
        );
        assert_eq!(
            format!("{}", LifecyclePoint::AuthenticationFailed),
            "oidc.authentication.failed"
        );
    }
}
