use crate::definition::AuthenticationPolicyDefinition;
use crate::definition::authentication::{
    BasicAuthenticationSchemeDefinition, BearerAuthenticationSchemeDefinition,
    DigestAuthenticationSchemeDefinition, OAuth2AuthenticationEndpointsDefinition,
    OAuth2AuthenticationSchemeDefinition, OAuth2ClientAuthenticationMethod, OAuth2GrantType,
    OAuth2RequestEncoding, OAuth2TokenDefinition, OAuth2TokenRequestDefinition,
};
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::validation::validate_uri;

#[derive(Debug, Clone, Default)]
pub struct BasicAuthenticationSchemeDefinitionBuilder {
    scheme: BasicAuthenticationSchemeDefinition,
}

impl BasicAuthenticationSchemeDefinitionBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.scheme.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.scheme.password = Some(password.into());
        self
    }

    /// Loads the credentials from a secret instead.
    pub fn use_secret(mut self, secret: impl Into<String>) -> Self {
        self.scheme.use_ = Some(secret.into());
        self
    }

    pub fn build(self) -> Result<BasicAuthenticationSchemeDefinition> {
        self.scheme.validate("BasicAuthenticationSchemeDefinition")?;
        Ok(self.scheme)
    }

    pub fn build_digest(self) -> Result<DigestAuthenticationSchemeDefinition> {
        self.scheme.validate("DigestAuthenticationSchemeDefinition")?;
        Ok(self.scheme)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BearerAuthenticationSchemeDefinitionBuilder {
    scheme: BearerAuthenticationSchemeDefinition,
}

impl BearerAuthenticationSchemeDefinitionBuilder {
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.scheme.token = Some(token.into());
        self
    }

    pub fn use_secret(mut self, secret: impl Into<String>) -> Self {
        self.scheme.use_ = Some(secret.into());
        self
    }

    pub fn build(self) -> Result<BearerAuthenticationSchemeDefinition> {
        self.scheme.validate("BearerAuthenticationSchemeDefinition")?;
        Ok(self.scheme)
    }
}

/// Properties shared by the `oauth2` and `oidc` schemes.
#[derive(Debug, Clone, Default)]
pub struct OAuth2AuthenticationSchemeDefinitionBuilder {
    scheme: OAuth2AuthenticationSchemeDefinition,
}

impl OAuth2AuthenticationSchemeDefinitionBuilder {
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.scheme.authority = Some(authority.into());
        self
    }

    pub fn grant(mut self, grant: OAuth2GrantType) -> Self {
        self.scheme.grant = Some(grant);
        self
    }

    pub fn client(mut self, id: impl Into<String>, secret: Option<String>) -> Self {
        let client = self.scheme.client.get_or_insert_with(Default::default);
        client.id = Some(id.into());
        client.secret = secret;
        self
    }

    pub fn client_assertion(mut self, assertion: impl Into<String>) -> Self {
        self.scheme.client.get_or_insert_with(Default::default).assertion = Some(assertion.into());
        self
    }

    pub fn client_authentication(mut self, method: OAuth2ClientAuthenticationMethod) -> Self {
        self.scheme
            .client
            .get_or_insert_with(Default::default)
            .authentication = Some(method);
        self
    }

    pub fn request_encoding(mut self, encoding: OAuth2RequestEncoding) -> Self {
        self.scheme.request = Some(OAuth2TokenRequestDefinition { encoding });
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scheme.scopes.push(scope.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.scheme.audiences.push(audience.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.scheme.issuers.push(issuer.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.scheme.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.scheme.password = Some(password.into());
        self
    }

    pub fn subject(mut self, token: impl Into<String>, type_: impl Into<String>) -> Self {
        self.scheme.subject = Some(OAuth2TokenDefinition {
            token: token.into(),
            type_: type_.into(),
        });
        self
    }

    pub fn actor(mut self, token: impl Into<String>, type_: impl Into<String>) -> Self {
        self.scheme.actor = Some(OAuth2TokenDefinition {
            token: token.into(),
            type_: type_.into(),
        });
        self
    }

    pub fn endpoints(mut self, endpoints: OAuth2AuthenticationEndpointsDefinition) -> Self {
        self.scheme.endpoints = endpoints;
        self
    }

    pub fn use_secret(mut self, secret: impl Into<String>) -> Self {
        self.scheme.use_ = Some(secret.into());
        self
    }

    pub fn build(self) -> Result<OAuth2AuthenticationSchemeDefinition> {
        if let (None, Some(authority)) = (&self.scheme.use_, &self.scheme.authority) {
            validate_uri("authority", authority)?;
        }
        self.scheme.validate("OAuth2AuthenticationSchemeDefinition")?;
        Ok(self.scheme)
    }

    /// OpenID Connect discovers its endpoints from the authority.
    pub fn build_oidc(self) -> Result<OAuth2AuthenticationSchemeDefinition> {
        self.build()
    }
}

#[derive(Debug, Clone)]
enum SchemeBuilder {
    Use(String),
    Basic(BasicAuthenticationSchemeDefinitionBuilder),
    Bearer(BearerAuthenticationSchemeDefinitionBuilder),
    Digest(BasicAuthenticationSchemeDefinitionBuilder),
    OAuth2(OAuth2AuthenticationSchemeDefinitionBuilder),
    Oidc(OAuth2AuthenticationSchemeDefinitionBuilder),
}

/// Picks a single scheme; a later call replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationPolicyDefinitionBuilder {
    scheme: Option<SchemeBuilder>,
}

impl AuthenticationPolicyDefinitionBuilder {
    pub fn basic(
        mut self,
        configure: impl FnOnce(BasicAuthenticationSchemeDefinitionBuilder) -> BasicAuthenticationSchemeDefinitionBuilder,
    ) -> Self {
        self.scheme = Some(SchemeBuilder::Basic(configure(Default::default())));
        self
    }

    pub fn bearer(
        mut self,
        configure: impl FnOnce(BearerAuthenticationSchemeDefinitionBuilder) -> BearerAuthenticationSchemeDefinitionBuilder,
    ) -> Self {
        self.scheme = Some(SchemeBuilder::Bearer(configure(Default::default())));
        self
    }

    pub fn digest(
        mut self,
        configure: impl FnOnce(BasicAuthenticationSchemeDefinitionBuilder) -> BasicAuthenticationSchemeDefinitionBuilder,
    ) -> Self {
        self.scheme = Some(SchemeBuilder::Digest(configure(Default::default())));
        self
    }

    pub fn oauth2(
        mut self,
        configure: impl FnOnce(OAuth2AuthenticationSchemeDefinitionBuilder) -> OAuth2AuthenticationSchemeDefinitionBuilder,
    ) -> Self {
        self.scheme = Some(SchemeBuilder::OAuth2(configure(Default::default())));
        self
    }

    pub fn oidc(
        mut self,
        configure: impl FnOnce(OAuth2AuthenticationSchemeDefinitionBuilder) -> OAuth2AuthenticationSchemeDefinitionBuilder,
    ) -> Self {
        self.scheme = Some(SchemeBuilder::Oidc(configure(Default::default())));
        self
    }

    /// Policy whose whole configuration is held by a secret.
    pub fn use_secret(mut self, secret: impl Into<String>) -> Self {
        self.scheme = Some(SchemeBuilder::Use(secret.into()));
        self
    }

    pub fn build(self) -> Result<AuthenticationPolicyDefinition> {
        let policy = match self.scheme {
            None => {
                return Err(DefinitionError::missing(
                    "AuthenticationPolicyDefinition",
                    "scheme",
                ));
            }
            Some(SchemeBuilder::Use(secret)) if secret.trim().is_empty() => {
                return Err(DefinitionError::missing("AuthenticationPolicyDefinition", "use"));
            }
            Some(SchemeBuilder::Use(secret)) => AuthenticationPolicyDefinition::Use(secret),
            Some(SchemeBuilder::Basic(b)) => AuthenticationPolicyDefinition::Basic(
                b.build().map_err(|e| e.within("basic"))?,
            ),
            Some(SchemeBuilder::Bearer(b)) => AuthenticationPolicyDefinition::Bearer(
                b.build().map_err(|e| e.within("bearer"))?,
            ),
            Some(SchemeBuilder::Digest(b)) => AuthenticationPolicyDefinition::Digest(
                b.build_digest().map_err(|e| e.within("digest"))?,
            ),
            Some(SchemeBuilder::OAuth2(b)) => AuthenticationPolicyDefinition::OAuth2(
                b.build().map_err(|e| e.within("oauth2"))?,
            ),
            Some(SchemeBuilder::Oidc(b)) => AuthenticationPolicyDefinition::Oidc(
                b.build_oidc().map_err(|e| e.within("oidc"))?,
            ),
        };
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AuthenticationScheme;

    #[test]
    fn test_basic_requires_credentials() {
        assert!(matches!(
            BasicAuthenticationSchemeDefinitionBuilder::default().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "username"
        ));
        assert!(matches!(
            BasicAuthenticationSchemeDefinitionBuilder::default()
                .username("admin")
                .build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "password"
        ));
        assert!(
            BasicAuthenticationSchemeDefinitionBuilder::default()
                .use_secret("basicCredentials")
                .build()
                .is_ok()
        );
        let mixed = BasicAuthenticationSchemeDefinitionBuilder::default()
            .username("admin")
            .use_secret("basicCredentials")
            .build()
            .unwrap_err();
        assert!(matches!(mixed, DefinitionError::MutuallyExclusive { .. }));
    }

    #[test]
    fn test_bearer_token_or_secret() {
        assert!(matches!(
            BearerAuthenticationSchemeDefinitionBuilder::default().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "token"
        ));
        let bearer = BearerAuthenticationSchemeDefinitionBuilder::default()
            .token("${ .token }")
            .build()
            .unwrap();
        assert_eq!(bearer.token.as_deref(), Some("${ .token }"));
    }

    #[test]
    fn test_oauth2_builder() {
        let policy = AuthenticationPolicyDefinitionBuilder::default()
            .oauth2(|o| {
                o.authority("https://auth.example.com")
                    .grant(OAuth2GrantType::ClientCredentials)
                    .client("workflow", Some("s3cr3t".to_string()))
                    .scope("api")
            })
            .build()
            .unwrap();
        assert_eq!(policy.scheme(), Some(AuthenticationScheme::OAuth2));

        let bad_authority = AuthenticationPolicyDefinitionBuilder::default()
            .oidc(|o| o.authority("not a uri").grant(OAuth2GrantType::ClientCredentials))
            .build()
            .unwrap_err();
        assert!(matches!(
            bad_authority,
            DefinitionError::InvalidFormat { field, .. } if field == "oidc.authority"
        ));

        let exchange = AuthenticationPolicyDefinitionBuilder::default()
            .oauth2(|o| {
                o.authority("https://auth.example.com")
                    .grant(OAuth2GrantType::TokenExchange)
            })
            .build()
            .unwrap_err();
        assert!(matches!(
            exchange,
            DefinitionError::MissingField { field, .. } if field == "oauth2.subject"
        ));
    }

    #[test]
    fn test_policy_requires_scheme() {
        assert!(matches!(
            AuthenticationPolicyDefinitionBuilder::default().build(),
            Err(DefinitionError::MissingField { field, .. }) if field == "scheme"
        ));
        let policy = AuthenticationPolicyDefinitionBuilder::default()
            .basic(|b| b.username("a").password("b"))
            .use_secret("fromVault")
            .build()
            .unwrap();
        assert_eq!(policy.secret(), Some("fromVault"));
        assert_eq!(policy.scheme(), None);
    }
}
