use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{Object, from_object, into_object, single_kind, to_object};
use swdsl_base::validation::validate_uri;
use swdsl_base::{EquatableList, OneOf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AuthenticationScheme {
    Basic,
    Bearer,
    Digest,
    #[strum(serialize = "oauth2")]
    OAuth2,
    Oidc,
}

impl AuthenticationScheme {
    pub const KEYS: [&'static str; 5] = ["basic", "bearer", "digest", "oauth2", "oidc"];
}

/// `{ basic: {...} }`, `{ oauth2: {...} }` or `{ use: "secretName" }`.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthenticationPolicyDefinition {
    Use(String),
    Basic(BasicAuthenticationSchemeDefinition),
    Bearer(BearerAuthenticationSchemeDefinition),
    Digest(DigestAuthenticationSchemeDefinition),
    OAuth2(OAuth2AuthenticationSchemeDefinition),
    Oidc(OAuth2AuthenticationSchemeDefinition),
}

/// An inline policy or the name of one declared under `use.authentications`.
pub type ReferenceableAuthenticationPolicy = OneOf<AuthenticationPolicyDefinition, String>;

impl AuthenticationPolicyDefinition {
    const USE_KEY: &'static str = "use";

    /// `None` when the policy only points at a secret.
    pub fn scheme(&self) -> Option<AuthenticationScheme> {
        match self {
            Self::Use(_) => None,
            Self::Basic(_) => Some(AuthenticationScheme::Basic),
            Self::Bearer(_) => Some(AuthenticationScheme::Bearer),
            Self::Digest(_) => Some(AuthenticationScheme::Digest),
            Self::OAuth2(_) => Some(AuthenticationScheme::OAuth2),
            Self::Oidc(_) => Some(AuthenticationScheme::Oidc),
        }
    }

    /// Name of the secret the policy (or its scheme) loads credentials from.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Self::Use(secret) => Some(secret),
            Self::Basic(s) | Self::Digest(s) => s.use_.as_deref(),
            Self::Bearer(s) => s.use_.as_deref(),
            Self::OAuth2(s) | Self::Oidc(s) => s.use_.as_deref(),
        }
    }

    pub fn from_value(node: Value) -> Result<Self> {
        let object = into_object(node, "AuthenticationPolicyDefinition")?;
        let mut candidates = AuthenticationScheme::KEYS.to_vec();
        candidates.push(Self::USE_KEY);
        let key = single_kind(&object, "authentication policy", &candidates)?;
        let Some(body) = object.get(key).cloned() else {
            return Err(DefinitionError::missing("AuthenticationPolicyDefinition", key));
        };
        if key == Self::USE_KEY {
            return match body {
                Value::String(secret) => Ok(Self::Use(secret)),
                other => Err(DefinitionError::invalid_format(
                    "use",
                    other.to_string(),
                    "must be the name of a secret",
                )),
            };
        }
        let body = into_object(body, key)?;
        let policy = match key {
            "basic" => Self::Basic(from_object(body)?),
            "bearer" => Self::Bearer(from_object(body)?),
            "digest" => Self::Digest(from_object(body)?),
            "oauth2" => Self::OAuth2(from_object(body)?),
            _ => Self::Oidc(from_object(body)?),
        };
        Ok(policy)
    }

    pub fn to_object(&self) -> Result<Object> {
        let (key, body) = match self {
            Self::Use(secret) => (Self::USE_KEY, Value::String(secret.clone())),
            Self::Basic(s) | Self::Digest(s) => (
                if matches!(self, Self::Basic(_)) { "basic" } else { "digest" },
                Value::Object(to_object(s, "BasicAuthenticationSchemeDefinition")?),
            ),
            Self::Bearer(s) => (
                "bearer",
                Value::Object(to_object(s, "BearerAuthenticationSchemeDefinition")?),
            ),
            Self::OAuth2(s) | Self::Oidc(s) => (
                if matches!(self, Self::OAuth2(_)) { "oauth2" } else { "oidc" },
                Value::Object(to_object(s, "OAuth2AuthenticationSchemeDefinition")?),
            ),
        };
        let mut object = Object::new();
        object.insert(key.to_string(), body);
        Ok(object)
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        match self {
            Self::Use(_) => Ok(()),
            Self::Basic(s) => s.validate(&format!("{field}.basic")),
            Self::Digest(s) => s.validate(&format!("{field}.digest")),
            Self::Bearer(s) => s.validate(&format!("{field}.bearer")),
            Self::OAuth2(s) => s.validate(&format!("{field}.oauth2")),
            Self::Oidc(s) => s.validate(&format!("{field}.oidc")),
        }
    }
}

impl Serialize for AuthenticationPolicyDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AuthenticationPolicyDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(D::Error::custom)
    }
}

/// Username/password credentials, shared by `basic` and `digest`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct BasicAuthenticationSchemeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
}

pub type DigestAuthenticationSchemeDefinition = BasicAuthenticationSchemeDefinition;

impl BasicAuthenticationSchemeDefinition {
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.use_.is_some() {
            if self.username.is_some() || self.password.is_some() {
                return Err(DefinitionError::mutually_exclusive(
                    field,
                    &["use", "username"],
                ));
            }
            return Ok(());
        }
        if self.username.is_none() {
            return Err(DefinitionError::missing(field, "username"));
        }
        if self.password.is_none() {
            return Err(DefinitionError::missing(field, "password"));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct BearerAuthenticationSchemeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
}

impl BearerAuthenticationSchemeDefinition {
    pub fn validate(&self, field: &str) -> Result<()> {
        match (&self.token, &self.use_) {
            (Some(_), Some(_)) => Err(DefinitionError::mutually_exclusive(field, &["token", "use"])),
            (None, None) => Err(DefinitionError::missing(field, "token")),
            _ => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OAuth2GrantType {
    #[serde(rename = "authorization_code")]
    AuthorizationCode,
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "refresh_token")]
    RefreshToken,
    #[serde(rename = "urn:ietf:params:oauth:grant-type:token-exchange")]
    TokenExchange,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OAuth2ClientAuthenticationMethod {
    ClientSecretBasic,
    ClientSecretPost,
    ClientSecretJwt,
    PrivateKeyJwt,
    None,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct OAuth2ClientDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<OAuth2ClientAuthenticationMethod>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OAuth2RequestEncoding {
    #[default]
    #[serde(rename = "application/x-www-form-urlencoded")]
    FormUrlEncoded,
    #[serde(rename = "application/json")]
    Json,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct OAuth2TokenRequestDefinition {
    #[serde(default)]
    pub encoding: OAuth2RequestEncoding,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OAuth2TokenDefinition {
    pub token: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OAuth2AuthenticationEndpointsDefinition {
    #[serde(default = "OAuth2AuthenticationEndpointsDefinition::default_token")]
    pub token: String,
    #[serde(default = "OAuth2AuthenticationEndpointsDefinition::default_revocation")]
    pub revocation: String,
    #[serde(default = "OAuth2AuthenticationEndpointsDefinition::default_introspection")]
    pub introspection: String,
}

impl OAuth2AuthenticationEndpointsDefinition {
    fn default_token() -> String {
        "/oauth2/token".to_string()
    }
    fn default_revocation() -> String {
        "/oauth2/revoke".to_string()
    }
    fn default_introspection() -> String {
        "/oauth2/introspect".to_string()
    }
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for OAuth2AuthenticationEndpointsDefinition {
    fn default() -> Self {
        Self {
            token: Self::default_token(),
            revocation: Self::default_revocation(),
            introspection: Self::default_introspection(),
        }
    }
}

/// Properties of the `oauth2` and `oidc` schemes. `oidc` discovers its
/// endpoints, so `endpoints` is only written when it differs from the
/// defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct OAuth2AuthenticationSchemeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<OAuth2GrantType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<OAuth2ClientDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<OAuth2TokenRequestDefinition>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub issuers: EquatableList<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub scopes: EquatableList<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub audiences: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<OAuth2TokenDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<OAuth2TokenDefinition>,
    #[serde(default, skip_serializing_if = "OAuth2AuthenticationEndpointsDefinition::is_default")]
    pub endpoints: OAuth2AuthenticationEndpointsDefinition,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
}

impl OAuth2AuthenticationSchemeDefinition {
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.use_.is_some() {
            return Ok(());
        }
        let Some(authority) = self.authority.as_deref() else {
            return Err(DefinitionError::missing(field, "authority"));
        };
        validate_uri(&format!("{field}.authority"), authority)?;
        match self.grant {
            None => Err(DefinitionError::missing(field, "grant")),
            Some(OAuth2GrantType::Password) if self.username.is_none() || self.password.is_none() => {
                Err(DefinitionError::missing(field, "username"))
            }
            Some(OAuth2GrantType::TokenExchange) if self.subject.is_none() => {
                Err(DefinitionError::missing(field, "subject"))
            }
            Some(_) => Ok(()),
        }
    }
}
