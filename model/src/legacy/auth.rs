// Legacy authentication definitions. The shape of `properties` depends on
// `scheme`, so the definition is converted by hand rather than derived.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use swdsl_base::error::{DefinitionError, Result};
use swdsl_base::object::{Object, from_object, into_object, to_object};
use swdsl_base::{EquatableList, EquatableMap, OneOf};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthenticationScheme {
    #[default]
    Basic,
    Bearer,
    Oauth2,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BasicPropertiesDefinition {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BearerPropertiesDefinition {
    pub token: String,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OAuth2GrantType {
    Password,
    ClientCredentials,
    TokenExchange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2PropertiesDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    pub grant_type: OAuth2GrantType,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub scopes: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableList::is_empty")]
    pub audiences: EquatableList<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_issuer: Option<String>,
    #[serde(default, skip_serializing_if = "EquatableMap::is_empty")]
    pub metadata: EquatableMap<String, String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthenticationPropertiesDefinition {
    Basic(BasicPropertiesDefinition),
    Bearer(BearerPropertiesDefinition),
    OAuth2(OAuth2PropertiesDefinition),
}

impl AuthenticationPropertiesDefinition {
    pub fn scheme(&self) -> AuthenticationScheme {
        match self {
            Self::Basic(_) => AuthenticationScheme::Basic,
            Self::Bearer(_) => AuthenticationScheme::Bearer,
            Self::OAuth2(_) => AuthenticationScheme::Oauth2,
        }
    }

    fn parse(scheme: AuthenticationScheme, object: Object) -> Result<Self> {
        Ok(match scheme {
            AuthenticationScheme::Basic => Self::Basic(from_object(object)?),
            AuthenticationScheme::Bearer => Self::Bearer(from_object(object)?),
            AuthenticationScheme::Oauth2 => Self::OAuth2(from_object(object)?),
        })
    }

    fn to_value(&self) -> Result<Value> {
        let object = match self {
            Self::Basic(p) => to_object(p, "BasicPropertiesDefinition")?,
            Self::Bearer(p) => to_object(p, "BearerPropertiesDefinition")?,
            Self::OAuth2(p) => to_object(p, "OAuth2PropertiesDefinition")?,
        };
        Ok(Value::Object(object))
    }
}

/// Named authentication entry; `properties` is either inline or the name of
/// a secret holding them.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticationDefinition {
    pub name: String,
    pub properties: OneOf<AuthenticationPropertiesDefinition, String>,
}

impl AuthenticationDefinition {
    /// `None` when the properties come from a secret and the scheme was
    /// therefore never materialized.
    pub fn scheme(&self) -> Option<AuthenticationScheme> {
        self.properties.first().map(|p| p.scheme())
    }

    pub fn from_value(node: Value) -> Result<Self> {
        let mut object = into_object(node, "AuthenticationDefinition")?;
        let name = match object.remove("name") {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(DefinitionError::invalid_format(
                    "name",
                    other.to_string(),
                    "must be a string",
                ));
            }
            None => return Err(DefinitionError::missing("AuthenticationDefinition", "name")),
        };
        let scheme = match object.remove("scheme") {
            None => AuthenticationScheme::default(),
            Some(Value::String(text)) => text.parse().map_err(|_| {
                DefinitionError::invalid_format("scheme", text.as_str(), "unknown scheme")
            })?,
            Some(other) => {
                return Err(DefinitionError::invalid_format(
                    "scheme",
                    other.to_string(),
                    "must be a string",
                ));
            }
        };
        let properties = match object.remove("properties") {
            None => {
                return Err(DefinitionError::missing(
                    "AuthenticationDefinition",
                    "properties",
                ));
            }
            Some(Value::String(secret)) => OneOf::from_second(secret),
            Some(other) => {
                let props = into_object(other, "AuthenticationPropertiesDefinition")?;
                OneOf::from_first(
                    AuthenticationPropertiesDefinition::parse(scheme, props)
                        .map_err(|e| e.within("properties"))?,
                )
            }
        };
        Ok(Self { name, properties })
    }

    pub fn to_object(&self) -> Result<Object> {
        let mut object = Object::new();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        match &self.properties {
            OneOf::First(props) => {
                object.insert("scheme".to_string(), Value::String(props.scheme().to_string()));
                object.insert("properties".to_string(), props.to_value()?);
            }
            OneOf::Second(secret) => {
                object.insert("properties".to_string(), Value::String(secret.clone()));
            }
        }
        Ok(object)
    }
}

impl Serialize for AuthenticationDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AuthenticationDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(node).map_err(D::Error::custom)
    }
}
