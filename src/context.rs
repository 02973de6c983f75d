use std::collections::HashMap;

use chrono::FixedOffset;

use crate::attribute_value::AttributeValue;
use crate::user::User;

/// An incoming request as seen by the condition sets: the client address, the timezone activated
/// for it and the authenticated user, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    remote_addr: Option<String>,
    timezone: Option<FixedOffset>,
    user: Option<User>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// The timezone activated for this request, overriding the application default.
    pub fn timezone(&self) -> Option<FixedOffset> {
        self.timezone
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Builder for [Request].
#[derive(Default)]
pub struct RequestBuilder {
    remote_addr: Option<String>,
    timezone: Option<FixedOffset>,
    user: Option<User>,
}

impl RequestBuilder {
    pub fn remote_addr(&mut self, remote_addr: impl Into<String>) -> &mut Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }

    pub fn timezone(&mut self, timezone: FixedOffset) -> &mut Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn user(&mut self, user: User) -> &mut Self {
        self.user = Some(user);
        self
    }

    pub fn build(&self) -> Request {
        Request {
            remote_addr: self.remote_addr.clone(),
            timezone: self.timezone,
            user: self.user.clone(),
        }
    }
}

/// Context is whatever a switch is evaluated against. Each [crate::ConditionSet] knows which
/// variants it can read from and ignores the rest.
#[derive(Clone, Debug, PartialEq)]
pub enum Context {
    Request(Request),
    User(User),
    /// An arbitrary object described by its attributes.
    Object(HashMap<String, AttributeValue>),
}

impl Context {
    /// An object context built from the members of a JSON object; see
    /// [AttributeValue::map_from_json].
    pub fn from_json(value: &serde_json::Value) -> Context {
        Context::Object(AttributeValue::map_from_json(value))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Context::Request(request) => Some(request),
            _ => None,
        }
    }

    /// The user being evaluated: the context itself, or the user attached to a request.
    pub fn user(&self) -> Option<&User> {
        match self {
            Context::User(user) => Some(user),
            Context::Request(request) => request.user(),
            Context::Object(_) => None,
        }
    }

    pub fn timezone(&self) -> Option<FixedOffset> {
        self.as_request().and_then(Request::timezone)
    }

    /// Looks up a named attribute on an object context, or a user attribute otherwise.
    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        match self {
            Context::Object(attributes) => attributes.get(name).cloned(),
            _ => self.user().and_then(|user| user.value_of(name)),
        }
    }
}

impl From<Request> for Context {
    fn from(request: Request) -> Self {
        Context::Request(request)
    }
}

impl From<User> for Context {
    fn from(user: User) -> Self {
        Context::User(user)
    }
}

impl From<HashMap<String, AttributeValue>> for Context {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Context::Object(attributes)
    }
}
