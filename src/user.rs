use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::attribute_value::AttributeValue;

const USER_CUSTOM_STARTING_CAPACITY: usize = 10;

/// User is the account on whose behalf a switch is evaluated.
///
/// Anonymous users have no id; they can still be targeted through the `is_anonymous` field.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    id: Option<i64>,
    username: String,
    email: Option<String>,
    is_staff: bool,
    is_superuser: bool,
    date_joined: Option<NaiveDateTime>,
    anonymous: bool,
    custom: HashMap<String, AttributeValue>,
}

impl User {
    /// Create a new [UserBuilder], seeding it with the provided user id.
    pub fn with_id(id: i64) -> UserBuilder {
        UserBuilder::new(id)
    }

    /// An anonymous user: no id, no username, no privileges.
    pub fn anonymous() -> User {
        User {
            id: None,
            username: String::new(),
            email: None,
            is_staff: false,
            is_superuser: false,
            date_joined: None,
            anonymous: true,
            custom: HashMap::new(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn date_joined(&self) -> Option<NaiveDateTime> {
        self.date_joined
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Return the value of the attribute named `attr`.
    pub fn value_of(&self, attr: &str) -> Option<AttributeValue> {
        match attr {
            "id" => self.id.map(AttributeValue::from),
            "username" => Some(AttributeValue::from(self.username.as_str())),
            "email" => self.email.as_deref().map(AttributeValue::from),
            "is_staff" => Some(AttributeValue::Bool(self.is_staff)),
            "is_superuser" => Some(AttributeValue::Bool(self.is_superuser)),
            "is_anonymous" => Some(AttributeValue::Bool(self.anonymous)),
            "date_joined" => self.date_joined.map(AttributeValue::DateTime),
            _ => self.custom.get(attr).cloned(),
        }
    }
}

/// Builder for [User].
pub struct UserBuilder {
    id: i64,
    username: String,
    email: Option<String>,
    is_staff: bool,
    is_superuser: bool,
    date_joined: Option<NaiveDateTime>,
    custom: HashMap<String, AttributeValue>,
}

impl UserBuilder {
    /// Create a new user builder, setting the user id to `id`.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            username: String::new(),
            email: None,
            is_staff: false,
            is_superuser: false,
            date_joined: None,
            custom: HashMap::with_capacity(USER_CUSTOM_STARTING_CAPACITY),
        }
    }

    pub fn username(&mut self, username: impl Into<String>) -> &mut Self {
        self.username = username.into();
        self
    }

    pub fn email(&mut self, email: impl Into<String>) -> &mut Self {
        self.email = Some(email.into());
        self
    }

    pub fn staff(&mut self, is_staff: bool) -> &mut Self {
        self.is_staff = is_staff;
        self
    }

    pub fn superuser(&mut self, is_superuser: bool) -> &mut Self {
        self.is_superuser = is_superuser;
        self
    }

    pub fn date_joined(&mut self, date_joined: NaiveDateTime) -> &mut Self {
        self.date_joined = Some(date_joined);
        self
    }

    /// Set the custom attributes for this builder instance.
    pub fn custom(&mut self, custom: HashMap<String, AttributeValue>) -> &mut Self {
        self.custom.extend(custom);
        self
    }

    /// Create a new [User] instance.
    pub fn build(&self) -> User {
        User {
            id: Some(self.id),
            username: self.username.clone(),
            email: self.email.clone(),
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            date_joined: self.date_joined,
            anonymous: false,
            custom: self.custom.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;
    use spectral::prelude::*;

    #[test]
    fn builder_sets_attributes() {
        let user = User::with_id(25)
            .username("test.user")
            .email("test@email.com")
            .staff(true)
            .custom(hashmap! {"team".into() => "Avengers".into()})
            .build();

        assert_that!(user.id()).contains_value(25);
        assert_that!(user.value_of("username")).contains_value(AttributeValue::from("test.user"));
        assert_that!(user.value_of("email")).contains_value(AttributeValue::from("test@email.com"));
        assert_that!(user.value_of("is_staff")).contains_value(AttributeValue::Bool(true));
        assert_that!(user.value_of("is_superuser")).contains_value(AttributeValue::Bool(false));
        assert_that!(user.value_of("is_anonymous")).contains_value(AttributeValue::Bool(false));
        assert_that!(user.value_of("team")).contains_value(AttributeValue::from("Avengers"));
        assert_that!(user.value_of("date_joined")).is_none();
    }

    #[test]
    fn anonymous_user_has_no_id() {
        let user = User::anonymous();
        assert!(user.is_anonymous());
        assert_that!(user.value_of("id")).is_none();
        assert_that!(user.value_of("email")).is_none();
    }
}
