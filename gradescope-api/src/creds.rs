use std::fmt;

/// Login credentials. They are handed to an unauthenticated client and dropped as soon as the login
/// succeeds.
pub struct Creds {
    email: String,
    password: String,
}

impl Creds {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Creds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creds")
            .field("email", &self.email)
            .field("password", &"<hidden>")
            .finish()
    }
}
