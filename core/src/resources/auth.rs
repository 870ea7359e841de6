//! Sessions, two-factor authentication and user management.

use serde_json::{json, Value};

use super::{bag, merge, str_field};
use crate::error::Result;
use crate::rpc::Params;
use crate::validation::{validate_required_field, validate_two_factor_code};

resource!(
    /// `auth.*` procedures.
    Auth
);

impl Auth {
    pub fn get_user(&self) -> Result<Value> {
        self.client.get("auth.getUser", Params::new())
    }

    pub fn get_session(&self) -> Result<Value> {
        self.client.get("auth.getSession", Params::new())
    }

    /// Exchanges credentials for a session token.
    pub fn login(&self, email: &str, password: &str) -> Result<Value> {
        validate_required_field(Some(email), "email")?;
        validate_required_field(Some(password), "password")?;
        self.client.post(
            "auth.login",
            bag([("email", json!(email)), ("password", json!(password))]),
        )
    }

    pub fn logout(&self) -> Result<Value> {
        self.client.post("auth.logout", Params::new())
    }
}

resource!(
    /// `twoFactor.*` procedures.
    TwoFactor
);

impl TwoFactor {
    /// Starts enrollment; the response carries the TOTP secret.
    pub fn configure(&self) -> Result<Value> {
        self.client.post("twoFactor.configure", Params::new())
    }

    pub fn enable(&self, code: &str) -> Result<Value> {
        validate_required_field(Some(code), "code")?;
        validate_two_factor_code(code)?;
        self.client.post("twoFactor.enable", bag([("code", json!(code))]))
    }

    pub fn disable(&self) -> Result<Value> {
        self.client.post("twoFactor.disable", Params::new())
    }
}

resource!(
    /// `users.*` procedures.
    Users
);

impl Users {
    pub fn list_users(&self) -> Result<Value> {
        self.client.get("users.listUsers", Params::new())
    }

    pub fn generate_api_token(&self, name: &str) -> Result<Value> {
        validate_required_field(Some(name), "name")?;
        self.client
            .post("users.generateApiToken", bag([("name", json!(name))]))
    }

    pub fn revoke_api_token(&self, token_id: &str) -> Result<Value> {
        validate_required_field(Some(token_id), "tokenId")?;
        self.client
            .delete("users.revokeApiToken", bag([("tokenId", json!(token_id))]))
    }

    /// `user` must carry `email` and `password`.
    pub fn create_user(&self, user: Params) -> Result<Value> {
        validate_required_field(str_field(&user, "email"), "email")?;
        validate_required_field(str_field(&user, "password"), "password")?;
        self.client.post("users.createUser", user)
    }

    pub fn update_user(&self, user_id: &str, changes: Params) -> Result<Value> {
        validate_required_field(Some(user_id), "userId")?;
        self.client.patch(
            "users.updateUser",
            merge(bag([("userId", json!(user_id))]), changes),
        )
    }

    pub fn destroy_user(&self, user_id: &str) -> Result<Value> {
        validate_required_field(Some(user_id), "userId")?;
        self.client
            .delete("users.destroyUser", bag([("userId", json!(user_id))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::HttpMethod;
    use crate::testing::{bag as json_bag, last_call, recording_client};

    #[test]
    fn login_posts_credentials() {
        let (transport, client) = recording_client();
        Auth::new(client)
            .login("admin@example.com", "hunter2")
            .unwrap();
        let (procedure, params) = last_call(&transport);
        assert_eq!(procedure, "auth.login");
        assert_eq!(params, json!({"email": "admin@example.com", "password": "hunter2"}));
    }

    #[test]
    fn two_factor_code_is_checked_before_sending() {
        let (transport, client) = recording_client();
        let two_factor = TwoFactor::new(client);
        let err = two_factor.enable("12ab56").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(transport.requests().is_empty());

        two_factor.enable("123456").unwrap();
        assert_eq!(last_call(&transport).1, json!({"code": "123456"}));
    }

    #[test]
    fn create_user_requires_email_and_password() {
        let (transport, client) = recording_client();
        let users = Users::new(client);
        let err = users
            .create_user(json_bag(json!({"email": "a@example.com"})))
            .unwrap_err();
        assert_eq!(err.message(), "Required field 'password' is missing or empty");
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn revoke_token_uses_delete_with_body() {
        let (transport, client) = recording_client();
        Users::new(client).revoke_api_token("tok_1").unwrap();
        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(last_call(&transport).1, json!({"tokenId": "tok_1"}));
    }

    #[test]
    fn update_user_puts_user_id_first() {
        let (transport, client) = recording_client();
        Users::new(client)
            .update_user("u1", json_bag(json!({"admin": true})))
            .unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Patch);
        assert_eq!(last_call(&transport).1, json!({"userId": "u1", "admin": true}));
    }
}
