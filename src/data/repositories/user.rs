use bcrypt::{DEFAULT_COST, hash, verify};
use diesel::prelude::*;

use crate::data::models::{NewUser, User};
use crate::schema::users;

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<User>, diesel::result::Error> {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    }

    pub fn verify_password(
        stored_hash: &str,
        input_password: &str,
    ) -> Result<bool, bcrypt::BcryptError> {
        verify(input_password, stored_hash)
    }

    pub fn create_user(
        conn: &mut SqliteConnection,
        email: &str,
        password: &str,
    ) -> Result<User, diesel::result::Error> {
        let hashed_password =
            hash(password, DEFAULT_COST).map_err(|_| diesel::result::Error::RollbackTransaction)?;

        diesel::insert_into(users::table)
            .values(&NewUser {
                email,
                password: &hashed_password,
            })
            .execute(conn)?;

        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
    }

    pub fn email_exists(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<bool, diesel::result::Error> {
        use diesel::dsl::exists;
        use diesel::select;

        select(exists(users::table.filter(users::email.eq(email)))).get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::connection::SimpleConnection;

    fn setup() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.batch_execute(include_str!(
            "../../../migrations/2025-11-02-101500_create_users_and_cards/up.sql"
        ))
        .unwrap();
        conn
    }

    #[test]
    fn create_user_stores_a_verifiable_hash() {
        let mut conn = setup();

        let user = UserRepository::create_user(&mut conn, "ada@example.com", "hunter2longer")
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        // The stored value is a bcrypt hash, never the plaintext.
        assert_ne!(user.password, "hunter2longer");
        assert!(UserRepository::verify_password(&user.password, "hunter2longer").unwrap());
        assert!(!UserRepository::verify_password(&user.password, "wrong-password").unwrap());
    }

    #[test]
    fn email_exists_tracks_registration() {
        let mut conn = setup();

        assert!(!UserRepository::email_exists(&mut conn, "ada@example.com").unwrap());
        UserRepository::create_user(&mut conn, "ada@example.com", "hunter2longer").unwrap();
        assert!(UserRepository::email_exists(&mut conn, "ada@example.com").unwrap());
    }

    #[test]
    fn find_by_email_returns_none_for_unknown_user() {
        let mut conn = setup();

        UserRepository::create_user(&mut conn, "ada@example.com", "hunter2longer").unwrap();

        let found = UserRepository::find_by_email(&mut conn, "ada@example.com").unwrap();
        assert_eq!(found.map(|u| u.user_id), Some(1));
        assert!(
            UserRepository::find_by_email(&mut conn, "nobody@example.com")
                .unwrap()
                .is_none()
        );
    }
}
