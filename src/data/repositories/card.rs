use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::{Card, CardChanges, NewCard};
use crate::scheduler;
use crate::schema::cards;

pub struct CardRepository;

impl CardRepository {
    pub fn create(
        conn: &mut SqliteConnection,
        user_id: i32,
        question: &str,
        answer: &str,
        language: &str,
        tags: &[String],
        now: NaiveDateTime,
    ) -> Result<Card, diesel::result::Error> {
        diesel::insert_into(cards::table)
            .values(&NewCard {
                user_id,
                question,
                answer,
                language,
                tags: encode_tags(tags),
                next_review_at: scheduler::initial_next_review(now),
                created_at: now,
                updated_at: now,
            })
            .execute(conn)?;

        let card_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(conn)?;

        cards::table.find(card_id).first(conn)
    }

    pub fn list_for_user(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<Card>, diesel::result::Error> {
        cards::table
            .filter(cards::user_id.eq(user_id))
            .order(cards::created_at.desc())
            .load(conn)
    }

    pub fn find_owned(
        conn: &mut SqliteConnection,
        card_id: i32,
        user_id: i32,
    ) -> Result<Option<Card>, diesel::result::Error> {
        cards::table
            .filter(cards::card_id.eq(card_id))
            .filter(cards::user_id.eq(user_id))
            .first(conn)
            .optional()
    }

    pub fn update(
        conn: &mut SqliteConnection,
        card_id: i32,
        user_id: i32,
        changes: CardChanges,
    ) -> Result<Option<Card>, diesel::result::Error> {
        conn.transaction(|conn| {
            if Self::find_owned(conn, card_id, user_id)?.is_none() {
                return Ok(None);
            }

            diesel::update(cards::table.find(card_id))
                .set(&changes)
                .execute(conn)?;

            cards::table.find(card_id).first(conn).map(Some)
        })
    }

    pub fn delete(
        conn: &mut SqliteConnection,
        card_id: i32,
        user_id: i32,
    ) -> Result<bool, diesel::result::Error> {
        let deleted = diesel::delete(
            cards::table
                .filter(cards::card_id.eq(card_id))
                .filter(cards::user_id.eq(user_id)),
        )
        .execute(conn)?;

        Ok(deleted > 0)
    }

    pub fn toggle_active(
        conn: &mut SqliteConnection,
        card_id: i32,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Option<Card>, diesel::result::Error> {
        conn.transaction(|conn| {
            let card = match Self::find_owned(conn, card_id, user_id)? {
                Some(card) => card,
                None => return Ok(None),
            };

            diesel::update(cards::table.find(card_id))
                .set((
                    cards::is_active.eq(!card.is_active),
                    cards::updated_at.eq(now),
                ))
                .execute(conn)?;

            cards::table.find(card_id).first(conn).map(Some)
        })
    }

    /// Cards eligible for review: active and already due, most overdue
    /// first.
    pub fn due_for_review(
        conn: &mut SqliteConnection,
        user_id: i32,
        now: NaiveDateTime,
    ) -> Result<Vec<Card>, diesel::result::Error> {
        cards::table
            .filter(cards::user_id.eq(user_id))
            .filter(cards::is_active.eq(true))
            .filter(cards::next_review_at.le(now))
            .order(cards::next_review_at.asc())
            .load(conn)
    }

    /// Applies one review attempt. The read-compute-write runs inside a
    /// transaction so concurrent submissions for the same card cannot
    /// both increment from a stale count.
    pub fn mark_reviewed(
        conn: &mut SqliteConnection,
        card_id: i32,
        user_id: i32,
        was_correct: bool,
        now: NaiveDateTime,
    ) -> Result<Option<Card>, diesel::result::Error> {
        conn.transaction(|conn| {
            let card = match Self::find_owned(conn, card_id, user_id)? {
                Some(card) => card,
                None => return Ok(None),
            };

            let outcome = scheduler::compute_next_review(card.review_count, was_correct, now);

            diesel::update(cards::table.find(card_id))
                .set((
                    cards::review_count.eq(outcome.review_count),
                    cards::next_review_at.eq(outcome.next_review_at),
                    cards::updated_at.eq(now),
                ))
                .execute(conn)?;

            cards::table.find(card_id).first(conn).map(Some)
        })
    }
}

pub fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::NewUser;
    use crate::schema::users;
    use chrono::{Days, NaiveDate};
    use diesel::connection::SimpleConnection;

    fn setup() -> (SqliteConnection, i32) {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.batch_execute(include_str!(
            "../../../migrations/2025-11-02-101500_create_users_and_cards/up.sql"
        ))
        .unwrap();

        diesel::insert_into(users::table)
            .values(&NewUser {
                email: "test@example.com",
                password: "not-a-real-hash",
            })
            .execute(&mut conn)
            .unwrap();

        let user_id = users::table
            .select(users::user_id)
            .first::<i32>(&mut conn)
            .unwrap();

        (conn, user_id)
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_card_is_due_one_day_out_with_zero_reviews() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 3, 14);

        let card = CardRepository::create(
            &mut conn,
            user_id,
            "What does `?` do",
            "Propagates the error to the caller",
            "rust",
            &["errors".to_string()],
            now,
        )
        .unwrap();

        assert_eq!(card.review_count, 0);
        assert!(card.is_active);
        assert_eq!(card.next_review_at, at(2024, 3, 15));
        assert_eq!(card.tags, r#"["errors"]"#);
    }

    #[test]
    fn due_query_orders_most_overdue_first() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 3, 10);

        // Created in a scrambled order on purpose.
        for day in [1, 3, 2] {
            let card =
                CardRepository::create(&mut conn, user_id, "q", "a", "rust", &[], now).unwrap();
            diesel::update(cards::table.find(card.card_id))
                .set(cards::next_review_at.eq(at(2024, 3, day)))
                .execute(&mut conn)
                .unwrap();
        }

        let due = CardRepository::due_for_review(&mut conn, user_id, now).unwrap();
        let days: Vec<u32> = due
            .iter()
            .map(|c| {
                use chrono::Datelike;
                c.next_review_at.date().day()
            })
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn due_query_skips_inactive_and_future_cards() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 3, 10);

        let due = CardRepository::create(&mut conn, user_id, "q1", "a", "rust", &[], now).unwrap();
        let inactive =
            CardRepository::create(&mut conn, user_id, "q2", "a", "rust", &[], now).unwrap();
        // Third card keeps its creation schedule of now + 1 day: not due yet.
        CardRepository::create(&mut conn, user_id, "q3", "a", "rust", &[], now).unwrap();

        for id in [due.card_id, inactive.card_id] {
            diesel::update(cards::table.find(id))
                .set(cards::next_review_at.eq(now - Days::new(1)))
                .execute(&mut conn)
                .unwrap();
        }
        CardRepository::toggle_active(&mut conn, inactive.card_id, user_id, now).unwrap();

        let found = CardRepository::due_for_review(&mut conn, user_id, now).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].card_id, due.card_id);
    }

    #[test]
    fn mark_reviewed_applies_the_schedule() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 1, 30);

        let card = CardRepository::create(&mut conn, user_id, "q", "a", "go", &[], now).unwrap();
        diesel::update(cards::table.find(card.card_id))
            .set(cards::review_count.eq(1))
            .execute(&mut conn)
            .unwrap();

        let updated = CardRepository::mark_reviewed(&mut conn, card.card_id, user_id, true, now)
            .unwrap()
            .unwrap();

        assert_eq!(updated.review_count, 2);
        // 3-day interval across the month boundary.
        assert_eq!(updated.next_review_at, at(2024, 2, 2));
    }

    #[test]
    fn mark_reviewed_increments_count_on_failure() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 6, 1);

        let card = CardRepository::create(&mut conn, user_id, "q", "a", "go", &[], now).unwrap();
        diesel::update(cards::table.find(card.card_id))
            .set(cards::review_count.eq(4))
            .execute(&mut conn)
            .unwrap();

        let updated = CardRepository::mark_reviewed(&mut conn, card.card_id, user_id, false, now)
            .unwrap()
            .unwrap();

        assert_eq!(updated.review_count, 5);
        assert_eq!(updated.next_review_at, at(2024, 6, 2));
    }

    #[test]
    fn mark_reviewed_rejects_foreign_card() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 6, 1);

        let card = CardRepository::create(&mut conn, user_id, "q", "a", "c", &[], now).unwrap();
        let other_user = user_id + 1;

        let result =
            CardRepository::mark_reviewed(&mut conn, card.card_id, other_user, true, now).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn update_changes_only_provided_fields() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 6, 1);

        let card =
            CardRepository::create(&mut conn, user_id, "old q", "old a", "rust", &[], now).unwrap();

        let updated = CardRepository::update(
            &mut conn,
            card.card_id,
            user_id,
            CardChanges {
                question: Some("new q".into()),
                answer: None,
                language: None,
                tags: None,
                updated_at: at(2024, 6, 2),
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.question, "new q");
        assert_eq!(updated.answer, "old a");
        assert_eq!(updated.updated_at, at(2024, 6, 2));
    }

    #[test]
    fn delete_is_scoped_to_owner() {
        let (mut conn, user_id) = setup();
        let now = at(2024, 6, 1);

        let card = CardRepository::create(&mut conn, user_id, "q", "a", "c", &[], now).unwrap();

        assert!(!CardRepository::delete(&mut conn, card.card_id, user_id + 1).unwrap());
        assert!(CardRepository::delete(&mut conn, card.card_id, user_id).unwrap());
        assert!(
            CardRepository::find_owned(&mut conn, card.card_id, user_id)
                .unwrap()
                .is_none()
        );
    }
}
