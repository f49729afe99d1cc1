use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::search::{escape_like, SearchFilter, SearchTerm, SortOrder};

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub avatar: String,
    pub location_address: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub availability_days: Vec<String>,
    pub availability_time_slots: Vec<String>,
    pub is_public: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Repo-level profile patch; `None` leaves the column untouched. Set-once
/// fields like coordinates can be replaced but not cleared through this
/// surface.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub location_address: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub availability_days: Option<Vec<String>>,
    pub availability_time_slots: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, avatar, \
     location_address, location_lat, location_lng, skills_offered, skills_wanted, \
     availability_days, availability_time_slots, is_public, created_at, updated_at";

pub async fn create(
    db: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    full_name: &str,
) -> Result<User, sqlx::Error> {
    let query = format!(
        "INSERT INTO users (username, email, password_hash, full_name) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&query)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(db)
        .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_public_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_public = TRUE");
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    sqlx::query_as::<_, User>(&query)
        .bind(username.to_lowercase())
        .fetch_optional(db)
        .await
}

pub async fn find_public_by_username(
    db: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query =
        format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_public = TRUE");
    sqlx::query_as::<_, User>(&query)
        .bind(username.to_lowercase())
        .fetch_optional(db)
        .await
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &SearchFilter) {
    qb.push(" WHERE is_public = TRUE");

    match &filter.term {
        Some(SearchTerm::Username(username)) => {
            qb.push(" AND username = ").push_bind(username.clone());
        }
        Some(SearchTerm::Text(text)) => {
            let pattern = format!("%{}%", escape_like(text));
            qb.push(" AND (full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(skills_offered) skill WHERE skill ILIKE ")
                .push_bind(pattern.clone())
                .push(") OR EXISTS (SELECT 1 FROM unnest(skills_wanted) skill WHERE skill ILIKE ")
                .push_bind(pattern)
                .push("))");
        }
        None => {}
    }

    if let Some(skill) = &filter.skill {
        let pattern = format!("%{}%", escape_like(skill));
        qb.push(" AND (EXISTS (SELECT 1 FROM unnest(skills_offered) skill WHERE skill ILIKE ")
            .push_bind(pattern.clone())
            .push(") OR EXISTS (SELECT 1 FROM unnest(skills_wanted) skill WHERE skill ILIKE ")
            .push_bind(pattern)
            .push("))");
    }

    if let Some(day) = &filter.day {
        qb.push(" AND ")
            .push_bind(day.clone())
            .push(" = ANY(availability_days)");
    }

    if let Some(slot) = &filter.time_slot {
        qb.push(" AND ")
            .push_bind(slot.clone())
            .push(" = ANY(availability_time_slots)");
    }
}

fn build_search_query(
    filter: &SearchFilter,
    origin: Option<(f64, f64)>,
    limit: i64,
    offset: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> =
        QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_filters(&mut qb, filter);

    match (filter.sort, origin) {
        (SortOrder::Nearest, Some((lat, lng))) => {
            // Haversine distance in km; profiles without coordinates sort last.
            // The acos argument is clamped to [-1, 1] since float rounding can
            // push it out of acos' domain for near-identical or near-antipodal
            // points.
            qb.push(" ORDER BY (6371 * acos(least(1.0, greatest(-1.0, cos(radians(")
                .push_bind(lat)
                .push(")) * cos(radians(location_lat)) * cos(radians(location_lng) - radians(")
                .push_bind(lng)
                .push(")) + sin(radians(")
                .push_bind(lat)
                .push(")) * sin(radians(location_lat)))))) ASC NULLS LAST, created_at DESC");
        }
        _ => {
            qb.push(" ORDER BY created_at DESC");
        }
    }

    qb.push(" LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    qb
}

/// Directory page. `origin` is the requester's own coordinates; `nearest`
/// sort silently falls back to newest-first without it.
pub async fn search(
    db: &PgPool,
    filter: &SearchFilter,
    origin: Option<(f64, f64)>,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    let mut qb = build_search_query(filter, origin, limit, offset);
    qb.build_query_as::<User>().fetch_all(db).await
}

pub async fn count_search(db: &PgPool, filter: &SearchFilter) -> Result<i64, sqlx::Error> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_filters(&mut qb, filter);
    qb.build_query_scalar::<i64>().fetch_one(db).await
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    patch: &ProfilePatch,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!(
        "UPDATE users SET \
            full_name = COALESCE($2, full_name), \
            location_address = COALESCE($3, location_address), \
            location_lat = COALESCE($4, location_lat), \
            location_lng = COALESCE($5, location_lng), \
            skills_offered = COALESCE($6, skills_offered), \
            skills_wanted = COALESCE($7, skills_wanted), \
            availability_days = COALESCE($8, availability_days), \
            availability_time_slots = COALESCE($9, availability_time_slots), \
            is_public = COALESCE($10, is_public), \
            updated_at = now() \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .bind(&patch.full_name)
        .bind(&patch.location_address)
        .bind(patch.location_lat)
        .bind(patch.location_lng)
        .bind(&patch.skills_offered)
        .bind(&patch.skills_wanted)
        .bind(&patch.availability_days)
        .bind(&patch.availability_time_slots)
        .bind(patch.is_public)
        .fetch_optional(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(term: Option<SearchTerm>, sort: SortOrder) -> SearchFilter {
        SearchFilter {
            term,
            skill: None,
            day: None,
            time_slot: None,
            sort,
        }
    }

    #[test]
    fn nearest_sort_clamps_acos_argument_on_both_sides() {
        let sql = build_search_query(
            &filter(None, SortOrder::Nearest),
            Some((38.72, -9.14)),
            10,
            0,
        )
        .into_sql();
        assert!(sql.contains("least(1.0, greatest(-1.0,"));
        assert!(sql.contains("NULLS LAST"));
    }

    #[test]
    fn nearest_sort_without_origin_falls_back_to_newest_first() {
        let sql = build_search_query(&filter(None, SortOrder::Nearest), None, 10, 0).into_sql();
        assert!(!sql.contains("acos"));
        assert!(sql.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn username_term_matches_exactly_not_by_pattern() {
        let sql = build_search_query(
            &filter(
                Some(SearchTerm::Username("alice".into())),
                SortOrder::CreatedAt,
            ),
            None,
            10,
            0,
        )
        .into_sql();
        assert!(sql.contains("username = "));
        assert!(!sql.contains("ILIKE"));
    }
}
