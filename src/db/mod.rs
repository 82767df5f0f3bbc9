use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub mod comment;
pub mod event;
pub mod post;
pub mod ticket;
pub mod user;

pub use comment::CommentHandler;
pub use event::EventHandler;
pub use post::PostHandler;
pub use ticket::TicketHandler;
pub use user::UserHandler;

/// Page size applied when `page` is requested without an explicit `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 12;

/// Creates the process-wide connection pool. Constructed once at startup
/// and injected into every handler.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Appends LIMIT/OFFSET clauses for the optional `page`/`limit` pair.
/// Pages are 1-based and consecutive pages return disjoint rows. The
/// offset arithmetic saturates, so an absurdly large page number yields
/// an empty page instead of an overflow.
pub(crate) fn push_pagination(
    builder: &mut QueryBuilder<'_, Postgres>,
    page: Option<i64>,
    limit: Option<i64>,
) {
    if page.is_none() && limit.is_none() {
        return;
    }

    let effective_limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    builder.push(" LIMIT ").push_bind(effective_limit);

    if let Some(page) = page {
        let offset = page.saturating_sub(1).saturating_mul(effective_limit);
        builder.push(" OFFSET ").push_bind(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pagination_adds_no_clause() {
        let mut builder = QueryBuilder::new("SELECT 1");
        push_pagination(&mut builder, None, None);
        assert_eq!(builder.sql(), "SELECT 1");
    }

    #[test]
    fn limit_alone_adds_limit_only() {
        let mut builder = QueryBuilder::new("SELECT 1");
        push_pagination(&mut builder, None, Some(20));
        assert_eq!(builder.sql(), "SELECT 1 LIMIT $1");
    }

    #[test]
    fn page_implies_offset_and_default_limit() {
        let mut builder = QueryBuilder::new("SELECT 1");
        push_pagination(&mut builder, Some(3), None);
        assert_eq!(builder.sql(), "SELECT 1 LIMIT $1 OFFSET $2");
    }

    #[test]
    fn extreme_page_saturates_instead_of_overflowing() {
        let mut builder = QueryBuilder::new("SELECT 1");
        push_pagination(&mut builder, Some(i64::MAX), Some(100));
        assert_eq!(builder.sql(), "SELECT 1 LIMIT $1 OFFSET $2");
    }
}
