use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use tracing::instrument;

use crate::entity::{editor, post};
use crate::error::PostResult;
use crate::models::{EditorRole, Post, PostStatus, SearchFilter};
use crate::repository::PostRepository;

/// Postgres-backed implementation of [`PostRepository`].
#[derive(Clone)]
pub struct PgPostRepository {
    db: DatabaseConnection,
}

impl PgPostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Base query for posts eligible for indexing and search:
    /// not soft-deleted and publicly visible.
    fn eligible() -> Select<post::Entity> {
        post::Entity::find()
            .filter(post::Column::DeletedAt.is_null())
            .filter(post::Column::Status.eq(PostStatus::Public))
    }

    fn apply_filter(query: Select<post::Entity>, filter: &SearchFilter) -> Select<post::Entity> {
        let mut query = query;

        if let Some(team_id) = filter.team_id {
            query = query.filter(post::Column::TeamId.eq(team_id));
        }

        if let Some(author_id) = filter.author_id {
            query = query
                .join(JoinType::InnerJoin, post::Relation::Editors.def())
                .filter(editor::Column::Role.eq(EditorRole::Owner))
                .filter(editor::Column::UserId.eq(author_id))
                .distinct();
        }

        query
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self), fields(restricted = post_ids.is_some()))]
    async fn find_eligible(&self, post_ids: Option<Vec<i64>>) -> PostResult<Vec<Post>> {
        let mut query = Self::eligible();

        if let Some(ids) = post_ids {
            query = query.filter(post::Column::Id.is_in(ids));
        }

        let models = query
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await?;

        tracing::debug!(count = models.len(), "Fetched eligible posts");
        Ok(models.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self, post_ids), fields(candidates = post_ids.len()))]
    async fn find_visible_ids(
        &self,
        post_ids: &[i64],
        filter: &SearchFilter,
    ) -> PostResult<Vec<i64>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = Self::apply_filter(
            Self::eligible().filter(post::Column::Id.is_in(post_ids.to_vec())),
            filter,
        );

        let ids = query
            .select_only()
            .column(post::Column::Id)
            .order_by_asc(post::Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    #[instrument(skip(self, query))]
    async fn keyword_search_ids(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> PostResult<Vec<i64>> {
        let pattern = format!("%{}%", query);

        let text_match = Condition::any()
            .add(Expr::col((post::Entity, post::Column::Title)).ilike(pattern.clone()))
            .add(Expr::col((post::Entity, post::Column::Content)).ilike(pattern));

        let ids = Self::apply_filter(Self::eligible().filter(text_match), filter)
            .select_only()
            .column(post::Column::Id)
            .order_by_asc(post::Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        tracing::debug!(matches = ids.len(), "Keyword search completed");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn count_eligible(&self) -> PostResult<u64> {
        let count = Self::eligible().count(&self.db).await?;
        Ok(count)
    }
}
