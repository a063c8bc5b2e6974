use crate::database::{LockClass, advisory_xact_lock};
use crate::entities::{
    PromotionState, discount_product_promotion_entity as discount_promos,
    free_product_promotion_entity as free_promos, inventory_entity as inventories,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::admin_access::check_admin_access;
use crate::utils::promotion_rules::{
    ensure_editable, ensure_not_ended, find_window_conflict, validate_discount,
    validate_state_transition, validate_window,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

async fn authorize_inventory<C: ConnectionTrait>(
    conn: &C,
    actor: &AuthUser,
    inventory_id: i64,
) -> AppResult<()> {
    let inventory = inventories::Entity::find_by_id(inventory_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventaris tidak ditemukan".to_string()))?;
    check_admin_access(conn, actor.role, actor.id, inventory.store_id).await
}

fn validate_initial_state(state: PromotionState) -> AppResult<()> {
    if state == PromotionState::Archived {
        return Err(AppError::ValidationError(
            "Promosi baru harus berstatus draft atau published".to_string(),
        ));
    }
    Ok(())
}

fn validate_quantities(buy_quantity: i32, free_quantity: i32) -> AppResult<()> {
    if buy_quantity < 1 || free_quantity < 1 {
        return Err(AppError::ValidationError(
            "Jumlah beli dan jumlah gratis minimal 1".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_free_window_available<C: ConnectionTrait>(
    conn: &C,
    candidate_id: Option<i64>,
    inventory_id: i64,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> AppResult<()> {
    ensure_not_ended(finished_at, Utc::now())?;
    advisory_xact_lock(conn, LockClass::FreeProductPromotion, inventory_id).await?;
    let published = free_promos::Entity::find()
        .filter(free_promos::Column::InventoryId.eq(inventory_id))
        .filter(free_promos::Column::State.eq(PromotionState::Published))
        .all(conn)
        .await?;
    find_window_conflict(
        candidate_id,
        started_at,
        finished_at,
        published
            .into_iter()
            .map(|p| (p.id, p.started_at, p.finished_at)),
    )
}

async fn ensure_discount_window_available<C: ConnectionTrait>(
    conn: &C,
    candidate_id: Option<i64>,
    inventory_id: i64,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> AppResult<()> {
    ensure_not_ended(finished_at, Utc::now())?;
    advisory_xact_lock(conn, LockClass::DiscountProductPromotion, inventory_id).await?;
    let published = discount_promos::Entity::find()
        .filter(discount_promos::Column::InventoryId.eq(inventory_id))
        .filter(discount_promos::Column::State.eq(PromotionState::Published))
        .all(conn)
        .await?;
    find_window_conflict(
        candidate_id,
        started_at,
        finished_at,
        published
            .into_iter()
            .map(|p| (p.id, p.started_at, p.finished_at)),
    )
}

/// Free-product (buy X get Y) and discount-product promotions, both bound to one
/// inventory row.
#[derive(Clone)]
pub struct ProductPromotionService {
    pool: Arc<DatabaseConnection>,
}

impl ProductPromotionService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    // ---- free product ----

    pub async fn create_free_product_promotion(
        &self,
        actor: AuthUser,
        req: CreateFreeProductPromotionRequest,
    ) -> AppResult<FreeProductPromotionResponse> {
        let state = req.state.unwrap_or(PromotionState::Draft);
        validate_initial_state(state)?;
        validate_window(req.started_at, req.finished_at)?;
        validate_quantities(req.buy_quantity, req.free_quantity)?;

        let txn = self.pool.begin().await?;
        authorize_inventory(&txn, &actor, req.inventory_id).await?;
        if state == PromotionState::Published {
            ensure_free_window_available(
                &txn,
                None,
                req.inventory_id,
                req.started_at,
                req.finished_at,
            )
            .await?;
        }

        let created = free_promos::ActiveModel {
            inventory_id: Set(req.inventory_id),
            state: Set(state),
            buy_quantity: Set(req.buy_quantity),
            free_quantity: Set(req.free_quantity),
            started_at: Set(req.started_at),
            finished_at: Set(req.finished_at),
            created_by: Set(actor.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(FreeProductPromotionResponse::from(created))
    }

    pub async fn update_free_product_promotion(
        &self,
        actor: AuthUser,
        promotion_id: i64,
        req: UpdateFreeProductPromotionRequest,
    ) -> AppResult<FreeProductPromotionResponse> {
        let txn = self.pool.begin().await?;
        let current = free_promos::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;
        authorize_inventory(&txn, &actor, current.inventory_id).await?;
        ensure_editable(current.state)?;

        let buy_quantity = req.buy_quantity.unwrap_or(current.buy_quantity);
        let free_quantity = req.free_quantity.unwrap_or(current.free_quantity);
        let started_at = req.started_at.unwrap_or(current.started_at);
        let finished_at = req.finished_at.unwrap_or(current.finished_at);
        validate_quantities(buy_quantity, free_quantity)?;
        validate_window(started_at, finished_at)?;

        let window_changed = started_at != current.started_at || finished_at != current.finished_at;
        if current.state == PromotionState::Published && window_changed {
            ensure_free_window_available(
                &txn,
                Some(current.id),
                current.inventory_id,
                started_at,
                finished_at,
            )
            .await?;
        }

        let mut am = current.into_active_model();
        am.buy_quantity = Set(buy_quantity);
        am.free_quantity = Set(free_quantity);
        am.started_at = Set(started_at);
        am.finished_at = Set(finished_at);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        Ok(FreeProductPromotionResponse::from(updated))
    }

    pub async fn update_free_product_promotion_state(
        &self,
        actor: AuthUser,
        promotion_id: i64,
        state: PromotionState,
    ) -> AppResult<FreeProductPromotionResponse> {
        let txn = self.pool.begin().await?;
        let current = free_promos::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;
        authorize_inventory(&txn, &actor, current.inventory_id).await?;
        validate_state_transition(current.state, state)?;

        if state == PromotionState::Published {
            ensure_free_window_available(
                &txn,
                Some(current.id),
                current.inventory_id,
                current.started_at,
                current.finished_at,
            )
            .await?;
        }

        let mut am = current.into_active_model();
        am.state = Set(state);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        Ok(FreeProductPromotionResponse::from(updated))
    }

    pub async fn get_free_product_promotion(
        &self,
        promotion_id: i64,
    ) -> AppResult<FreeProductPromotionResponse> {
        free_promos::Entity::find_by_id(promotion_id)
            .one(self.pool.as_ref())
            .await?
            .map(FreeProductPromotionResponse::from)
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))
    }

    pub async fn list_free_product_promotions(
        &self,
        query: &ProductPromotionQuery,
    ) -> AppResult<PaginatedResponse<FreeProductPromotionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut select = free_promos::Entity::find();
        if let Some(inventory_id) = query.inventory_id {
            select = select.filter(free_promos::Column::InventoryId.eq(inventory_id));
        }
        if let Some(state) = query.state {
            select = select.filter(free_promos::Column::State.eq(state));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(free_promos::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(FreeProductPromotionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    // ---- discount product ----

    pub async fn create_discount_product_promotion(
        &self,
        actor: AuthUser,
        req: CreateDiscountProductPromotionRequest,
    ) -> AppResult<DiscountProductPromotionResponse> {
        let state = req.state.unwrap_or(PromotionState::Draft);
        validate_initial_state(state)?;
        validate_window(req.started_at, req.finished_at)?;
        validate_discount(req.discount_type, req.discount_value, req.max_deduction)?;

        let txn = self.pool.begin().await?;
        authorize_inventory(&txn, &actor, req.inventory_id).await?;
        if state == PromotionState::Published {
            ensure_discount_window_available(
                &txn,
                None,
                req.inventory_id,
                req.started_at,
                req.finished_at,
            )
            .await?;
        }

        let created = discount_promos::ActiveModel {
            inventory_id: Set(req.inventory_id),
            state: Set(state),
            discount_type: Set(req.discount_type),
            discount_value: Set(req.discount_value),
            max_deduction: Set(req.max_deduction),
            started_at: Set(req.started_at),
            finished_at: Set(req.finished_at),
            created_by: Set(actor.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(DiscountProductPromotionResponse::from(created))
    }

    pub async fn update_discount_product_promotion(
        &self,
        actor: AuthUser,
        promotion_id: i64,
        req: UpdateDiscountProductPromotionRequest,
    ) -> AppResult<DiscountProductPromotionResponse> {
        let txn = self.pool.begin().await?;
        let current = discount_promos::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;
        authorize_inventory(&txn, &actor, current.inventory_id).await?;
        ensure_editable(current.state)?;

        let discount_type = req.discount_type.unwrap_or(current.discount_type);
        let discount_value = req.discount_value.unwrap_or(current.discount_value);
        let max_deduction = req.max_deduction.or(current.max_deduction);
        let started_at = req.started_at.unwrap_or(current.started_at);
        let finished_at = req.finished_at.unwrap_or(current.finished_at);
        validate_discount(discount_type, discount_value, max_deduction)?;
        validate_window(started_at, finished_at)?;

        let window_changed = started_at != current.started_at || finished_at != current.finished_at;
        if current.state == PromotionState::Published && window_changed {
            ensure_discount_window_available(
                &txn,
                Some(current.id),
                current.inventory_id,
                started_at,
                finished_at,
            )
            .await?;
        }

        let mut am = current.into_active_model();
        am.discount_type = Set(discount_type);
        am.discount_value = Set(discount_value);
        am.max_deduction = Set(max_deduction);
        am.started_at = Set(started_at);
        am.finished_at = Set(finished_at);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        Ok(DiscountProductPromotionResponse::from(updated))
    }

    pub async fn update_discount_product_promotion_state(
        &self,
        actor: AuthUser,
        promotion_id: i64,
        state: PromotionState,
    ) -> AppResult<DiscountProductPromotionResponse> {
        let txn = self.pool.begin().await?;
        let current = discount_promos::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;
        authorize_inventory(&txn, &actor, current.inventory_id).await?;
        validate_state_transition(current.state, state)?;

        if state == PromotionState::Published {
            ensure_discount_window_available(
                &txn,
                Some(current.id),
                current.inventory_id,
                current.started_at,
                current.finished_at,
            )
            .await?;
        }

        let mut am = current.into_active_model();
        am.state = Set(state);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        Ok(DiscountProductPromotionResponse::from(updated))
    }

    pub async fn get_discount_product_promotion(
        &self,
        promotion_id: i64,
    ) -> AppResult<DiscountProductPromotionResponse> {
        discount_promos::Entity::find_by_id(promotion_id)
            .one(self.pool.as_ref())
            .await?
            .map(DiscountProductPromotionResponse::from)
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))
    }

    pub async fn list_discount_product_promotions(
        &self,
        query: &ProductPromotionQuery,
    ) -> AppResult<PaginatedResponse<DiscountProductPromotionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut select = discount_promos::Entity::find();
        if let Some(inventory_id) = query.inventory_id {
            select = select.filter(discount_promos::Column::InventoryId.eq(inventory_id));
        }
        if let Some(state) = query.state {
            select = select.filter(discount_promos::Column::State.eq(state));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(discount_promos::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(DiscountProductPromotionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DiscountType, UserRole, store_admin_entity as store_admins};
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, day, 0, 0, 0).unwrap()
    }

    fn store_admin() -> AuthUser {
        AuthUser {
            id: 7,
            role: UserRole::StoreAdmin,
        }
    }

    fn inventory() -> inventories::Model {
        inventories::Model {
            id: 11,
            store_id: 3,
            product_id: 5,
            stock: 10,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    fn admin_row() -> store_admins::Model {
        store_admins::Model {
            id: 1,
            store_id: 3,
            user_id: 7,
            created_at: at(1),
        }
    }

    fn discount_promo(id: i64, state: PromotionState, start: u32, end: u32) -> discount_promos::Model {
        discount_promos::Model {
            id,
            inventory_id: 11,
            state,
            discount_type: DiscountType::Percent,
            discount_value: 10,
            max_deduction: None,
            started_at: at(start),
            finished_at: at(end),
            created_by: 7,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    fn lock_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn test_publish_discount_product_overlapping_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![discount_promo(2, PromotionState::Draft, 10, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .append_exec_results([lock_ok()])
            .append_query_results([vec![discount_promo(1, PromotionState::Published, 1, 10)]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let err = svc
            .update_discount_product_promotion_state(store_admin(), 2, PromotionState::Published)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_publish_discount_product_disjoint_ok() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![discount_promo(2, PromotionState::Draft, 11, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .append_exec_results([lock_ok()])
            .append_query_results([vec![discount_promo(1, PromotionState::Published, 1, 10)]])
            .append_query_results([vec![discount_promo(2, PromotionState::Published, 11, 20)]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let resp = svc
            .update_discount_product_promotion_state(store_admin(), 2, PromotionState::Published)
            .await
            .unwrap();
        assert_eq!(resp.state, PromotionState::Published);
    }

    #[tokio::test]
    async fn test_store_admin_of_other_store_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![discount_promo(2, PromotionState::Draft, 11, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([Vec::<store_admins::Model>::new()])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        assert!(matches!(
            svc.update_discount_product_promotion_state(
                store_admin(),
                2,
                PromotionState::Archived
            )
            .await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_create_free_product_validates_before_db() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let req = CreateFreeProductPromotionRequest {
            inventory_id: 11,
            state: None,
            buy_quantity: 0,
            free_quantity: 1,
            started_at: at(1),
            finished_at: at(1) + Duration::days(3),
        };
        assert!(matches!(
            svc.create_free_product_promotion(store_admin(), req).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_archived_free_product_not_editable() {
        let archived = free_promos::Model {
            id: 4,
            inventory_id: 11,
            state: PromotionState::Archived,
            buy_quantity: 2,
            free_quantity: 1,
            started_at: at(1),
            finished_at: at(5),
            created_by: 7,
            created_at: at(1),
            updated_at: at(1),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![archived]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let req = UpdateFreeProductPromotionRequest {
            free_quantity: Some(2),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_free_product_promotion(store_admin(), 4, req).await,
            Err(AppError::ValidationError(_))
        ));
    }

    fn free_promo(id: i64, state: PromotionState, start: u32, end: u32) -> free_promos::Model {
        free_promos::Model {
            id,
            inventory_id: 11,
            state,
            buy_quantity: 2,
            free_quantity: 1,
            started_at: at(start),
            finished_at: at(end),
            created_by: 7,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    #[tokio::test]
    async fn test_publish_free_product_touching_window_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![free_promo(2, PromotionState::Draft, 10, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .append_exec_results([lock_ok()])
            .append_query_results([vec![free_promo(1, PromotionState::Published, 1, 10)]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        assert!(matches!(
            svc.update_free_product_promotion_state(store_admin(), 2, PromotionState::Published)
                .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_moving_published_discount_window_onto_another_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![discount_promo(2, PromotionState::Published, 11, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .append_exec_results([lock_ok()])
            .append_query_results([vec![
                discount_promo(1, PromotionState::Published, 1, 10),
                discount_promo(2, PromotionState::Published, 11, 20),
            ]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let req = UpdateDiscountProductPromotionRequest {
            started_at: Some(at(9)),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_discount_product_promotion(store_admin(), 2, req).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_extending_published_free_window_ignores_itself() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![free_promo(2, PromotionState::Published, 11, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .append_exec_results([lock_ok()])
            .append_query_results([vec![
                free_promo(1, PromotionState::Published, 1, 10),
                free_promo(2, PromotionState::Published, 11, 20),
            ]])
            .append_query_results([vec![free_promo(2, PromotionState::Published, 11, 25)]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let req = UpdateFreeProductPromotionRequest {
            finished_at: Some(at(25)),
            ..Default::default()
        };
        let resp = svc
            .update_free_product_promotion(store_admin(), 2, req)
            .await
            .unwrap();
        assert_eq!(resp.finished_at, at(25));
    }

    #[tokio::test]
    async fn test_published_free_edit_without_window_change_skips_lock() {
        let updated = free_promos::Model {
            free_quantity: 2,
            ..free_promo(2, PromotionState::Published, 11, 20)
        };
        // no lock result queued
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![free_promo(2, PromotionState::Published, 11, 20)]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .append_query_results([vec![updated]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        let req = UpdateFreeProductPromotionRequest {
            free_quantity: Some(2),
            ..Default::default()
        };
        let resp = svc
            .update_free_product_promotion(store_admin(), 2, req)
            .await
            .unwrap();
        assert_eq!(resp.free_quantity, 2);
    }

    #[tokio::test]
    async fn test_publish_ended_discount_product_rejected() {
        let ended = discount_promos::Model {
            started_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            finished_at: Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(),
            ..discount_promo(2, PromotionState::Draft, 1, 2)
        };
        // a lock attempt would fail with a database error, not a validation error
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ended]])
            .append_query_results([vec![inventory()]])
            .append_query_results([vec![admin_row()]])
            .into_connection();
        let svc = ProductPromotionService::new(Arc::new(db));
        assert!(matches!(
            svc.update_discount_product_promotion_state(
                store_admin(),
                2,
                PromotionState::Published
            )
            .await,
            Err(AppError::ValidationError(_))
        ));
    }
}
