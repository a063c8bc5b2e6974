use crate::database::{LockClass, advisory_xact_lock};
use crate::entities::{
    DiscountType, PromotionScope, PromotionSource, PromotionState, UserRole,
    promotion_entity as promotions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::admin_access::check_admin_access;
use crate::utils::promotion_rules::{
    PublishCandidate, ensure_editable, ensure_not_ended, ensure_scope_and_source_unchanged,
    find_source_conflict, validate_discount, validate_state_transition, validate_window,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

/// Field set of a general/store promotion after a create or a patch, validated as a whole.
struct PromotionTerms<'a> {
    name: &'a str,
    scope: PromotionScope,
    source: PromotionSource,
    discount_type: DiscountType,
    discount_value: i64,
    min_purchase: Option<i64>,
    max_deduction: Option<i64>,
    min_transaction: Option<i32>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    coupon_duration_days: Option<i32>,
    quota: Option<i32>,
    store_id: Option<i64>,
}

fn validate_terms(t: &PromotionTerms<'_>) -> AppResult<()> {
    if t.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Nama promosi wajib diisi".to_string(),
        ));
    }
    validate_window(t.started_at, t.finished_at)?;
    validate_discount(t.discount_type, t.discount_value, t.max_deduction)?;

    match (t.scope, t.store_id) {
        (PromotionScope::Store, None) => {
            return Err(AppError::ValidationError(
                "Promosi toko harus memiliki toko".to_string(),
            ));
        }
        (PromotionScope::General, Some(_)) => {
            return Err(AppError::ValidationError(
                "Promosi umum tidak boleh terikat pada toko".to_string(),
            ));
        }
        _ => {}
    }

    if t.source.is_system_triggered() && t.scope != PromotionScope::General {
        return Err(AppError::ValidationError(
            "Promosi otomatis harus berlaku umum".to_string(),
        ));
    }
    if t.source == PromotionSource::AfterMinPurchase && t.min_purchase.is_none() {
        return Err(AppError::ValidationError(
            "Minimal pembelian wajib diisi".to_string(),
        ));
    }
    if t.source == PromotionSource::AfterMinTransaction && !t.min_transaction.is_some_and(|n| n > 0)
    {
        return Err(AppError::ValidationError(
            "Minimal transaksi wajib diisi".to_string(),
        ));
    }
    if t.min_purchase.is_some_and(|v| v < 0) {
        return Err(AppError::ValidationError(
            "Minimal pembelian tidak boleh negatif".to_string(),
        ));
    }
    if t.quota.is_some_and(|q| q < 1) {
        return Err(AppError::ValidationError(
            "Kuota minimal 1".to_string(),
        ));
    }
    if t.coupon_duration_days.is_some_and(|d| d < 1) {
        return Err(AppError::ValidationError(
            "Masa berlaku kupon minimal 1 hari".to_string(),
        ));
    }
    Ok(())
}

/// Store promotions are managed by that store's admins; general ones by super admins only.
async fn authorize<C: ConnectionTrait>(
    conn: &C,
    actor: &AuthUser,
    store_id: Option<i64>,
) -> AppResult<()> {
    match store_id {
        Some(store_id) => check_admin_access(conn, actor.role, actor.id, store_id).await,
        None if actor.role == UserRole::SuperAdmin => Ok(()),
        None => Err(AppError::Unauthorized(
            "Hanya super admin yang dapat mengelola promosi umum".to_string(),
        )),
    }
}

/// Publish checks for general promotions. Must run inside the transaction that writes the
/// new state; the advisory lock serializes concurrent publishes of the same source.
async fn ensure_publishable<C: ConnectionTrait>(
    conn: &C,
    candidate: &PublishCandidate,
) -> AppResult<()> {
    ensure_not_ended(candidate.finished_at, Utc::now())?;
    if !candidate.source.is_system_triggered() {
        return Ok(());
    }

    advisory_xact_lock(conn, LockClass::PromotionSource, candidate.source.lock_key() as i64)
        .await?;

    let published = promotions::Entity::find()
        .filter(promotions::Column::Source.eq(candidate.source))
        .filter(promotions::Column::State.eq(PromotionState::Published))
        .all(conn)
        .await?;

    find_source_conflict(candidate, &published)
}

#[derive(Clone)]
pub struct PromotionService {
    pool: Arc<DatabaseConnection>,
}

impl PromotionService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn create_promotion(
        &self,
        actor: AuthUser,
        req: CreatePromotionRequest,
    ) -> AppResult<PromotionResponse> {
        let state = req.state.unwrap_or(PromotionState::Draft);
        if state == PromotionState::Archived {
            return Err(AppError::ValidationError(
                "Promosi baru harus berstatus draft atau published".to_string(),
            ));
        }

        validate_terms(&PromotionTerms {
            name: &req.name,
            scope: req.scope,
            source: req.source,
            discount_type: req.discount_type,
            discount_value: req.discount_value,
            min_purchase: req.min_purchase,
            max_deduction: req.max_deduction,
            min_transaction: req.min_transaction,
            started_at: req.started_at,
            finished_at: req.finished_at,
            coupon_duration_days: req.coupon_duration_days,
            quota: req.quota,
            store_id: req.store_id,
        })?;

        let txn = self.pool.begin().await?;
        authorize(&txn, &actor, req.store_id).await?;

        if state == PromotionState::Published {
            ensure_publishable(
                &txn,
                &PublishCandidate {
                    id: None,
                    source: req.source,
                    started_at: req.started_at,
                    finished_at: req.finished_at,
                    min_purchase: req.min_purchase,
                },
            )
            .await?;
        }

        let created = promotions::ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            scope: Set(req.scope),
            source: Set(req.source),
            state: Set(state),
            promotion_type: Set(req.promotion_type),
            discount_type: Set(req.discount_type),
            discount_value: Set(req.discount_value),
            min_purchase: Set(req.min_purchase),
            max_deduction: Set(req.max_deduction),
            min_transaction: Set(req.min_transaction),
            started_at: Set(req.started_at),
            finished_at: Set(req.finished_at),
            coupon_duration_days: Set(req.coupon_duration_days),
            quota: Set(req.quota),
            claimed: Set(0),
            store_id: Set(req.store_id),
            created_by: Set(actor.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        log::info!(
            "Promotion {} created by user {} ({}, {})",
            created.id,
            actor.id,
            created.source,
            created.state
        );
        Ok(PromotionResponse::from(created))
    }

    pub async fn update_promotion(
        &self,
        actor: AuthUser,
        promotion_id: i64,
        req: UpdatePromotionRequest,
    ) -> AppResult<PromotionResponse> {
        ensure_scope_and_source_unchanged(req.scope, req.source)?;

        let txn = self.pool.begin().await?;
        let current = promotions::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;

        authorize(&txn, &actor, current.store_id).await?;
        ensure_editable(current.state)?;

        let name = req.name.clone().unwrap_or_else(|| current.name.clone());
        let discount_type = req.discount_type.unwrap_or(current.discount_type);
        let discount_value = req.discount_value.unwrap_or(current.discount_value);
        let min_purchase = req.min_purchase.or(current.min_purchase);
        let max_deduction = req.max_deduction.or(current.max_deduction);
        let min_transaction = req.min_transaction.or(current.min_transaction);
        let started_at = req.started_at.unwrap_or(current.started_at);
        let finished_at = req.finished_at.unwrap_or(current.finished_at);
        let coupon_duration_days = req.coupon_duration_days.or(current.coupon_duration_days);
        let quota = req.quota.or(current.quota);

        validate_terms(&PromotionTerms {
            name: &name,
            scope: current.scope,
            source: current.source,
            discount_type,
            discount_value,
            min_purchase,
            max_deduction,
            min_transaction,
            started_at,
            finished_at,
            coupon_duration_days,
            quota,
            store_id: current.store_id,
        })?;

        if quota.is_some_and(|q| q < current.claimed) {
            return Err(AppError::ValidationError(
                "Kuota tidak boleh kurang dari jumlah voucher yang sudah diklaim".to_string(),
            ));
        }

        if current.state == PromotionState::Published && req.touches_publish_rules() {
            ensure_publishable(
                &txn,
                &PublishCandidate {
                    id: Some(current.id),
                    source: current.source,
                    started_at,
                    finished_at,
                    min_purchase,
                },
            )
            .await?;
        }

        let mut am = current.into_active_model();
        am.name = Set(name.trim().to_string());
        if req.description.is_some() {
            am.description = Set(req.description);
        }
        if let Some(t) = req.promotion_type {
            am.promotion_type = Set(t);
        }
        am.discount_type = Set(discount_type);
        am.discount_value = Set(discount_value);
        am.min_purchase = Set(min_purchase);
        am.max_deduction = Set(max_deduction);
        am.min_transaction = Set(min_transaction);
        am.started_at = Set(started_at);
        am.finished_at = Set(finished_at);
        am.coupon_duration_days = Set(coupon_duration_days);
        am.quota = Set(quota);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;

        txn.commit().await?;
        Ok(PromotionResponse::from(updated))
    }

    pub async fn update_promotion_state(
        &self,
        actor: AuthUser,
        promotion_id: i64,
        state: PromotionState,
    ) -> AppResult<PromotionResponse> {
        let txn = self.pool.begin().await?;
        let current = promotions::Entity::find_by_id(promotion_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))?;

        authorize(&txn, &actor, current.store_id).await?;
        validate_state_transition(current.state, state)?;

        if state == PromotionState::Published {
            ensure_publishable(&txn, &PublishCandidate::from(&current)).await?;
        }

        let from = current.state;
        let mut am = current.into_active_model();
        am.state = Set(state);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Promotion {promotion_id} moved {from} -> {state} by user {}",
            actor.id
        );
        Ok(PromotionResponse::from(updated))
    }

    pub async fn get_promotion(&self, promotion_id: i64) -> AppResult<PromotionResponse> {
        promotions::Entity::find_by_id(promotion_id)
            .one(self.pool.as_ref())
            .await?
            .map(PromotionResponse::from)
            .ok_or_else(|| AppError::NotFound("Promosi tidak ditemukan".to_string()))
    }

    pub async fn list_promotions(
        &self,
        query: &PromotionQuery,
    ) -> AppResult<PaginatedResponse<PromotionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut select = promotions::Entity::find();
        if let Some(state) = query.state {
            select = select.filter(promotions::Column::State.eq(state));
        }
        if let Some(scope) = query.scope {
            select = select.filter(promotions::Column::Scope.eq(scope));
        }
        if let Some(source) = query.source {
            select = select.filter(promotions::Column::Source.eq(source));
        }
        if let Some(store_id) = query.store_id {
            select = select.filter(promotions::Column::StoreId.eq(store_id));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let items = select
            .order_by_desc(promotions::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(PromotionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }
}
