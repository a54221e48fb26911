//! Demonstration business resources, wired through the permission check.
//!
//! One generic handler set serves all three collections. Every instance
//! operation passes the object's owner into the check; collection listings
//! carry no owner, so the handler itself filters to own records unless the
//! requester holds the read-all flag.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use warden_auth::{Identity, Operation, Principal};
use warden_store::ResourceKind;

use crate::app::routes::common::active_principal;
use crate::app::{dto, errors::ensure_allowed, errors::ApiError, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/stores", get(list_stores).post(create_store))
        .route(
            "/stores/:id",
            get(get_store).put(update_store).delete(delete_store),
        )
}

// ─────────────────────── generic handler bodies ───────────────────────

async fn list(
    services: &AppServices,
    principal: &Principal,
    kind: ResourceKind,
) -> Result<Response, ApiError> {
    let element = kind.element_name();
    let decision = services
        .access
        .check(principal, element, Operation::Read, None)
        .await?;
    ensure_allowed(decision)?;

    // Base-only readers see their own records; "-all" holders see everything.
    let objects = if services.access.has_all(principal, element, Operation::Read).await? {
        services.resources.list(kind)
    } else {
        services.resources.list_owned_by(kind, principal.id())
    };

    Ok(Json(objects).into_response())
}

async fn get_one(
    services: &AppServices,
    principal: &Principal,
    kind: ResourceKind,
    id: u64,
) -> Result<Response, ApiError> {
    let object = services.resources.get(kind, id).ok_or(ApiError::NotFound)?;

    let decision = services
        .access
        .check(
            principal,
            kind.element_name(),
            Operation::Read,
            Some(object.owner_id),
        )
        .await?;
    ensure_allowed(decision)?;

    Ok(Json(object).into_response())
}

async fn create(
    services: &AppServices,
    principal: &Principal,
    kind: ResourceKind,
    body: dto::CreateResourceRequest,
) -> Result<Response, ApiError> {
    let decision = services
        .access
        .check(principal, kind.element_name(), Operation::Create, None)
        .await?;
    ensure_allowed(decision)?;

    let object = services
        .resources
        .create(kind, body.name, principal.id(), body.description);
    Ok((StatusCode::CREATED, Json(object)).into_response())
}

async fn update(
    services: &AppServices,
    principal: &Principal,
    kind: ResourceKind,
    id: u64,
    body: dto::UpdateResourceRequest,
) -> Result<Response, ApiError> {
    let object = services.resources.get(kind, id).ok_or(ApiError::NotFound)?;

    let decision = services
        .access
        .check(
            principal,
            kind.element_name(),
            Operation::Update,
            Some(object.owner_id),
        )
        .await?;
    ensure_allowed(decision)?;

    let updated = services
        .resources
        .update(kind, id, body.name, body.description)?;
    Ok(Json(updated).into_response())
}

async fn delete(
    services: &AppServices,
    principal: &Principal,
    kind: ResourceKind,
    id: u64,
) -> Result<Response, ApiError> {
    let object = services.resources.get(kind, id).ok_or(ApiError::NotFound)?;

    let decision = services
        .access
        .check(
            principal,
            kind.element_name(),
            Operation::Delete,
            Some(object.owner_id),
        )
        .await?;
    ensure_allowed(decision)?;

    services.resources.delete(kind, id)?;
    Ok(Json(dto::MessageResponse {
        message: "deleted",
    })
    .into_response())
}

// ────────────────────────── per-kind handlers ──────────────────────────

macro_rules! resource_handlers {
    ($kind:expr, $list:ident, $get:ident, $create:ident, $update:ident, $delete:ident) => {
        pub async fn $list(
            Extension(services): Extension<Arc<AppServices>>,
            Extension(identity): Extension<Identity>,
        ) -> Result<Response, ApiError> {
            let principal = active_principal(identity)?;
            list(&services, &principal, $kind).await
        }

        pub async fn $get(
            Extension(services): Extension<Arc<AppServices>>,
            Extension(identity): Extension<Identity>,
            Path(id): Path<u64>,
        ) -> Result<Response, ApiError> {
            let principal = active_principal(identity)?;
            get_one(&services, &principal, $kind, id).await
        }

        pub async fn $create(
            Extension(services): Extension<Arc<AppServices>>,
            Extension(identity): Extension<Identity>,
            Json(body): Json<dto::CreateResourceRequest>,
        ) -> Result<Response, ApiError> {
            let principal = active_principal(identity)?;
            create(&services, &principal, $kind, body).await
        }

        pub async fn $update(
            Extension(services): Extension<Arc<AppServices>>,
            Extension(identity): Extension<Identity>,
            Path(id): Path<u64>,
            Json(body): Json<dto::UpdateResourceRequest>,
        ) -> Result<Response, ApiError> {
            let principal = active_principal(identity)?;
            update(&services, &principal, $kind, id, body).await
        }

        pub async fn $delete(
            Extension(services): Extension<Arc<AppServices>>,
            Extension(identity): Extension<Identity>,
            Path(id): Path<u64>,
        ) -> Result<Response, ApiError> {
            let principal = active_principal(identity)?;
            delete(&services, &principal, $kind, id).await
        }
    };
}

resource_handlers!(
    ResourceKind::Products,
    list_products,
    get_product,
    create_product,
    update_product,
    delete_product
);

resource_handlers!(
    ResourceKind::Orders,
    list_orders,
    get_order,
    create_order,
    update_order,
    delete_order
);

resource_handlers!(
    ResourceKind::Stores,
    list_stores,
    get_store,
    create_store,
    update_store,
    delete_store
);
