//! Initial dataset: roles, business elements, the permission matrix, and one
//! demo user per role.
//!
//! Password hashing is injected so this crate stays free of the hashing
//! dependency; the API layer passes its real hasher.

use tracing::info;

use warden_core::DomainResult;

use crate::memory::{MemoryStore, NewUser, RuleFlags};
use crate::resources::{ResourceKind, ResourceRepo};

/// Read-everything flags (no create/update/delete).
fn read_all() -> RuleFlags {
    RuleFlags {
        read: true,
        read_all: true,
        ..Default::default()
    }
}

/// Own-records flags: full control over own instances, no "-all" reach.
fn own_records() -> RuleFlags {
    RuleFlags {
        read: true,
        create: true,
        update: true,
        delete: true,
        ..Default::default()
    }
}

/// Populate an empty store with the standard dataset. A store that already
/// has roles is left untouched.
pub fn seed_store(store: &MemoryStore, hash_password: impl Fn(&str) -> String) -> DomainResult<()> {
    if !store.list_roles().is_empty() {
        info!("store already seeded, skipping");
        return Ok(());
    }

    let admin = store.create_role("admin", Some("Full access to every resource".into()))?;
    let manager = store.create_role(
        "manager",
        Some("Manages products, orders and stores".into()),
    )?;
    let user = store.create_role("user", Some("Regular user with limited access".into()))?;
    let guest = store.create_role("guest", Some("Read-only visitor".into()))?;

    let users_el = store.create_element("users", Some("User accounts".into()))?;
    let products_el = store.create_element("products", Some("Product catalog".into()))?;
    let stores_el = store.create_element("stores", Some("Store directory".into()))?;
    let orders_el = store.create_element("orders", Some("Customer orders".into()))?;
    let permissions_el = store.create_element("permissions", Some("Access rules".into()))?;

    // Admin: everything, everywhere.
    for element in [&users_el, &products_el, &stores_el, &orders_el, &permissions_el] {
        store.create_rule(admin.id, element.id, RuleFlags::all())?;
    }

    // Manager: full control of the catalog-ish elements, read-only on users.
    for element in [&products_el, &orders_el, &stores_el] {
        store.create_rule(manager.id, element.id, RuleFlags::all())?;
    }
    store.create_rule(manager.id, users_el.id, read_all())?;

    // User: browse products/stores, manage own orders.
    store.create_rule(user.id, products_el.id, read_all())?;
    store.create_rule(user.id, stores_el.id, read_all())?;
    store.create_rule(user.id, orders_el.id, own_records())?;

    // Guest: browse only.
    store.create_rule(guest.id, products_el.id, read_all())?;
    store.create_rule(guest.id, stores_el.id, read_all())?;

    for (email, first, last, password, role_id) in [
        ("admin@example.com", "Ada", "Admin", "admin123", admin.id),
        ("manager@example.com", "Mark", "Manager", "manager123", manager.id),
        ("user@example.com", "Uma", "User", "user123", user.id),
        ("guest@example.com", "Glen", "Guest", "guest123", guest.id),
    ] {
        store.create_user(NewUser {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            middle_name: None,
            hashed_password: hash_password(password),
            role_id,
        })?;
    }

    info!("seeded roles, elements, access rules and demo users");
    Ok(())
}

/// Populate the demonstration collections with a few objects owned by the
/// given users.
pub fn seed_resources(repo: &ResourceRepo, owners: &[warden_core::UserId]) {
    let owner = |i: usize| owners[i % owners.len()];

    repo.create(ResourceKind::Products, "Product A".into(), owner(0), "First product".into());
    repo.create(ResourceKind::Products, "Product B".into(), owner(1), "Second product".into());
    repo.create(ResourceKind::Products, "Product C".into(), owner(0), "Third product".into());

    repo.create(ResourceKind::Orders, "Order #001".into(), owner(0), "Order for Product A".into());
    repo.create(ResourceKind::Orders, "Order #002".into(), owner(1), "Order for Product B".into());
    repo.create(ResourceKind::Orders, "Order #003".into(), owner(2), "Order for Product C".into());

    repo.create(ResourceKind::Stores, "Store Alpha".into(), owner(0), "Main store".into());
    repo.create(ResourceKind::Stores, "Store Beta".into(), owner(1), "Secondary store".into());
}
