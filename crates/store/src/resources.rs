//! Demonstration business resources (products, orders, stores).
//!
//! These exist to exercise the permission system end to end. Each collection
//! is a mutex-guarded ordered sequence rather than shared module-level state.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use warden_core::{DomainError, DomainResult, UserId};

/// The three demonstration collections, each backed by a business element of
/// the same name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Products,
    Orders,
    Stores,
}

impl ResourceKind {
    /// The business-element name permission checks resolve against.
    pub fn element_name(&self) -> &'static str {
        match self {
            ResourceKind::Products => "products",
            ResourceKind::Orders => "orders",
            ResourceKind::Stores => "stores",
        }
    }
}

/// A demonstration object with an owner, the only attribute the ownership
/// policy cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockObject {
    pub id: u64,
    pub name: String,
    pub owner_id: UserId,
    pub description: String,
}

#[derive(Default)]
struct Collection {
    next_id: u64,
    items: Vec<MockObject>,
}

impl Collection {
    fn insert(&mut self, name: String, owner_id: UserId, description: String) -> MockObject {
        self.next_id += 1;
        let object = MockObject {
            id: self.next_id,
            name,
            owner_id,
            description,
        };
        self.items.push(object.clone());
        object
    }
}

/// In-memory repository for the demonstration resources.
pub struct ResourceRepo {
    products: Mutex<Collection>,
    orders: Mutex<Collection>,
    stores: Mutex<Collection>,
}

impl Default for ResourceRepo {
    fn default() -> Self {
        Self {
            products: Mutex::new(Collection::default()),
            orders: Mutex::new(Collection::default()),
            stores: Mutex::new(Collection::default()),
        }
    }
}

impl ResourceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, kind: ResourceKind) -> &Mutex<Collection> {
        match kind {
            ResourceKind::Products => &self.products,
            ResourceKind::Orders => &self.orders,
            ResourceKind::Stores => &self.stores,
        }
    }

    pub fn list(&self, kind: ResourceKind) -> Vec<MockObject> {
        self.collection(kind).lock().unwrap().items.clone()
    }

    /// The records owned by `owner` — what a base-permission holder may see.
    pub fn list_owned_by(&self, kind: ResourceKind, owner: UserId) -> Vec<MockObject> {
        self.collection(kind)
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|o| o.owner_id == owner)
            .cloned()
            .collect()
    }

    pub fn get(&self, kind: ResourceKind, id: u64) -> Option<MockObject> {
        self.collection(kind)
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|o| o.id == id)
            .cloned()
    }

    pub fn create(
        &self,
        kind: ResourceKind,
        name: String,
        owner_id: UserId,
        description: String,
    ) -> MockObject {
        self.collection(kind)
            .lock()
            .unwrap()
            .insert(name, owner_id, description)
    }

    pub fn update(
        &self,
        kind: ResourceKind,
        id: u64,
        name: Option<String>,
        description: Option<String>,
    ) -> DomainResult<MockObject> {
        let mut collection = self.collection(kind).lock().unwrap();
        let object = collection
            .items
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;

        if let Some(name) = name {
            object.name = name;
        }
        if let Some(description) = description {
            object.description = description;
        }
        Ok(object.clone())
    }

    pub fn delete(&self, kind: ResourceKind, id: u64) -> DomainResult<()> {
        let mut collection = self.collection(kind).lock().unwrap();
        let before = collection.items.len();
        collection.items.retain(|o| o.id != id);
        if collection.items.len() == before {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
