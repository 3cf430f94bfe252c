//! Typed entities of the SensorThings / STAplus data model

#[macro_use]
mod macros;

mod plus;
mod sensing;

pub use plus::*;
pub use sensing::*;

use crate::err::{Result, StaplusError};
use crate::field::FieldDescriptor;
use crate::http::service::{Service, ServiceHandle};
use crate::id::Id;
use crate::list::EntityList;
use crate::query::{ParentRef, Query};
use crate::registry::{AnyEntity, EntityKind};
use serde_json::{Map, Value};
use std::fmt::Debug;

pub(crate) const IOT_ID: &str = "@iot.id";
pub(crate) const IOT_SELF_LINK: &str = "@iot.selfLink";

/// Identity and service attachment shared by every entity.
#[derive(Debug, Clone, Default)]
pub struct EntityCore {
    pub(crate) id: Option<Id>,
    pub(crate) self_link: Option<String>,
    pub(crate) service: ServiceHandle,
}

impl EntityCore {
    pub(crate) fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            id: map.get(IOT_ID).and_then(Id::from_json),
            self_link: map
                .get(IOT_SELF_LINK)
                .and_then(Value::as_str)
                .map(str::to_string),
            service: ServiceHandle::default(),
        }
    }

    /// Starts a wire object. Only the id is sent; the self link is server-owned.
    pub(crate) fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(id) = &self.id {
            map.insert(IOT_ID.to_string(), id.to_json());
        }
        map
    }
}

/// Contract implemented by every concrete entity type.
pub trait Entity: Clone + Debug + PartialEq + Default + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Field schema, values first then relations.
    const FIELDS: &'static [FieldDescriptor];

    fn core(&self) -> &EntityCore;

    fn core_mut(&mut self) -> &mut EntityCore;

    fn id(&self) -> Option<&Id> {
        self.core().id.as_ref()
    }

    fn set_id(&mut self, id: Option<Id>) {
        self.core_mut().id = id;
    }

    fn self_link(&self) -> Option<&str> {
        self.core().self_link.as_deref()
    }

    fn set_self_link(&mut self, link: Option<String>) {
        self.core_mut().self_link = link;
    }

    /// The attached service, if it is still alive.
    fn service(&self) -> Option<Service> {
        self.core().service.upgrade()
    }

    /// Attaches (or with `None` detaches) a service on this entity and every
    /// populated relation below it. Re-attaching the same service is a no-op.
    fn set_service(&mut self, service: Option<&Service>) {
        let handle = service.map(Service::handle).unwrap_or_default();
        self.attach(&handle);
    }

    #[doc(hidden)]
    fn attach(&mut self, handle: &ServiceHandle) {
        if self.core().service.same_as(handle) {
            return;
        }
        self.core_mut().service = handle.clone();
        self.propagate_service(handle);
    }

    #[doc(hidden)]
    fn propagate_service(&mut self, handle: &ServiceHandle);

    /// Wire representation; blank values and empty lists are left out.
    fn to_json(&self) -> Value;

    /// Builds an entity from a server payload, recursing into inlined relations.
    fn from_json(value: &Value) -> Result<Self>;

    /// Validated dynamic assignment by wire key. On error the field keeps its
    /// previous value.
    fn set_field(&mut self, wire: &str, value: &Value) -> Result<()>;

    /// Validated dynamic assignment of a relation by wire key.
    fn set_relation(&mut self, wire: &str, value: RelationValue) -> Result<()>;

    fn into_any(self) -> AnyEntity;

    fn from_any(any: AnyEntity) -> Option<Self>;

    /// A fresh entity of the same type that only carries the id, suitable for
    /// linking to an existing record.
    fn clone_ref(&self) -> Self {
        let mut entity = Self::default();
        entity.set_id(self.id().cloned());
        entity
    }
}

/// Runtime-typed input for [`Entity::set_relation`].
#[derive(Debug, Clone, PartialEq)]
pub enum RelationValue {
    Clear,
    One(AnyEntity),
    Many(Vec<AnyEntity>),
}

impl RelationValue {
    pub(crate) fn into_one<T: Entity>(self, owner: &'static str, wire: &str) -> Result<Option<T>> {
        match self {
            RelationValue::Clear => Ok(None),
            RelationValue::One(any) => T::from_any(any)
                .map(Some)
                .ok_or_else(|| StaplusError::validation(owner, wire, T::KIND.name())),
            RelationValue::Many(_) => Err(StaplusError::validation(owner, wire, T::KIND.name())),
        }
    }

    pub(crate) fn into_many<T: Entity>(
        self,
        owner: &'static str,
        wire: &str,
    ) -> Result<Option<EntityList<T>>> {
        let expected = || {
            StaplusError::validation(
                owner,
                wire,
                format!("a homogeneous list of {}", T::KIND.name()),
            )
        };
        match self {
            RelationValue::Clear => Ok(None),
            RelationValue::Many(items) => items
                .into_iter()
                .map(|any| T::from_any(any).ok_or_else(expected))
                .collect::<Result<Vec<T>>>()
                .map(|entities| Some(EntityList::from(entities))),
            RelationValue::One(_) => Err(expected()),
        }
    }

    pub fn one<T: Entity>(entity: T) -> Self {
        RelationValue::One(entity.into_any())
    }

    pub fn many<T: Entity>(entities: impl IntoIterator<Item = T>) -> Self {
        RelationValue::Many(entities.into_iter().map(Entity::into_any).collect())
    }
}

/// Query for `relation` navigated from a persisted, attached `parent`.
pub(crate) fn navigate<P: Entity, T: Entity>(parent: &P, relation: &'static str) -> Result<Query<T>> {
    let service = parent.service().ok_or(StaplusError::Detached(P::KIND.name()))?;
    let id = parent
        .id()
        .cloned()
        .ok_or(StaplusError::MissingId(P::KIND.name()))?;
    Ok(Query::new(
        &service,
        relation.to_string(),
        Some(ParentRef { kind: P::KIND, id }),
    ))
}

pub(crate) fn decode_one<T: Entity>(map: &Map<String, Value>, wire: &str) -> Result<Option<Box<T>>> {
    match map.get(wire) {
        Some(value @ Value::Object(_)) => T::from_json(value).map(|e| Some(Box::new(e))),
        _ => Ok(None),
    }
}

pub(crate) fn decode_many<T: Entity>(
    map: &Map<String, Value>,
    wire: &str,
) -> Result<Option<EntityList<T>>> {
    match map.get(wire) {
        Some(Value::Array(items)) => EntityList::from_relation(items, map, wire).map(Some),
        _ => Ok(None),
    }
}
