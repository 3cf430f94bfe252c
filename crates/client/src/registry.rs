//! Static table of entity types.
//!
//! Every path segment for an entity type (and the set of relation names it
//! can navigate) comes from here. The table is generated together with
//! [`EntityKind`] and [`AnyEntity`] so the three can never drift apart.

use crate::entity::{
    Campaign, Datastream, Entity, FeatureOfInterest, HistoricalLocation, License, Location,
    MultiDatastream, Observation, ObservationGroup, ObservedProperty, Party, Relation, Sensor,
    Thing,
};
use crate::err::{Result, StaplusError};
use crate::http::service::Service;
use crate::id::Id;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

/// Decodes a JSON object into the entity type of a registry entry.
pub type DecodeFn = fn(&Value) -> Result<AnyEntity>;

/// Immutable metadata for one entity type.
#[derive(Debug, Clone, Copy)]
pub struct EntityType {
    pub singular: &'static str,
    pub plural: &'static str,
    pub kind: EntityKind,
    /// navigation properties reachable from this type
    pub relations: &'static [&'static str],
    pub decode: DecodeFn,
}

fn decode_as<T: Entity>(value: &Value) -> Result<AnyEntity> {
    T::from_json(value).map(Entity::into_any)
}

macro_rules! entity_types {
    ($($ty:ident => $plural:literal [$($rel:literal),* $(,)?]),* $(,)?) => {
        /// Type tag for every modelled entity type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EntityKind {
            $($ty),*
        }

        impl EntityKind {
            pub const ALL: &'static [EntityKind] = &[$(EntityKind::$ty),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(EntityKind::$ty => stringify!($ty)),*
                }
            }

            pub fn plural(self) -> &'static str {
                match self {
                    $(EntityKind::$ty => $plural),*
                }
            }

            pub fn entity_type(self) -> &'static EntityType {
                &ENTITY_TYPES[self as usize]
            }
        }

        static ENTITY_TYPES: &[EntityType] = &[
            $(EntityType {
                singular: stringify!($ty),
                plural: $plural,
                kind: EntityKind::$ty,
                relations: &[$($rel),*],
                decode: decode_as::<$ty>,
            }),*
        ];

        /// An entity whose concrete type is only known at runtime.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyEntity {
            $($ty($ty)),*
        }

        impl AnyEntity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(AnyEntity::$ty(_) => EntityKind::$ty),*
                }
            }

            pub fn id(&self) -> Option<&Id> {
                match self {
                    $(AnyEntity::$ty(e) => e.id()),*
                }
            }

            pub fn to_json(&self) -> Value {
                match self {
                    $(AnyEntity::$ty(e) => e.to_json()),*
                }
            }

            pub fn set_service(&mut self, service: Option<&Service>) {
                match self {
                    $(AnyEntity::$ty(e) => e.set_service(service)),*
                }
            }
        }

        $(
            impl From<$ty> for AnyEntity {
                fn from(entity: $ty) -> Self {
                    AnyEntity::$ty(entity)
                }
            }
        )*
    };
}

entity_types! {
    Thing => "Things" ["Datastreams", "MultiDatastreams", "Locations", "HistoricalLocations", "Party"],
    Location => "Locations" ["Things", "HistoricalLocations"],
    HistoricalLocation => "HistoricalLocations" ["Thing", "Locations"],
    Sensor => "Sensors" ["Datastreams", "MultiDatastreams"],
    ObservedProperty => "ObservedProperties" ["Datastreams", "MultiDatastreams"],
    FeatureOfInterest => "FeaturesOfInterest" ["Observations"],
    Datastream => "Datastreams" ["Sensor", "Thing", "ObservedProperty", "Observations", "Party", "License", "Campaigns"],
    MultiDatastream => "MultiDatastreams" ["Sensor", "Thing", "ObservedProperties", "Observations", "Party", "License", "Campaigns"],
    Observation => "Observations" ["FeatureOfInterest", "Datastream", "MultiDatastream", "ObservationGroups", "Subjects", "Objects"],
    Party => "Parties" ["Datastreams", "MultiDatastreams", "Things", "Campaigns", "ObservationGroups"],
    License => "Licenses" ["Datastreams", "MultiDatastreams", "ObservationGroups", "Campaigns"],
    Campaign => "Campaigns" ["Party", "License", "Datastreams", "MultiDatastreams", "ObservationGroups"],
    ObservationGroup => "ObservationGroups" ["Party", "License", "Observations", "Relations", "Campaigns"],
    Relation => "Relations" ["Subject", "Object", "ObservationGroups"],
}

/// Singular and plural names mapped back onto their table entry.
static BY_NAME: Lazy<HashMap<&'static str, &'static EntityType>> = Lazy::new(|| {
    ENTITY_TYPES
        .iter()
        .flat_map(|t| [(t.singular, t), (t.plural, t)])
        .collect()
});

impl EntityType {
    /// Looks up an entry by singular (`Party`) or plural (`Parties`) name.
    pub fn by_name(name: &str) -> Result<&'static EntityType> {
        BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| StaplusError::UnknownType(name.to_string()))
    }

    pub fn of<T: Entity>() -> &'static EntityType {
        T::KIND.entity_type()
    }

    pub fn all() -> &'static [EntityType] {
        ENTITY_TYPES
    }

    pub fn decode(&self, value: &Value) -> Result<AnyEntity> {
        (self.decode)(value)
    }

    pub fn has_relation(&self, relation: &str) -> bool {
        self.relations.contains(&relation)
    }
}

impl AnyEntity {
    /// Decodes a payload for an entity type known only by name.
    pub fn from_json(type_name: &str, value: &Value) -> Result<Self> {
        EntityType::by_name(type_name)?.decode(value)
    }

    pub fn downcast<T: Entity>(self) -> Option<T> {
        T::from_any(self)
    }
}
