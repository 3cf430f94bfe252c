//! Per-type data access: queries and writes

use crate::entity::Entity;
use crate::err::{Result, StaplusError};
use crate::http::service::Service;
use crate::http::transport::{HttpRequest, APPLICATION_JSON_PATCH};
use crate::id::Id;
use crate::query::{ParentRef, Query};
use http::header::LOCATION;
use http::Method;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::{debug, instrument, trace};
use url::Url;

/// Data access object for one entity type on one service.
///
/// `segment` is the path segment queried, normally the type's plural; role
/// views such as `Subjects` reuse the entity type under another name.
#[derive(Debug, Clone)]
pub struct Dao<T: Entity> {
    service: Service,
    segment: &'static str,
    parent: Option<ParentRef>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Dao<T> {
    pub(crate) fn new(service: &Service) -> Self {
        Self::with_segment(service, T::KIND.plural())
    }

    pub(crate) fn with_segment(service: &Service, segment: &'static str) -> Self {
        Self {
            service: service.clone(),
            segment,
            parent: None,
            _entity: PhantomData,
        }
    }

    pub fn segment(&self) -> &'static str {
        self.segment
    }

    /// Navigates from `parent`, which must have been persisted.
    pub fn for_parent<P: Entity>(mut self, parent: &P) -> Result<Self> {
        let id = parent
            .id()
            .cloned()
            .ok_or(StaplusError::MissingId(P::KIND.name()))?;
        self.parent = Some(ParentRef { kind: P::KIND, id });
        Ok(self)
    }

    pub fn query(&self) -> Query<T> {
        Query::new(&self.service, self.segment.to_string(), self.parent.clone())
    }

    /// POSTs the entity to its collection. On success the server-assigned id,
    /// the self link and the service are written back; on failure the entity
    /// is left untouched.
    #[instrument(
        name = "staplus.dao.create",
        skip(self, entity),
        fields(entity_type = T::KIND.name())
    )]
    pub fn create(&self, entity: &mut T) -> Result<Id> {
        let collection = self.service.resolve(T::KIND.plural())?;
        debug!("posting to {}", collection);

        let body = entity.to_json();
        trace!("request body: {}", body);

        let request = HttpRequest::new(Method::POST, collection.clone()).with_json(body);
        let response = self.service.execute_for(&request, T::KIND.name())?;

        let location = response.header(LOCATION).ok_or_else(|| {
            StaplusError::MalformedResponse(format!(
                "creating {} returned no Location header",
                T::KIND.name()
            ))
        })?;
        let id = Id::from_location(location).ok_or_else(|| {
            StaplusError::MalformedResponse(format!("no id in Location header {}", location))
        })?;

        entity.set_self_link(Some(format!("{}({})", collection, id.to_path_literal())));
        entity.set_id(Some(id.clone()));
        entity.set_service(Some(&self.service));
        debug!("created {} with id {}", T::KIND.name(), id);
        Ok(id)
    }

    /// Fetches one entity from the top-level collection.
    pub fn find(&self, id: impl Into<Id>) -> Result<T> {
        let id = id.into();
        let path = format!("{}({})", T::KIND.plural(), id.to_path_literal());
        Query::new(&self.service, path, None).fetch_one()
    }

    /// Replaces the stored entity with the current in-memory state.
    #[instrument(name = "staplus.dao.update", skip(self, entity), fields(entity_type = T::KIND.name()))]
    pub fn update(&self, entity: &T) -> Result<()> {
        let request = HttpRequest::new(Method::PUT, self.entity_url(entity)?).with_json(entity.to_json());
        self.service.execute_for(&request, T::KIND.name())?;
        Ok(())
    }

    /// Applies a JSON Patch document (a list of operations).
    #[instrument(name = "staplus.dao.patch", skip(self, entity, patches), fields(entity_type = T::KIND.name()))]
    pub fn patch(&self, entity: &T, patches: Vec<Value>) -> Result<()> {
        let request = HttpRequest::new(Method::PATCH, self.entity_url(entity)?)
            .with_json(Value::Array(patches))
            .with_content_type(APPLICATION_JSON_PATCH);
        self.service.execute_for(&request, T::KIND.name())?;
        Ok(())
    }

    #[instrument(name = "staplus.dao.delete", skip(self, entity), fields(entity_type = T::KIND.name()))]
    pub fn delete(&self, entity: &T) -> Result<()> {
        let request = HttpRequest::delete(self.entity_url(entity)?);
        self.service.execute_for(&request, T::KIND.name())?;
        Ok(())
    }

    /// The self link, or the canonical URL built from the id.
    fn entity_url(&self, entity: &T) -> Result<Url> {
        if let Some(link) = entity.self_link() {
            return self.service.resolve(link);
        }
        let id = entity.id().ok_or(StaplusError::MissingId(T::KIND.name()))?;
        self.service
            .resolve(&format!("{}({})", T::KIND.plural(), id.to_path_literal()))
    }
}
