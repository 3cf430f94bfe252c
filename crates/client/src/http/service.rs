use crate::config::ServiceConfig;
use crate::dao::Dao;
use crate::entity::{
    Campaign, Datastream, Entity, FeatureOfInterest, HistoricalLocation, License, Location,
    MultiDatastream, Observation, ObservationGroup, ObservedProperty, Party, Relation, Sensor,
    Thing,
};
use crate::err::{Result, StaplusError};
use crate::http::transport::{error_message, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::id::Id;
use crate::query::ParentRef;
use crate::registry::{AnyEntity, EntityType};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, error, instrument};
use url::Url;

pub(crate) struct ServiceInner {
    base: String,
    transport: Arc<dyn Transport>,
}

/// Connection to one STAplus service root.
///
/// Cloning is cheap and clones share the connection. Entities and
/// collections keep only a weak reference, so they become detached once the
/// last `Service` clone is dropped.
#[derive(Clone)]
pub struct Service {
    inner: Arc<ServiceInner>,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("url", &self.inner.base)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Unauthenticated service over the default transport.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::from_config(ServiceConfig::new(url))
    }

    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config.url, transport)
    }

    /// Service over a caller supplied transport.
    pub fn with_transport(url: impl Into<String>, transport: impl Transport + 'static) -> Result<Self> {
        let url: String = url.into();
        let base = url.trim_end_matches('/').to_string();
        Url::parse(&base)?;
        Ok(Self {
            inner: Arc::new(ServiceInner {
                base,
                transport: Arc::new(transport),
            }),
        })
    }

    /// The service root without trailing slash.
    pub fn url(&self) -> &str {
        &self.inner.base
    }

    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle(Some(Arc::downgrade(&self.inner)))
    }

    pub fn ptr_eq(&self, other: &Service) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Relative path of `relation`, navigated from `parent` when given.
    pub fn path_for(&self, parent: Option<&ParentRef>, relation: &str) -> String {
        match parent {
            None => relation.to_string(),
            Some(parent) => format!(
                "{}({})/{}",
                parent.kind.plural(),
                parent.id.to_path_literal(),
                relation
            ),
        }
    }

    /// Absolute URL for a path below the root; absolute links pass through.
    pub fn resolve(&self, path_or_url: &str) -> Result<Url> {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            return Ok(Url::parse(path_or_url)?);
        }
        Ok(Url::parse(&format!(
            "{}/{}",
            self.inner.base,
            path_or_url.trim_start_matches('/')
        ))?)
    }

    /// Runs a request, turning non-2xx responses into [`StaplusError::Server`].
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.execute_inner(request, None)
    }

    pub(crate) fn execute_for(&self, request: &HttpRequest, entity: &'static str) -> Result<HttpResponse> {
        self.execute_inner(request, Some(entity))
    }

    fn execute_inner(&self, request: &HttpRequest, entity: Option<&'static str>) -> Result<HttpResponse> {
        debug!("{} {}", request.method(), request.url());
        let response = self.inner.transport.execute(request)?;
        debug!("received response: {} from {}", response.status, request.url());

        if response.is_success() {
            return Ok(response);
        }

        let message = error_message(&response);
        match entity {
            Some(entity) => error!(
                "{} {} failed with status-code {}, {}",
                request.method(),
                entity,
                response.status,
                message
            ),
            None => error!(
                "query failed with status-code {}, {}",
                response.status, message
            ),
        }
        Err(StaplusError::Server {
            status: response.status,
            message,
            entity,
        })
    }

    pub(crate) fn get_json(&self, url: Url) -> Result<Value> {
        self.execute(&HttpRequest::get(url))?.json()
    }

    /// Data access object for any entity type.
    pub fn dao<T: Entity>(&self) -> Dao<T> {
        Dao::new(self)
    }

    pub fn create<T: Entity>(&self, entity: &mut T) -> Result<Id> {
        self.dao::<T>().create(entity)
    }

    pub fn update<T: Entity>(&self, entity: &T) -> Result<()> {
        self.dao::<T>().update(entity)
    }

    pub fn patch<T: Entity>(&self, entity: &T, patches: Vec<Value>) -> Result<()> {
        self.dao::<T>().patch(entity, patches)
    }

    pub fn delete<T: Entity>(&self, entity: &T) -> Result<()> {
        self.dao::<T>().delete(entity)
    }

    /// Fetches one entity when its type is only known by name.
    #[instrument(name = "staplus.service.get_any", skip(self, id), fields(id = %id))]
    pub fn get_any(&self, type_name: &str, id: &Id) -> Result<AnyEntity> {
        let entity_type = EntityType::by_name(type_name)?;
        let url = self.resolve(&format!("{}({})", entity_type.plural, id.to_path_literal()))?;
        let body = self.get_json(url)?;
        let mut entity = entity_type.decode(&body)?;
        entity.set_service(Some(self));
        Ok(entity)
    }

    pub fn things(&self) -> Dao<Thing> {
        self.dao()
    }

    pub fn locations(&self) -> Dao<Location> {
        self.dao()
    }

    pub fn historical_locations(&self) -> Dao<HistoricalLocation> {
        self.dao()
    }

    pub fn sensors(&self) -> Dao<Sensor> {
        self.dao()
    }

    pub fn observed_properties(&self) -> Dao<ObservedProperty> {
        self.dao()
    }

    pub fn features_of_interest(&self) -> Dao<FeatureOfInterest> {
        self.dao()
    }

    pub fn datastreams(&self) -> Dao<Datastream> {
        self.dao()
    }

    pub fn multi_datastreams(&self) -> Dao<MultiDatastream> {
        self.dao()
    }

    pub fn observations(&self) -> Dao<Observation> {
        self.dao()
    }

    pub fn parties(&self) -> Dao<Party> {
        self.dao()
    }

    pub fn licenses(&self) -> Dao<License> {
        self.dao()
    }

    pub fn campaigns(&self) -> Dao<Campaign> {
        self.dao()
    }

    pub fn observation_groups(&self) -> Dao<ObservationGroup> {
        self.dao()
    }

    pub fn relations(&self) -> Dao<Relation> {
        self.dao()
    }

    /// Relations in which a parent observation is the object.
    pub fn subjects(&self) -> Dao<Relation> {
        Dao::with_segment(self, "Subjects")
    }

    /// Relations in which a parent observation is the subject.
    pub fn objects(&self) -> Dao<Relation> {
        Dao::with_segment(self, "Objects")
    }

    /// Subject observation of a parent relation.
    pub fn subject(&self) -> Dao<Observation> {
        Dao::with_segment(self, "Subject")
    }

    /// Object observation of a parent relation.
    pub fn object(&self) -> Dao<Observation> {
        Dao::with_segment(self, "Object")
    }
}

/// Non-owning reference to a [`Service`], carried by entities and lists.
#[derive(Clone, Default)]
pub struct ServiceHandle(Option<Weak<ServiceInner>>);

impl ServiceHandle {
    pub fn upgrade(&self) -> Option<Service> {
        self.0
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Service { inner })
    }

    pub fn same_as(&self, other: &ServiceHandle) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.upgrade().is_some()
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(service) => write!(f, "ServiceHandle({})", service.url()),
            None if self.0.is_some() => f.write_str("ServiceHandle(dropped)"),
            None => f.write_str("ServiceHandle(none)"),
        }
    }
}
