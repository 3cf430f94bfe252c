//! Lazily paged entity collections

use crate::entity::Entity;
use crate::err::{Result, StaplusError};
use crate::http::service::{Service, ServiceHandle};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

pub(crate) const NEXT_LINK: &str = "@iot.nextLink";
pub(crate) const COUNT: &str = "@iot.count";

/// Receives the 0-based index of the entity about to be yielded.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Clone)]
struct Progress {
    callback: ProgressCallback,
    step: usize,
}

/// An ordered collection of entities of one type, as returned by the server
/// one page at a time.
///
/// Only the first page is held in memory. Iterating (by value) walks the
/// materialized entities and then follows `@iot.nextLink` until the server
/// stops handing one out, so a simple `next()` may block on HTTP. The
/// iterator is single pass; re-run the query for a fresh traversal. Sharing
/// one iterator across threads without synchronization is not supported.
#[derive(Clone)]
pub struct EntityList<T: Entity> {
    entities: Vec<T>,
    next_link: Option<String>,
    count: Option<u64>,
    service: ServiceHandle,
    progress: Option<Progress>,
}

impl<T: Entity> Default for EntityList<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            next_link: None,
            count: None,
            service: ServiceHandle::default(),
            progress: None,
        }
    }
}

impl<T: Entity> fmt::Debug for EntityList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityList")
            .field("type", &T::KIND.plural())
            .field("entities", &self.entities)
            .field("next_link", &self.next_link)
            .field("count", &self.count)
            .field("progress_step", &self.progress.as_ref().map(|p| p.step))
            .finish()
    }
}

impl<T: Entity> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities materialized so far. Does not fetch.
    pub fn entities(&self) -> &[T] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut Vec<T> {
        &mut self.entities
    }

    pub fn into_entities(self) -> Vec<T> {
        self.entities
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entities.get(index)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn push(&mut self, entity: T) {
        self.entities.push(entity);
    }

    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    /// Total size reported by the server when `$count=true` was requested.
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn service(&self) -> Option<Service> {
        self.service.upgrade()
    }

    /// Sets the service on the collection and on every materialized entity.
    /// Pages not fetched yet are attached when they arrive.
    pub fn set_service(&mut self, service: Option<&Service>) {
        let handle = service.map(Service::handle).unwrap_or_default();
        self.attach(&handle);
    }

    pub(crate) fn attach(&mut self, handle: &ServiceHandle) {
        self.service = handle.clone();
        for entity in &mut self.entities {
            entity.attach(handle);
        }
    }

    /// Calls `callback` every `step` entities while iterating.
    pub fn set_progress(&mut self, callback: impl Fn(usize) + Send + Sync + 'static, step: usize) {
        self.progress = Some(Progress {
            callback: Arc::new(callback),
            step: step.max(1),
        });
    }

    pub fn with_progress(
        mut self,
        callback: impl Fn(usize) + Send + Sync + 'static,
        step: usize,
    ) -> Self {
        self.set_progress(callback, step);
        self
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.entities.iter().map(Entity::to_json).collect())
    }

    /// Decodes a collection response, either `{"value": [...], ...}` or a bare
    /// array.
    pub fn from_response(body: &Value) -> Result<Self> {
        match body {
            Value::Object(map) => {
                let items = map.get("value").and_then(Value::as_array).ok_or_else(|| {
                    StaplusError::MalformedResponse(format!(
                        "collection of {} has no value array",
                        T::KIND.plural()
                    ))
                })?;
                let mut list = Self::decode_items(items)?;
                list.next_link = read_link(map, NEXT_LINK);
                list.count = map.get(COUNT).and_then(Value::as_u64);
                Ok(list)
            }
            Value::Array(items) => Self::decode_items(items),
            other => Err(StaplusError::MalformedResponse(format!(
                "expected a collection of {}, got {}",
                T::KIND.plural(),
                other
            ))),
        }
    }

    /// Decodes an inlined relation list, picking up its
    /// `<Relation>@iot.nextLink` and `<Relation>@iot.count` siblings.
    pub(crate) fn from_relation(items: &[Value], parent: &Map<String, Value>, wire: &str) -> Result<Self> {
        let mut list = Self::decode_items(items)?;
        list.next_link = read_link(parent, &format!("{}{}", wire, NEXT_LINK));
        list.count = parent
            .get(&format!("{}{}", wire, COUNT))
            .and_then(Value::as_u64);
        Ok(list)
    }

    fn decode_items(items: &[Value]) -> Result<Self> {
        let entities = items.iter().map(T::from_json).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            entities,
            ..Self::default()
        })
    }

    /// Follows continuation links until the server reports no more pages,
    /// keeping everything in memory.
    pub fn load_all(&mut self) -> Result<()> {
        while let Some(link) = self.next_link.clone() {
            let service = self
                .service
                .upgrade()
                .ok_or(StaplusError::Detached("EntityList"))?;
            let page = fetch_page::<T>(&service, &link)?;
            self.entities.extend(page.entities);
            self.next_link = page.next_link;
        }
        Ok(())
    }
}

fn read_link(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

#[instrument(name = "staplus.list.next_page", skip(service), fields(entity = T::KIND.plural()))]
fn fetch_page<T: Entity>(service: &Service, link: &str) -> Result<EntityList<T>> {
    let url = service.resolve(link)?;
    let body = service.get_json(url)?;
    let mut page = EntityList::<T>::from_response(&body)?;
    page.set_service(Some(service));
    debug!(
        "received {} entities, more pages: {}",
        page.len(),
        page.next_link.is_some()
    );
    Ok(page)
}

impl<T: Entity> From<Vec<T>> for EntityList<T> {
    fn from(entities: Vec<T>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }
}

impl<T: Entity> FromIterator<T> for EntityList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: Entity> IntoIterator for EntityList<T> {
    type Item = Result<T>;
    type IntoIter = EntityListIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        EntityListIterator {
            buffer: self.entities.into(),
            next_link: self.next_link,
            service: self.service,
            progress: self.progress,
            position: 0,
            done: false,
        }
    }
}

/// Forward-only iterator over all pages of an [`EntityList`].
///
/// After an error the iterator is finished.
pub struct EntityListIterator<T: Entity> {
    buffer: VecDeque<T>,
    next_link: Option<String>,
    service: ServiceHandle,
    progress: Option<Progress>,
    position: usize,
    done: bool,
}

impl<T: Entity> EntityListIterator<T> {
    /// Number of entities yielded so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn fetch_next_page(&mut self, link: &str) -> Result<()> {
        let service = self
            .service
            .upgrade()
            .ok_or(StaplusError::Detached("EntityList"))?;
        let page = fetch_page::<T>(&service, link)?;
        trace!("appending page of {} to iterator buffer", page.len());
        self.next_link = page.next_link;
        self.buffer.extend(page.entities);
        Ok(())
    }
}

impl<T: Entity> Iterator for EntityListIterator<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // a page may legitimately come back empty while still linking onward
        while self.buffer.is_empty() {
            let Some(link) = self.next_link.take() else {
                self.done = true;
                return None;
            };
            if let Err(err) = self.fetch_next_page(&link) {
                self.done = true;
                return Some(Err(err));
            }
        }

        let entity = self.buffer.pop_front()?;
        if let Some(progress) = &self.progress {
            if self.position % progress.step == 0 {
                (progress.callback)(self.position);
            }
        }
        self.position += 1;
        Some(Ok(entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next_link.is_none() {
            (self.buffer.len(), Some(self.buffer.len()))
        } else {
            (self.buffer.len(), None)
        }
    }
}
