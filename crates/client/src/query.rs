//! Query builder for entity collections and relationship navigation

use crate::entity::Entity;
use crate::err::Result;
use crate::http::service::Service;
use crate::id::Id;
use crate::list::EntityList;
use crate::registry::EntityKind;
use itertools::Itertools;
use std::marker::PhantomData;
use tracing::{debug, instrument};
use url::Url;

/// The persisted entity a relationship is navigated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub kind: EntityKind,
    pub id: Id,
}

/// OData system query options. Rendered in a fixed order regardless of the
/// order the builder methods were called in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    filters: Vec<String>,
    expand: Vec<String>,
    select: Vec<String>,
    order_by: Vec<String>,
    top: Option<u64>,
    skip: Option<u64>,
    count: Option<bool>,
}

impl QueryParams {
    /// Query string pairs, `$filter` first and `$count` last.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        match self.filters.as_slice() {
            [] => {}
            [single] => pairs.push(("$filter", single.clone())),
            many => pairs.push((
                "$filter",
                many.iter().map(|f| format!("({})", f)).join(" and "),
            )),
        }
        for (key, values) in [
            ("$expand", &self.expand),
            ("$select", &self.select),
            ("$orderby", &self.order_by),
        ] {
            if !values.is_empty() {
                pairs.push((key, values.join(",")));
            }
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip", skip.to_string()));
        }
        if let Some(count) = self.count {
            pairs.push(("$count", count.to_string()));
        }

        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// A pending GET against a collection or a navigation path.
///
/// Builder methods consume and return the query; `fetch_many` and
/// `fetch_one` execute it.
#[derive(Debug, Clone)]
pub struct Query<T: Entity> {
    service: Service,
    segment: String,
    parent: Option<ParentRef>,
    params: QueryParams,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Query<T> {
    pub(crate) fn new(service: &Service, segment: String, parent: Option<ParentRef>) -> Self {
        Self {
            service: service.clone(),
            segment,
            parent,
            params: QueryParams::default(),
            _entity: PhantomData,
        }
    }

    /// Adds an OData filter expression. Several filters are combined with `and`.
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.params.filters.push(expression.into());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.params.expand.push(expand.into());
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.params.select.push(select.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.params.order_by.push(order_by.into());
        self
    }

    pub fn top(mut self, top: u64) -> Self {
        self.params.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.params.skip = Some(skip);
        self
    }

    /// Asks the server for `@iot.count` on the returned collection.
    pub fn count(mut self, count: bool) -> Self {
        self.params.count = Some(count);
        self
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// Path below the service root, e.g. `Parties('p1')/Datastreams`.
    pub fn path(&self) -> String {
        self.service.path_for(self.parent.as_ref(), &self.segment)
    }

    pub fn url(&self) -> Result<Url> {
        let mut url = self.service.resolve(&self.path())?;
        let pairs = self.params.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    #[instrument(name = "staplus.query.fetch_many", skip(self), fields(path = %self.path()))]
    pub fn fetch_many(&self) -> Result<EntityList<T>> {
        let url = self.url()?;
        let body = self.service.get_json(url)?;
        let mut list = EntityList::<T>::from_response(&body)?;
        list.set_service(Some(&self.service));
        debug!(
            "fetched {} {}, more pages: {}",
            list.len(),
            T::KIND.plural(),
            list.next_link().is_some()
        );
        Ok(list)
    }

    /// Like [`fetch_many`](Self::fetch_many) with a progress callback invoked
    /// every `step` entities during iteration.
    pub fn fetch_many_with_progress(
        &self,
        callback: impl Fn(usize) + Send + Sync + 'static,
        step: usize,
    ) -> Result<EntityList<T>> {
        Ok(self.fetch_many()?.with_progress(callback, step))
    }

    #[instrument(name = "staplus.query.fetch_one", skip(self), fields(path = %self.path()))]
    pub fn fetch_one(&self) -> Result<T> {
        let url = self.url()?;
        let body = self.service.get_json(url)?;
        let mut entity = T::from_json(&body)?;
        entity.set_service(Some(&self.service));
        Ok(entity)
    }
}
