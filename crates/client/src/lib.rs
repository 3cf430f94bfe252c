//! Typed client for OGC SensorThings API servers with the STAplus extension.
//!
//! Build entity graphs in memory, persist them with [`Service::create`] and
//! navigate relationships through [`Query`] builders whose results arrive as
//! lazily paged [`EntityList`]s.
//!
//! ```no_run
//! use staplus_client::{Entity, Party, Service};
//!
//! # fn main() -> staplus_client::Result<()> {
//! let service = Service::new("http://localhost:8080/FROST-Server/v1.1")?;
//!
//! let mut party = Party::new().with_display_name("Jo").with_role("individual");
//! service.create(&mut party)?;
//!
//! for datastream in party.query_datastreams()?.top(100).fetch_many()? {
//!     println!("{:?}", datastream?.name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All I/O is blocking. Iterating an [`EntityList`] may issue further
//! requests whenever the server paged the result.

pub mod config;
pub mod dao;
pub mod entity;
pub mod err;
pub mod field;
pub mod http;
pub mod id;
pub mod list;
pub mod query;
pub mod registry;
pub mod time;

pub use config::ServiceConfig;
pub use dao::Dao;
pub use entity::*;
pub use err::{Result, StaplusError};
pub use field::{FieldDescriptor, FieldKind, FieldValue, UnitOfMeasurement};
pub use crate::http::{Auth, HttpRequest, HttpResponse, ReqwestTransport, Service, Transport};
pub use id::Id;
pub use list::{EntityList, EntityListIterator, ProgressCallback};
pub use query::{ParentRef, Query, QueryParams};
pub use registry::{AnyEntity, EntityKind, EntityType};
pub use time::{TimeValue, Timestamp};
