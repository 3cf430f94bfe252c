/// Generates an entity struct together with its accessors and its
/// [`Entity`](crate::entity::Entity) implementation.
///
/// Each line names the field, its setter and builder (plus a navigation
/// method for relations), the Rust type and the wire key:
///
/// ```ignore
/// entity! {
///     pub struct Party {
///         values {
///             display_name, set_display_name, with_display_name: String => "displayName";
///         }
///         one {}
///         many {
///             things, set_things, with_things, query_things: Thing => "Things";
///         }
///     }
/// }
/// ```
macro_rules! entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            values {
                $($vf:ident, $vset:ident, $vwith:ident : $vty:ty => $vwire:literal;)*
            }
            one {
                $($of:ident, $oset:ident, $owith:ident, $oquery:ident : $oty:ident => $owire:literal;)*
            }
            many {
                $($mf:ident, $mset:ident, $mwith:ident, $mquery:ident : $mty:ident => $mwire:literal;)*
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            core: $crate::entity::EntityCore,
            $($vf: Option<$vty>,)*
            $($of: Option<Box<$oty>>,)*
            $($mf: Option<$crate::list::EntityList<$mty>>,)*
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $vf(&self) -> Option<&$vty> {
                    self.$vf.as_ref()
                }

                pub fn $vset(&mut self, value: Option<$vty>) {
                    self.$vf = value;
                }

                pub fn $vwith(mut self, value: impl Into<$vty>) -> Self {
                    self.$vf = Some(value.into());
                    self
                }
            )*

            $(
                pub fn $of(&self) -> Option<&$oty> {
                    self.$of.as_deref()
                }

                pub fn $oset(&mut self, value: Option<$oty>) {
                    self.$of = value.map(Box::new);
                }

                pub fn $owith(mut self, value: $oty) -> Self {
                    self.$of = Some(Box::new(value));
                    self
                }

                pub fn $oquery(&self) -> $crate::err::Result<$crate::query::Query<$oty>> {
                    $crate::entity::navigate(self, $owire)
                }
            )*

            $(
                pub fn $mf(&self) -> Option<&$crate::list::EntityList<$mty>> {
                    self.$mf.as_ref()
                }

                pub fn $mset(&mut self, value: Option<$crate::list::EntityList<$mty>>) {
                    self.$mf = value;
                }

                pub fn $mwith(mut self, value: impl Into<$crate::list::EntityList<$mty>>) -> Self {
                    self.$mf = Some(value.into());
                    self
                }

                pub fn $mquery(&self) -> $crate::err::Result<$crate::query::Query<$mty>> {
                    $crate::entity::navigate(self, $mwire)
                }
            )*
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                if std::ptr::eq(self, other) {
                    return true;
                }
                true $(&& self.$vf == other.$vf)*
            }
        }

        impl $crate::entity::Entity for $name {
            const KIND: $crate::registry::EntityKind = $crate::registry::EntityKind::$name;

            const FIELDS: &'static [$crate::field::FieldDescriptor] = &[
                $($crate::field::FieldDescriptor::value(
                    $vwire,
                    <$vty as $crate::field::FieldValue>::EXPECTED,
                ),)*
                $($crate::field::FieldDescriptor::to_one($owire, $crate::registry::EntityKind::$oty),)*
                $($crate::field::FieldDescriptor::to_many($mwire, $crate::registry::EntityKind::$mty),)*
            ];

            fn core(&self) -> &$crate::entity::EntityCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut $crate::entity::EntityCore {
                &mut self.core
            }

            fn propagate_service(&mut self, handle: &$crate::http::service::ServiceHandle) {
                $(
                    if let Some(related) = self.$of.as_deref_mut() {
                        $crate::entity::Entity::attach(related, handle);
                    }
                )*
                $(
                    if let Some(list) = self.$mf.as_mut() {
                        list.attach(handle);
                    }
                )*
            }

            fn to_json(&self) -> serde_json::Value {
                use $crate::field::FieldValue;

                let mut map = self.core.to_map();
                $(
                    if let Some(value) = &self.$vf {
                        if !value.is_blank() {
                            map.insert($vwire.to_string(), value.to_wire());
                        }
                    }
                )*
                $(
                    if let Some(related) = &self.$of {
                        map.insert(
                            $owire.to_string(),
                            $crate::entity::Entity::to_json(related.as_ref()),
                        );
                    }
                )*
                $(
                    if let Some(list) = &self.$mf {
                        if !list.is_empty() {
                            map.insert($mwire.to_string(), list.to_json());
                        }
                    }
                )*
                serde_json::Value::Object(map)
            }

            fn from_json(value: &serde_json::Value) -> $crate::err::Result<Self> {
                let map = value.as_object().ok_or_else(|| {
                    $crate::err::StaplusError::MalformedResponse(format!(
                        "expected a JSON object for {}, got {}",
                        stringify!($name),
                        value
                    ))
                })?;

                Ok(Self {
                    core: $crate::entity::EntityCore::from_map(map),
                    $($vf: $crate::field::read_value::<$vty>(map, stringify!($name), $vwire),)*
                    $($of: $crate::entity::decode_one::<$oty>(map, $owire)?,)*
                    $($mf: $crate::entity::decode_many::<$mty>(map, $mwire)?,)*
                })
            }

            fn set_field(
                &mut self,
                wire: &str,
                value: &serde_json::Value,
            ) -> $crate::err::Result<()> {
                match wire {
                    $(
                        $vwire => {
                            self.$vf = $crate::field::coerce::<$vty>(stringify!($name), wire, value)?;
                            Ok(())
                        }
                    )*
                    other => Err($crate::err::StaplusError::validation(
                        stringify!($name),
                        other,
                        "a declared value field",
                    )),
                }
            }

            fn set_relation(
                &mut self,
                wire: &str,
                value: $crate::entity::RelationValue,
            ) -> $crate::err::Result<()> {
                match wire {
                    $(
                        $owire => {
                            self.$of = value
                                .into_one::<$oty>(stringify!($name), wire)?
                                .map(Box::new);
                            Ok(())
                        }
                    )*
                    $(
                        $mwire => {
                            self.$mf = value.into_many::<$mty>(stringify!($name), wire)?;
                            Ok(())
                        }
                    )*
                    other => Err($crate::err::StaplusError::validation(
                        stringify!($name),
                        other,
                        "a declared relation",
                    )),
                }
            }

            fn into_any(self) -> $crate::registry::AnyEntity {
                $crate::registry::AnyEntity::$name(self)
            }

            fn from_any(any: $crate::registry::AnyEntity) -> Option<Self> {
                match any {
                    $crate::registry::AnyEntity::$name(entity) => Some(entity),
                    _ => None,
                }
            }
        }
    };
}
